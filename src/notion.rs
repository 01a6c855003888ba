//! Paginated retrieval of audit records from a Notion database.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::record::{RawRecord, UtmParams, DEFAULT_GRADE};
use crate::settings::Settings;

pub const NOTION_VERSION: &str = "2022-06-28";
pub const PAGE_SIZE: u32 = 100;

/// Where audit records come from.
#[allow(async_fn_in_trait)]
pub trait AuditSource {
    /// Every record in the datastore, in arrival order.
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(settings: &Settings) -> Self {
        NotionClient {
            http: reqwest::Client::new(),
            base_url: settings.notion_api_url.trim_end_matches('/').to_string(),
            api_key: settings.notion_api_key.clone(),
            database_id: settings.notion_database_id.clone(),
        }
    }

    /// Query one page of the database, starting at `cursor` when given.
    async fn query(&self, cursor: Option<&str>) -> Result<QueryResponse, FetchError> {
        let url = format!("{}/v1/databases/{}/query", self.base_url, self.database_id);
        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(c) = cursor {
            body["start_cursor"] = Value::from(c);
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body: text });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl AuditSource for NotionClient {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FetchError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let response = self.query(cursor.as_deref()).await?;
            pages += 1;
            debug!(page = pages, results = response.results.len(), "Fetched datastore page");
            records.extend(response.results.iter().map(parse_page));

            cursor = match (response.has_more, response.next_cursor) {
                (true, Some(next)) => Some(next),
                _ => break,
            };
        }

        info!("Fetched {} records in {} page(s)", records.len(), pages);
        Ok(records)
    }
}

/// Typed accessors over a page's `properties` object.
struct Properties<'a>(Option<&'a Map<String, Value>>);

impl<'a> Properties<'a> {
    fn of(page: &'a Value) -> Self {
        Properties(page.get("properties").and_then(Value::as_object))
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.0?.get(name)
    }

    /// First `plain_text` of a text-array property (`title` or `rich_text`).
    fn text(&self, name: &str, kind: &str) -> Option<String> {
        self.get(name)?
            .get(kind)?
            .as_array()?
            .first()?
            .get("plain_text")?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn title_or_text(&self, name: &str) -> Option<String> {
        self.text(name, "title").or_else(|| self.text(name, "rich_text"))
    }

    fn rich_text(&self, name: &str) -> Option<String> {
        self.text(name, "rich_text")
    }

    fn url(&self, name: &str) -> Option<String> {
        self.get(name)?
            .get("url")?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.get(name)?.get("number")?.as_f64()
    }

    fn select(&self, name: &str) -> Option<String> {
        self.get(name)?
            .get("select")?
            .get("name")?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Map one database page onto a `RawRecord`, applying field defaults.
pub fn parse_page(page: &Value) -> RawRecord {
    let props = Properties::of(page);
    let defaults = UtmParams::default();

    RawRecord {
        source_id: page.get("id").and_then(Value::as_str).map(str::to_string),
        organization_name: props.title_or_text("Organisation"),
        url: props.url("URL"),
        co2_grams: props.number("Estimated CO2 (g)").map_or(0.0, |n| n.max(0.0)),
        total_bytes: props.number("Total Bytes").map_or(0.0, |n| n.max(0.0)),
        requests: props
            .number("Requests")
            .map(|n| n.max(0.0).round() as u64)
            .unwrap_or(0),
        grade: props.select("Grade").unwrap_or_else(|| DEFAULT_GRADE.to_string()),
        utm: UtmParams {
            source: props.rich_text("UTM Source").unwrap_or(defaults.source),
            medium: props.rich_text("UTM Medium").unwrap_or(defaults.medium),
            campaign: props.rich_text("UTM Campaign").unwrap_or(defaults.campaign),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_maps_every_property() {
        let page = json!({
            "id": "page-1",
            "properties": {
                "Organisation": { "title": [{ "plain_text": "Acme" }] },
                "URL": { "url": "https://acme.test" },
                "Estimated CO2 (g)": { "number": 1.25 },
                "Total Bytes": { "number": 2048000 },
                "Requests": { "number": 50 },
                "Grade": { "select": { "name": "C (🌳)" } },
                "UTM Source": { "rich_text": [{ "plain_text": "newsletter" }] },
                "UTM Medium": { "rich_text": [{ "plain_text": "web" }] },
                "UTM Campaign": { "rich_text": [{ "plain_text": "spring" }] }
            }
        });
        let r = parse_page(&page);
        assert_eq!(r.source_id.as_deref(), Some("page-1"));
        assert_eq!(r.organization_name.as_deref(), Some("Acme"));
        assert_eq!(r.url.as_deref(), Some("https://acme.test"));
        assert_eq!(r.co2_grams, 1.25);
        assert_eq!(r.total_bytes, 2048000.0);
        assert_eq!(r.requests, 50);
        assert_eq!(r.grade, "C (🌳)");
        assert_eq!(r.utm.source, "newsletter");
        assert_eq!(r.utm.medium, "web");
        assert_eq!(r.utm.campaign, "spring");
    }

    #[test]
    fn organisation_falls_back_to_rich_text() {
        let page = json!({
            "properties": {
                "Organisation": { "title": [], "rich_text": [{ "plain_text": "Beta Ltd" }] }
            }
        });
        assert_eq!(parse_page(&page).organization_name.as_deref(), Some("Beta Ltd"));
    }

    #[test]
    fn missing_and_null_properties_take_defaults() {
        let page = json!({
            "properties": {
                "Organisation": { "title": [{ "plain_text": "" }] },
                "URL": { "url": null },
                "Estimated CO2 (g)": { "number": null },
                "Grade": { "select": null }
            }
        });
        let r = parse_page(&page);
        assert_eq!(r.organization_name, None);
        assert_eq!(r.url, None);
        assert_eq!(r.co2_grams, 0.0);
        assert_eq!(r.total_bytes, 0.0);
        assert_eq!(r.requests, 0);
        assert_eq!(r.grade, "Unknown");
        assert_eq!(r.utm, UtmParams::default());

        assert_eq!(parse_page(&json!({})), RawRecord::default());
    }

    #[test]
    fn negative_numbers_are_clamped_to_zero() {
        let page = json!({
            "properties": {
                "Estimated CO2 (g)": { "number": -1.5 },
                "Total Bytes": { "number": -2048 },
                "Requests": { "number": -3 }
            }
        });
        let r = parse_page(&page);
        assert_eq!(r.co2_grams, 0.0);
        assert_eq!(r.total_bytes, 0.0);
        assert_eq!(r.requests, 0);
    }
}
