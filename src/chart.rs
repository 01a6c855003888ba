use std::path::Path;

use serde_json::{json, Value};
use tracing::debug;

use crate::error::RenderError;
use crate::format::slugify;
use crate::record::ValidRecord;
use crate::settings::Settings;

pub const CHART_WIDTH: u32 = 600;
pub const CHART_HEIGHT: u32 = 400;
pub const CHART_SUFFIX: &str = "_chart.png";

/// Inputs for one record's metrics chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartRequest<'a> {
    pub organization_name: &'a str,
    pub co2_grams: f64,
    pub total_bytes: f64,
    pub requests: u64,
}

impl<'a> From<&'a ValidRecord> for ChartRequest<'a> {
    fn from(r: &'a ValidRecord) -> Self {
        ChartRequest {
            organization_name: &r.organization_name,
            co2_grams: r.co2_grams,
            total_bytes: r.total_bytes,
            requests: r.requests,
        }
    }
}

impl ChartRequest<'_> {
    pub fn page_size_kb(&self) -> f64 {
        self.total_bytes / 1024.0
    }

    /// Chart.js config for the three-bar comparison.
    pub fn chart_config(&self) -> Value {
        json!({
            "type": "bar",
            "data": {
                "labels": ["CO₂ (g)", "Page Size (KB)", "Requests"],
                "datasets": [{
                    "label": self.organization_name,
                    "data": [self.co2_grams, self.page_size_kb(), self.requests],
                    "backgroundColor": ["#276749", "#38A169", "#63B3ED"]
                }]
            },
            "options": {
                "plugins": { "legend": { "display": false } },
                "scales": { "y": { "beginAtZero": true } }
            }
        })
    }
}

/// File name of an organization's chart image.
pub fn chart_filename(organization_name: &str) -> String {
    format!("{}{}", slugify(organization_name), CHART_SUFFIX)
}

/// Renders a metrics chart image into `out_dir` and returns its file name.
#[allow(async_fn_in_trait)]
pub trait ChartRenderer {
    async fn render(&self, request: &ChartRequest<'_>, out_dir: &Path) -> Result<String, RenderError>;
}

/// Chart rendering through the QuickChart HTTP API.
pub struct QuickChart {
    http: reqwest::Client,
    base_url: String,
}

impl QuickChart {
    pub fn new(settings: &Settings) -> Self {
        Self::with_base_url(&settings.quickchart_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        QuickChart {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_png(&self, request: &ChartRequest<'_>) -> Result<Vec<u8>, RenderError> {
        let body = json!({
            "chart": request.chart_config(),
            "width": CHART_WIDTH,
            "height": CHART_HEIGHT,
            "backgroundColor": "white",
            "format": "png"
        });

        let response = self
            .http
            .post(format!("{}/chart", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::ChartStatus { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl ChartRenderer for QuickChart {
    async fn render(&self, request: &ChartRequest<'_>, out_dir: &Path) -> Result<String, RenderError> {
        let image = self.fetch_png(request).await?;
        let filename = chart_filename(request.organization_name);
        let path = out_dir.join(&filename);

        tokio::fs::write(&path, &image)
            .await
            .map_err(|source| RenderError::Io { path: path.clone(), source })?;
        debug!("Wrote chart {} ({} bytes)", path.display(), image.len());
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_config_has_three_bars() {
        let req = ChartRequest {
            organization_name: "Acme",
            co2_grams: 1.0,
            total_bytes: 2048000.0,
            requests: 50,
        };
        let cfg = req.chart_config();
        assert_eq!(cfg["data"]["labels"].as_array().unwrap().len(), 3);
        assert_eq!(cfg["data"]["datasets"][0]["label"], "Acme");
        assert_eq!(cfg["data"]["datasets"][0]["data"], json!([1.0, 2000.0, 50]));
        assert_eq!(cfg["options"]["plugins"]["legend"]["display"], false);
    }

    #[test]
    fn filename_from_slug() {
        assert_eq!(chart_filename("Acme"), "acme_chart.png");
        assert_eq!(chart_filename("Green Orbit Digital"), "green-orbit-digital_chart.png");
    }
}
