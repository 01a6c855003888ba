use serde::Serialize;
use tracing::warn;

pub const DEFAULT_GRADE: &str = "Unknown";
pub const DEFAULT_UTM_SOURCE: &str = "notion";
pub const DEFAULT_UTM_MEDIUM: &str = "email";
pub const DEFAULT_UTM_CAMPAIGN: &str = "eco-report";

/// Campaign-tracking parameters carried through to links in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtmParams {
    #[serde(rename = "utmSource")]
    pub source: String,
    #[serde(rename = "utmMedium")]
    pub medium: String,
    #[serde(rename = "utmCampaign")]
    pub campaign: String,
}

impl Default for UtmParams {
    fn default() -> Self {
        UtmParams {
            source: DEFAULT_UTM_SOURCE.to_string(),
            medium: DEFAULT_UTM_MEDIUM.to_string(),
            campaign: DEFAULT_UTM_CAMPAIGN.to_string(),
        }
    }
}

/// One audit record as read from the datastore, defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Datastore page id, kept for diagnostics only.
    pub source_id: Option<String>,
    pub organization_name: Option<String>,
    pub url: Option<String>,
    pub co2_grams: f64,
    pub total_bytes: f64,
    pub requests: u64,
    pub grade: String,
    pub utm: UtmParams,
}

impl Default for RawRecord {
    fn default() -> Self {
        RawRecord {
            source_id: None,
            organization_name: None,
            url: None,
            co2_grams: 0.0,
            total_bytes: 0.0,
            requests: 0,
            grade: DEFAULT_GRADE.to_string(),
            utm: UtmParams::default(),
        }
    }
}

/// A record known to carry both an organization name and a URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidRecord {
    pub organization_name: String,
    pub url: String,
    pub co2_grams: f64,
    pub total_bytes: f64,
    pub requests: u64,
    pub grade: String,
    #[serde(flatten)]
    pub utm: UtmParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingOrganization,
    MissingUrl,
    MissingBoth,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::MissingOrganization => "missing organization name",
            RejectReason::MissingUrl => "missing url",
            RejectReason::MissingBoth => "missing organization name and url",
        }
    }
}

/// A record that failed validation, handed back intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub record: RawRecord,
    pub reason: RejectReason,
}

impl TryFrom<RawRecord> for ValidRecord {
    type Error = Rejected;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        match (raw.organization_name, raw.url) {
            (Some(organization_name), Some(url)) => Ok(ValidRecord {
                organization_name,
                url,
                co2_grams: raw.co2_grams,
                total_bytes: raw.total_bytes,
                requests: raw.requests,
                grade: raw.grade,
                utm: raw.utm,
            }),
            (organization_name, url) => {
                let reason = match (&organization_name, &url) {
                    (None, None) => RejectReason::MissingBoth,
                    (None, Some(_)) => RejectReason::MissingOrganization,
                    _ => RejectReason::MissingUrl,
                };
                Err(Rejected {
                    record: RawRecord {
                        organization_name,
                        url,
                        ..raw
                    },
                    reason,
                })
            }
        }
    }
}

/// Keep records with both an organization name and a URL, in arrival order.
/// Rejects are logged, never raised.
pub fn validate(records: Vec<RawRecord>) -> Vec<ValidRecord> {
    let mut valid = Vec::with_capacity(records.len());
    for raw in records {
        match ValidRecord::try_from(raw) {
            Ok(record) => valid.push(record),
            Err(rejected) => {
                let r = &rejected.record;
                warn!(
                    source_id = r.source_id.as_deref().unwrap_or("-"),
                    organization = r.organization_name.as_deref().unwrap_or("-"),
                    url = r.url.as_deref().unwrap_or("-"),
                    grade = %r.grade,
                    "Filtered out record: {}",
                    rejected.reason.as_str()
                );
            }
        }
    }
    valid
}
