use chrono::NaiveDate;
use serde::Serialize;

use crate::format::{group_thousands, number_with_commas};
use crate::grades;
use crate::record::{UtmParams, ValidRecord};

/// Page views per month assumed when projecting a single-view footprint.
pub const ASSUMED_MONTHLY_PAGE_VIEWS: f64 = 100_000.0;
/// kg CO₂ emitted per km driven in a petrol car.
pub const KG_CO2_PER_KM: f64 = 0.12;
/// kWh of electricity per kg CO₂.
pub const KWH_PER_KG_CO2: f64 = 0.06;
pub const BULB_WATTS: f64 = 10.0;

const SUMMARY: &str =
    "This audit evaluates key environmental metrics of your website to help reduce digital carbon footprint.";

const ROOT_CAUSES: &[&str] = &[
    "High number of third-party tracking and analytics scripts.",
    "Uncompressed large images, particularly hero banners.",
    "Lack of lazy loading on below-the-fold images.",
    "Multiple large JavaScript bundles increasing page weight.",
];

const NEXT_STEPS: &[&str] = &[
    "Schedule a sustainability review meeting with Green Orbit Digital.",
    "Set measurable CO₂ reduction targets for the next quarter.",
    "Implement continuous monitoring with monthly reporting.",
    "Explore server and CDN optimisations for improved efficiency.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrioritizedRecommendation {
    pub priority: Priority,
    pub text: &'static str,
}

const DETAILED_RECOMMENDATIONS: &[PrioritizedRecommendation] = &[
    PrioritizedRecommendation {
        priority: Priority::High,
        text: "Compress and convert large images to WebP or AVIF formats.",
    },
    PrioritizedRecommendation {
        priority: Priority::High,
        text: "Audit and remove unnecessary third-party scripts.",
    },
    PrioritizedRecommendation {
        priority: Priority::Medium,
        text: "Implement lazy loading for offscreen images.",
    },
    PrioritizedRecommendation {
        priority: Priority::Medium,
        text: "Minify and defer JavaScript where possible.",
    },
    PrioritizedRecommendation {
        priority: Priority::Low,
        text: "Enable HTTP caching for static assets to reduce repeat load impact.",
    },
];

/// A validated record plus everything the report template needs.
///
/// Serializes to a flat camelCase mapping.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedReport {
    #[serde(flatten)]
    pub record: ValidRecord,

    pub tracked_url: String,

    pub monthly_co2_kg: f64,
    pub km_equivalent: i64,
    pub bulb_hours: i64,

    pub co2_formatted: String,
    pub total_bytes_formatted: String,
    pub requests_formatted: String,
    pub monthly_co2kg_formatted: String,

    pub grade_interpretation: &'static str,
    pub grade_icon: &'static str,
    pub recommendations: &'static [&'static str],
    pub impact: String,
    pub comments: &'static str,

    pub summary: &'static str,
    pub root_causes: &'static [&'static str],
    pub detailed_recommendations: &'static [PrioritizedRecommendation],
    pub next_steps: &'static [&'static str],

    pub generated_date: NaiveDate,
    /// Relative path of the chart image, set once the chart exists.
    pub chart_filename: Option<String>,
}

/// The audited URL with campaign parameters appended to any existing query.
pub fn tracked_url(url: &str, utm: &UtmParams) -> String {
    let pairs = [
        ("utm_source", utm.source.as_str()),
        ("utm_medium", utm.medium.as_str()),
        ("utm_campaign", utm.campaign.as_str()),
    ];
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().extend_pairs(pairs);
            parsed.into()
        }
        Err(_) => {
            let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}{}", url, sep, query.join("&"))
        }
    }
}

pub fn monthly_co2_kg(co2_grams: f64) -> f64 {
    co2_grams * ASSUMED_MONTHLY_PAGE_VIEWS / 1000.0
}

pub fn km_equivalent(monthly_co2_kg: f64) -> i64 {
    (monthly_co2_kg / KG_CO2_PER_KM).round() as i64
}

pub fn bulb_hours(monthly_co2_kg: f64) -> i64 {
    (monthly_co2_kg * KWH_PER_KG_CO2 * 1000.0 / BULB_WATTS).round() as i64
}

/// Derive metrics and narrative for one record. Pure: the same record and date
/// always give the same report.
pub fn enrich(record: ValidRecord, generated_date: NaiveDate) -> EnrichedReport {
    let monthly = monthly_co2_kg(record.co2_grams);
    let km = km_equivalent(monthly);
    let bulbs = bulb_hours(monthly);
    let monthly_formatted = group_thousands(&format!("{:.1}", monthly));

    let profile = grades::lookup(&record.grade);

    EnrichedReport {
        tracked_url: tracked_url(&record.url, &record.utm),
        monthly_co2_kg: monthly,
        km_equivalent: km,
        bulb_hours: bulbs,
        co2_formatted: format!("{:.2}", record.co2_grams),
        total_bytes_formatted: number_with_commas(Some(record.total_bytes)),
        requests_formatted: number_with_commas(Some(record.requests)),
        impact: profile.impact(&monthly_formatted, km, bulbs),
        monthly_co2kg_formatted: monthly_formatted,
        grade_interpretation: profile.interpretation,
        grade_icon: profile.icon,
        recommendations: profile.recommendations,
        comments: profile.comments,
        summary: SUMMARY,
        root_causes: ROOT_CAUSES,
        detailed_recommendations: DETAILED_RECOMMENDATIONS,
        next_steps: NEXT_STEPS,
        generated_date,
        chart_filename: None,
        record,
    }
}
