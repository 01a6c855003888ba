//! Turns website-sustainability audit records held in a Notion database into
//! one rendered HTML report (plus metrics chart) per organization.

pub mod chart;
pub mod enrich;
pub mod error;
pub mod format;
pub mod grades;
pub mod notion;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod settings;
