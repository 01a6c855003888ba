use std::path::{Path, PathBuf};

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, Renderable,
};

use serde_json::Value;

use crate::enrich::EnrichedReport;
use crate::error::RenderError;

/// Report template shipped with the crate.
pub const TEMPLATE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/report_template.hbs");

const TEMPLATE_NAME: &str = "report";

/// Turns an enriched report into a finished document.
pub trait DocumentRenderer {
    fn render(&self, report: &EnrichedReport) -> Result<String, RenderError>;
}

/// Strict equality for template params. Numbers compare by value, so `1`
/// equals `1.0`.
fn params_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

/// `{{#ifEquals a b}}..{{else}}..{{/ifEquals}}`: main block when both params
/// are equal values, inverse block otherwise.
struct IfEquals;

impl HelperDef for IfEquals {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let equal = match (h.param(0), h.param(1)) {
            (Some(a), Some(b)) => params_equal(a.value(), b.value()),
            _ => false,
        };
        let branch = if equal {
            h.template()
        } else {
            h.inverse()
        };
        match branch {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.register_helper("ifEquals", Box::new(IfEquals));
        registry.register_template_string(TEMPLATE_NAME, source)?;
        Ok(HandlebarsRenderer { registry })
    }

    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        Self::from_source(&source)
    }
}

impl DocumentRenderer for HandlebarsRenderer {
    fn render(&self, report: &EnrichedReport) -> Result<String, RenderError> {
        Ok(self.registry.render(TEMPLATE_NAME, report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::record::{UtmParams, ValidRecord};
    use chrono::NaiveDate;

    fn report(grade: &str) -> EnrichedReport {
        let record = ValidRecord {
            organization_name: "Acme & Sons".into(),
            url: "https://acme.test".into(),
            co2_grams: 1.0,
            total_bytes: 2048000.0,
            requests: 50,
            grade: grade.into(),
            utm: UtmParams::default(),
        };
        enrich(record, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn interpolates_fields() {
        let r = HandlebarsRenderer::from_source("{{organizationName}} | {{kmEquivalent}} | {{generatedDate}}")
            .unwrap();
        assert_eq!(r.render(&report("C (🌳)")).unwrap(), "Acme &amp; Sons | 833 | 2026-10-18");
    }

    #[test]
    fn iterates_lists() {
        let r = HandlebarsRenderer::from_source("{{#each nextSteps}}[{{this}}]{{/each}}").unwrap();
        let out = r.render(&report("C (🌳)")).unwrap();
        assert_eq!(out.matches('[').count(), 4);
    }

    #[test]
    fn if_equals_picks_branch() {
        let r = HandlebarsRenderer::from_source(
            "{{#each detailedRecommendations}}{{#ifEquals priority \"High\"}}H{{else}}-{{/ifEquals}}{{/each}}",
        )
        .unwrap();
        assert_eq!(r.render(&report("C (🌳)")).unwrap(), "HH---");

        let r = HandlebarsRenderer::from_source("{{#ifEquals grade \"C (🌳)\"}}yes{{else}}no{{/ifEquals}}")
            .unwrap();
        assert_eq!(r.render(&report("C (🌳)")).unwrap(), "yes");
        assert_eq!(r.render(&report("A (🌳🌳🌳)")).unwrap(), "no");
    }

    #[test]
    fn if_equals_compares_numbers_by_value() {
        let r = HandlebarsRenderer::from_source(
            "{{#ifEquals co2Grams 1}}eq{{else}}ne{{/ifEquals}}|\
             {{#ifEquals kmEquivalent 833}}eq{{else}}ne{{/ifEquals}}|\
             {{#ifEquals monthlyCo2Kg 100}}eq{{else}}ne{{/ifEquals}}|\
             {{#ifEquals bulbHours 601}}eq{{else}}ne{{/ifEquals}}|\
             {{#ifEquals requests \"50\"}}eq{{else}}ne{{/ifEquals}}",
        )
        .unwrap();
        assert_eq!(r.render(&report("C (🌳)")).unwrap(), "eq|eq|eq|ne|ne");
    }

    #[test]
    fn shipped_template_renders() {
        let r = HandlebarsRenderer::from_file(Path::new(TEMPLATE_PATH)).unwrap();
        let html = r.render(&report("C (🌳)")).unwrap();
        assert!(html.contains("Acme &amp; Sons"));
        assert!(html.contains("Moderate performance; optimisation recommended."));
        assert!(html.contains("Minimise HTTP requests."));
        assert!(html.contains("https://acme.test/?utm_source"));
        assert!(html.contains("utm_campaign"));
    }

    #[test]
    fn broken_template_is_rejected() {
        assert!(matches!(
            HandlebarsRenderer::from_source("{{#each rootCauses}}"),
            Err(RenderError::Template(_))
        ));
    }

    #[test]
    fn missing_template_file_is_io_error() {
        assert!(matches!(
            HandlebarsRenderer::from_file(Path::new("/nonexistent/report.hbs")),
            Err(RenderError::Io { .. })
        ));
    }
}
