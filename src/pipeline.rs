//! Batch orchestration: fetch, validate, then enrich, chart, render and write
//! each record in turn.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::chart::{ChartRenderer, ChartRequest, QuickChart};
use crate::enrich::enrich;
use crate::error::PipelineError;
use crate::format::slugify;
use crate::notion::{AuditSource, NotionClient};
use crate::record::{validate, ValidRecord};
use crate::render::{DocumentRenderer, HandlebarsRenderer};
use crate::settings::Settings;

pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const ASSETS_DIR: &str = "assets";

/// Where reports and chart images go.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    report_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        OutputLayout {
            report_dir: report_dir.into(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.report_dir.join(ASSETS_DIR)
    }

    pub fn report_path(&self, organization_name: &str) -> PathBuf {
        self.report_dir.join(format!("{}.html", slugify(organization_name)))
    }

    /// Create the report and asset directories. Safe to call repeatedly.
    pub async fn prepare(&self) -> Result<(), PipelineError> {
        let assets = self.assets_dir();
        tokio::fs::create_dir_all(&assets)
            .await
            .map_err(|source| PipelineError::Write { path: assets, source })
    }
}

/// Outcome of a completed batch.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub fetched: usize,
    pub valid: usize,
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn rejected(&self) -> usize {
        self.fetched - self.valid
    }
}

pub struct Pipeline<S, C, D> {
    pub source: S,
    pub charts: C,
    pub documents: D,
    pub layout: OutputLayout,
}

impl<S, C, D> Pipeline<S, C, D>
where
    S: AuditSource,
    C: ChartRenderer,
    D: DocumentRenderer,
{
    /// Run the whole batch. The first failure aborts the remaining records.
    pub async fn run(&self, generated_date: NaiveDate) -> Result<RunSummary, PipelineError> {
        let raw = self.source.fetch_all().await?;
        let fetched = raw.len();
        let records = validate(raw);
        let valid = records.len();
        info!("{} of {} fetched records are valid", valid, fetched);

        if records.is_empty() {
            warn!("No valid entries found in datastore, nothing to generate");
            return Ok(RunSummary {
                fetched,
                valid,
                written: Vec::new(),
            });
        }

        self.layout.prepare().await?;
        info!(
            "Generating {} reports in {}",
            valid,
            self.layout.report_dir().display()
        );

        let pb = ProgressBar::new(valid as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let mut slugs = HashSet::new();
        let mut written = Vec::with_capacity(valid);
        for record in records {
            let slug = slugify(&record.organization_name);
            if !slugs.insert(slug.clone()) {
                warn!(
                    organization = %record.organization_name,
                    "Slug '{}' already used in this batch, earlier report will be overwritten",
                    slug
                );
            }
            pb.set_message(record.organization_name.clone());

            let path = self.process_record(record, generated_date).await?;
            written.push(path);
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!("All {} reports generated", written.len());
        Ok(RunSummary {
            fetched,
            valid,
            written,
        })
    }

    async fn process_record(
        &self,
        record: ValidRecord,
        generated_date: NaiveDate,
    ) -> Result<PathBuf, PipelineError> {
        let organization = record.organization_name.clone();
        let render_err = |source| PipelineError::Render {
            organization: organization.clone(),
            source,
        };

        let mut report = enrich(record, generated_date);

        let chart = self
            .charts
            .render(&ChartRequest::from(&report.record), &self.layout.assets_dir())
            .await
            .map_err(render_err)?;
        report.chart_filename = Some(format!("{}/{}", ASSETS_DIR, chart));

        let html = self.documents.render(&report).map_err(render_err)?;

        let path = self.layout.report_path(&organization);
        tokio::fs::write(&path, html)
            .await
            .map_err(|source| PipelineError::Write {
                path: path.clone(),
                source,
            })?;
        info!("Created report for {} -> {}", organization, path.display());
        Ok(path)
    }
}

/// Production wiring: Notion source, QuickChart charts, Handlebars template.
pub async fn generate_reports(
    settings: &Settings,
    report_dir: &Path,
    template: &Path,
) -> Result<RunSummary, PipelineError> {
    let documents = HandlebarsRenderer::from_file(template).map_err(PipelineError::Template)?;
    let pipeline = Pipeline {
        source: NotionClient::new(settings),
        charts: QuickChart::new(settings),
        documents,
        layout: OutputLayout::new(report_dir),
    };
    pipeline.run(chrono::Utc::now().date_naive()).await
}
