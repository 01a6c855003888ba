use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;

use eco_reports::notion::{AuditSource, NotionClient};
use eco_reports::pipeline::{self, DEFAULT_OUTPUT_DIR};
use eco_reports::record::ValidRecord;
use eco_reports::render::TEMPLATE_PATH;
use eco_reports::settings::Settings;

#[derive(Parser)]
#[command(name = "eco_reports", about = "Website sustainability reports from Notion audit records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch audit records and write one HTML report (with chart) per organization
    Generate {
        /// Directory receiving the reports; charts go to its assets/ subdirectory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        /// Handlebars report template
        #[arg(short, long, default_value = TEMPLATE_PATH)]
        template: PathBuf,
    },
    /// Fetch audit records and list them without writing anything
    List {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Generate {
            output_dir,
            template,
        } => generate(&settings, output_dir, template).await,
        Commands::List { limit } => list(&settings, limit).await,
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn generate(settings: &Settings, output_dir: PathBuf, template: PathBuf) -> anyhow::Result<()> {
    println!("Fetching audit data from Notion...");
    let summary = pipeline::generate_reports(settings, &output_dir, &template)
        .await
        .context("report generation aborted")?;

    if summary.written.is_empty() {
        println!(
            "No valid entries found ({} fetched, {} rejected). Nothing written.",
            summary.fetched,
            summary.rejected()
        );
        return Ok(());
    }
    println!(
        "Generated {} reports in {} ({} fetched, {} rejected).",
        summary.written.len(),
        output_dir.display(),
        summary.fetched,
        summary.rejected()
    );
    Ok(())
}

async fn list(settings: &Settings, limit: usize) -> anyhow::Result<()> {
    let records = NotionClient::new(settings)
        .fetch_all()
        .await
        .context("failed to fetch audit records")?;
    if records.is_empty() {
        println!("No records in database.");
        return Ok(());
    }

    println!(
        "{:>3} | {:<28} | {:<32} | {:<10} | {:>8} | {:>5} | {:<5}",
        "#", "Organisation", "URL", "Grade", "CO2 (g)", "Reqs", "Valid"
    );
    println!("{}", "-".repeat(108));

    let total = records.len();
    let mut valid = 0usize;
    for (i, r) in records.into_iter().enumerate() {
        let show = i < limit;
        let row = (
            truncate(r.organization_name.as_deref().unwrap_or("-"), 28),
            truncate(r.url.as_deref().unwrap_or("-"), 32),
            truncate(&r.grade, 10),
            r.co2_grams,
            r.requests,
        );
        let ok = ValidRecord::try_from(r).is_ok();
        if ok {
            valid += 1;
        }
        if show {
            println!(
                "{:>3} | {:<28} | {:<32} | {:<10} | {:>8.2} | {:>5} | {:<5}",
                i + 1,
                row.0,
                row.1,
                row.2,
                row.3,
                row.4,
                if ok { "yes" } else { "no" }
            );
        }
    }

    println!("\n{} records | {} valid | {} rejected", total, valid, total - valid);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
