//! Triage CLI - patient risk assessment batch job
//!
//! The `triage` command collects patient records from the assessment
//! service, scores them, and submits the classification.
//!
//! ## Commands
//!
//! - `run`: collect, score, classify and submit
//! - `score`: score a local JSON file without touching the network
//! - `check`: validate configuration and fetch the first page once

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use triage_core::{
    classify, score_all, Assessment, AssessmentReport, ClassificationSet, PageSource,
    PatientPage, RetryPolicy, ScoredPatient, ServiceClient, ServiceConfig, DEFAULT_BASE_URL,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Patient risk triage against the assessment service", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect all patients, score them, and submit the classification
    Run {
        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        retry: RetryArgs,

        /// Classify without submitting
        #[arg(long)]
        dry_run: bool,

        /// Also write the submission payload to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score records from a local JSON file (listing page or array of records)
    Score {
        /// Path to the JSON file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate configuration and fetch page 1 once
    Check {
        #[command(flatten)]
        service: ServiceArgs,
    },
}

#[derive(Args)]
struct ServiceArgs {
    /// Base URL of the assessment service
    #[arg(long, env = "TRIAGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// API key sent as the x-api-key header
    #[arg(long, env = "TRIAGE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "TRIAGE_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,
}

impl ServiceArgs {
    fn client(&self) -> Result<ServiceClient> {
        let config = ServiceConfig::new(&self.base_url, &self.api_key)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        ServiceClient::new(config).context("Invalid service configuration")
    }
}

#[derive(Args)]
struct RetryArgs {
    /// Pause between retries of a failing page, in milliseconds
    #[arg(long, default_value = "1000")]
    backoff_ms: u64,

    /// Give up on a page after this many attempts (default: retry forever)
    #[arg(long)]
    max_attempts: Option<u32>,
}

impl RetryArgs {
    fn policy(&self) -> RetryPolicy {
        let backoff = Duration::from_millis(self.backoff_ms);
        match self.max_attempts {
            Some(max) => RetryPolicy::capped(backoff, max),
            None => RetryPolicy::unbounded(backoff),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    triage_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            service,
            retry,
            dry_run,
            output,
        } => cmd_run(&service, &retry, dry_run, output.as_deref()).await,
        Commands::Score { file, format } => cmd_score(&file, format),
        Commands::Check { service } => cmd_check(&service).await,
    }
}

async fn cmd_run(
    service: &ServiceArgs,
    retry: &RetryArgs,
    dry_run: bool,
    output: Option<&Path>,
) -> Result<()> {
    let client = service.client()?;
    let assessment = Assessment::new(&client, retry.policy());

    let outcome = if dry_run {
        assessment.dry_run().await
    } else {
        assessment.run(&client).await
    };
    let report = outcome.context("Assessment failed")?;

    if let Some(path) = output {
        write_payload(path, &report.classification)?;
        info!(path = %path.display(), "wrote submission payload");
    }

    print!("{}", render_report(&report));
    Ok(())
}

fn cmd_score(file: &Path, format: OutputFormat) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    // Decode problems are already logged at warn.
    let page = PatientPage::decode(&bytes);

    let scored = score_all(&page.records);
    let classification = classify(&scored);

    match format {
        OutputFormat::Text => print!("{}", render_scores(&scored, &classification)),
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "scores": scored,
                "classification": classification,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

async fn cmd_check(service: &ServiceArgs) -> Result<()> {
    let client = service.client()?;
    println!("Service: {}", client.config().base_url);

    let page = client
        .fetch_page(1)
        .await
        .context("Failed to fetch page 1")?;

    println!("✓ Page 1 reachable");
    println!("  Records:  {}", page.records.len());
    println!("  Has next: {}", page.has_next);
    if page.decode_issues > 0 {
        println!("  Decode issues: {}", page.decode_issues);
    }
    Ok(())
}

fn write_payload(path: &Path, classification: &ClassificationSet) -> Result<()> {
    let json = serde_json::to_string_pretty(classification)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn render_report(report: &AssessmentReport) -> String {
    let c = &report.classification;
    let m = &report.metrics;
    let mut out = String::new();
    out.push_str(&format!("Assessment {}\n", report.run_id));
    out.push_str(&format!(
        "  Pages:    {} ({} retries, {} malformed)\n",
        m.pages_fetched, m.fetch_retries, m.malformed_pages
    ));
    out.push_str(&format!("  Patients: {}\n", m.records_scored));
    out.push_str(&format!("  Duration: {} ms\n", m.duration_ms));
    out.push_str(&format!("  High risk:     {}\n", c.high_risk.len()));
    out.push_str(&format!("  Fever:         {}\n", c.fever.len()));
    out.push_str(&format!("  Data quality:  {}\n", c.data_quality.len()));

    match &report.receipt {
        Some(receipt) => {
            out.push_str(&format!("Submitted (HTTP {})\n", receipt.status));
            let body = serde_json::to_string_pretty(&receipt.body)
                .unwrap_or_else(|_| receipt.body.to_string());
            out.push_str(&body);
            out.push('\n');
        }
        None => out.push_str("Dry run: nothing submitted\n"),
    }
    out
}

fn render_scores(scored: &[ScoredPatient], classification: &ClassificationSet) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>3} {:>5} {:>4} {:>6}  FLAGS\n",
        "PATIENT", "BP", "TEMP", "AGE", "TOTAL"
    ));
    for patient in scored {
        let s = &patient.score;
        let mut flags = Vec::new();
        if s.is_high_risk() {
            flags.push("high-risk");
        }
        if s.has_fever {
            flags.push("fever");
        }
        if s.is_data_quality_issue {
            flags.push("data-quality");
        }
        out.push_str(&format!(
            "{:<12} {:>3} {:>5} {:>4} {:>6}  {}\n",
            patient.patient_id,
            s.bp_stage,
            s.temp_stage,
            s.age_stage,
            s.total_score,
            flags.join(",")
        ));
    }
    out.push_str(&format!(
        "\n{} high risk, {} fever, {} data quality\n",
        classification.high_risk.len(),
        classification.fever.len(),
        classification.data_quality.len()
    ));
    out
}
