//! AdWords CLI
//!
//! Entry point for the `adwords` command-line tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

use adwords_client::cancel::{CancelToken, SignalHandler};
use adwords_client::config::{ApiConfig, AppConfig, EffectiveConfig};
use adwords_client::jobs::{JobCoordinator, JobError, JobPart, JobStatus};
use adwords_client::logging::init_logging;
use adwords_client::protocol::ops::data::fields;
use adwords_client::protocol::ops::{Predicate, Selector, SortOrder};
use adwords_client::sandbox::SandboxServer;
use adwords_client::service::{HttpTransport, MockTransport, ServiceFactory, Transport};
use adwords_client::summary::{ExitCode, JobSummary};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Developer token used when `--sandbox` runs without one configured
const SANDBOX_DEVELOPER_TOKEN: &str = "sandbox-developer-token";

#[derive(Parser)]
#[command(name = "adwords")]
#[command(about = "AdWords API client: bulk mutate jobs and paged queries", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Override api.server
    #[arg(long, global = true)]
    server: Option<String>,

    /// Override api.client_customer_id
    #[arg(long, global = true)]
    client_customer_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Bulk mutate job commands
    Jobs {
        #[command(subcommand)]
        action: JobsCommands,
    },

    /// List keyword bid simulations for one criterion
    Landscape {
        #[arg(long)]
        ad_group_id: i64,

        #[arg(long)]
        criterion_id: i64,

        /// Landscape points per page
        #[arg(long, default_value_t = 100)]
        page_size: u32,

        /// Run against the in-process sandbox
        #[arg(long)]
        sandbox: bool,
    },

    /// List the ad groups of a campaign
    AdGroups {
        #[arg(long)]
        campaign_id: i64,

        /// Ad groups per page
        #[arg(long, default_value_t = 100)]
        page_size: u32,

        /// Run against the in-process sandbox
        #[arg(long)]
        sandbox: bool,
    },
}

#[derive(Subcommand)]
enum JobsCommands {
    /// Create a job, upload every part, wait for it and fetch the results
    Run {
        /// JSON file of the form {"parts": [...]}
        #[arg(long)]
        parts: PathBuf,

        /// Run against the in-process sandbox
        #[arg(long)]
        sandbox: bool,

        /// Override jobs.poll_interval_ms
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Override jobs.timeout_seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write the job summary JSON here
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
struct PartsFile {
    parts: Vec<JobPart>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_json) {
        eprintln!("Warning: {}", e);
    }

    let overrides = GlobalOverrides {
        server: cli.server,
        client_customer_id: cli.client_customer_id,
    };

    match cli.command {
        Commands::Config { json } => run_config(&overrides, json),
        Commands::Jobs { action } => match action {
            JobsCommands::Run {
                parts,
                sandbox,
                poll_interval_ms,
                timeout_secs,
                summary,
            } => run_jobs(
                &overrides,
                &parts,
                sandbox,
                poll_interval_ms,
                timeout_secs,
                summary.as_deref(),
            ),
        },
        Commands::Landscape {
            ad_group_id,
            criterion_id,
            page_size,
            sandbox,
        } => run_landscape(&overrides, ad_group_id, criterion_id, page_size, sandbox),
        Commands::AdGroups {
            campaign_id,
            page_size,
            sandbox,
        } => run_ad_groups(&overrides, campaign_id, page_size, sandbox),
    }
}

struct GlobalOverrides {
    server: Option<String>,
    client_customer_id: Option<String>,
}

impl GlobalOverrides {
    /// CLI layer for the config merge; `None` when no flag was given
    fn to_layer(&self, poll_interval_ms: Option<u64>, timeout_secs: Option<u64>) -> Option<Value> {
        let mut api = Map::new();
        if let Some(server) = &self.server {
            api.insert("server".to_string(), json!(server));
        }
        if let Some(id) = &self.client_customer_id {
            api.insert("client_customer_id".to_string(), json!(id));
        }

        let mut jobs = Map::new();
        if let Some(ms) = poll_interval_ms {
            jobs.insert("poll_interval_ms".to_string(), json!(ms));
        }
        if let Some(secs) = timeout_secs {
            jobs.insert("timeout_seconds".to_string(), json!(secs));
        }

        if api.is_empty() && jobs.is_empty() {
            return None;
        }
        Some(json!({ "api": api, "jobs": jobs }))
    }
}

fn exit_with(code: ExitCode) -> ! {
    process::exit(code.as_i32())
}

fn load_config(overrides: &GlobalOverrides, poll_interval_ms: Option<u64>, timeout_secs: Option<u64>) -> EffectiveConfig {
    match EffectiveConfig::load_default(overrides.to_layer(poll_interval_ms, timeout_secs)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            exit_with(ExitCode::InvalidInput);
        }
    }
}

/// Build the service factory, in-process when `sandbox` is set
fn build_factory(app: &AppConfig, sandbox: bool) -> ServiceFactory {
    let mut api: ApiConfig = app.api.clone();

    let transport: Arc<dyn Transport> = if sandbox {
        if api.developer_token.trim().is_empty() {
            api.developer_token = SANDBOX_DEVELOPER_TOKEN.to_string();
        }
        let server = SandboxServer::new();
        let seed = server.seed_demo();
        tracing::info!(
            campaign_id = seed.campaign_id,
            ad_group_id = seed.ad_group_id,
            criterion_id = seed.criterion_id,
            "sandbox seeded"
        );
        Arc::new(MockTransport::with_server(server))
    } else {
        match HttpTransport::new(api.timeout(), api.enable_gzip) {
            Ok(t) => Arc::new(t),
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_with(ExitCode::RemoteUnavailable);
            }
        }
    };

    ServiceFactory::new(api, transport)
}

fn run_config(overrides: &GlobalOverrides, json: bool) {
    let config = load_config(overrides, None, None);

    if json {
        match config.to_json() {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                exit_with(ExitCode::InvalidInput);
            }
        }
        return;
    }

    println!("Effective configuration ({})", config.schema_id);
    println!();
    println!("Sources:");
    for source in &config.sources {
        match (&source.path, &source.digest) {
            (Some(path), Some(digest)) => {
                println!("  {:?}: {} (sha256 {})", source.origin, path, &digest[..12.min(digest.len())])
            }
            _ => println!("  {:?}", source.origin),
        }
    }
    println!();
    let api = &config.app().api;
    let jobs = &config.app().jobs;
    println!("api.server              {}", api.server);
    println!("api.user_agent          {}", api.user_agent);
    println!(
        "api.client_customer_id  {}",
        api.client_customer_id.as_deref().unwrap_or("-")
    );
    println!("api.timeout_seconds     {}", api.timeout_seconds);
    println!("api.validate_only       {}", api.validate_only);
    println!("jobs.poll_interval_ms   {}", jobs.poll_interval_ms);
    println!("jobs.timeout_seconds    {}", jobs.timeout_seconds);
    println!("jobs.status_retries     {}", jobs.status_retries);
    if !config.redactions.is_empty() {
        println!();
        println!("Redacted: {}", config.redactions.join(", "));
    }
}

fn read_parts(path: &Path) -> Vec<JobPart> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            exit_with(ExitCode::InvalidInput);
        }
    };
    match serde_json::from_str::<PartsFile>(&content) {
        Ok(file) => file.parts,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path.display(), e);
            exit_with(ExitCode::InvalidInput);
        }
    }
}

fn run_jobs(
    overrides: &GlobalOverrides,
    parts_path: &Path,
    sandbox: bool,
    poll_interval_ms: Option<u64>,
    timeout_secs: Option<u64>,
    summary_path: Option<&Path>,
) {
    let config = load_config(overrides, poll_interval_ms, timeout_secs);
    let parts = read_parts(parts_path);
    let factory = build_factory(config.app(), sandbox);

    let service = match factory.bulk_mutate_job_service() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_with(ExitCode::InvalidInput);
        }
    };

    let token = CancelToken::new();
    if let Err(e) = SignalHandler::new(token.clone()).install() {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    let coordinator = JobCoordinator::new(service);
    let total_parts = u32::try_from(parts.len()).unwrap_or(u32::MAX);
    let mut handle = match coordinator.create_job(total_parts) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_with(e.failure_kind().exit_code());
        }
    };

    let started = Instant::now();
    let poll_config = config.app().jobs.poll_config();

    let mut run = || -> Result<JobSummary, JobError> {
        for part in &parts {
            coordinator.submit_part(&mut handle, part)?;
        }
        let outcome = coordinator.await_completion(&mut handle, &poll_config, &token)?;
        if outcome.status == JobStatus::Completed {
            let results = coordinator.fetch_results(&handle)?;
            Ok(JobSummary::completed(&handle, &outcome, &results))
        } else {
            Ok(JobSummary::failed(&handle, &outcome))
        }
    };

    let summary = match run() {
        Ok(s) => s,
        Err(e) => JobSummary::from_error(&handle, &e, started.elapsed()),
    };

    eprintln!("{}", summary.human_summary);
    match summary.to_json() {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error serializing summary: {}", e),
    }
    if let Some(path) = summary_path {
        if let Err(e) = summary.write_to_file(path) {
            eprintln!("Error writing summary to {}: {}", path.display(), e);
        }
    }

    process::exit(summary.exit_code);
}

fn run_landscape(overrides: &GlobalOverrides, ad_group_id: i64, criterion_id: i64, page_size: u32, sandbox: bool) {
    let config = load_config(overrides, None, None);
    let factory = build_factory(config.app(), sandbox);
    let service = match factory.data_service() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_with(ExitCode::InvalidInput);
        }
    };

    let selector = Selector::builder()
        .fields([
            fields::AD_GROUP_ID,
            fields::CRITERION_ID,
            fields::START_DATE,
            fields::END_DATE,
            fields::BID,
            fields::LOCAL_CLICKS,
            fields::LOCAL_COST,
            fields::LOCAL_IMPRESSIONS,
        ])
        .predicate(Predicate::equals(fields::AD_GROUP_ID, ad_group_id))
        .predicate(Predicate::equals(fields::CRITERION_ID, criterion_id))
        .page_size(page_size)
        .build();

    let mut points = 0usize;
    for page in service.bid_landscapes(selector) {
        let page = match page {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_with(JobError::from_service(e).failure_kind().exit_code());
            }
        };
        for landscape in &page.entries {
            println!(
                "Criterion {} in ad group {} ({} to {}):",
                landscape.criterion_id, landscape.ad_group_id, landscape.start_date, landscape.end_date
            );
            for point in &landscape.landscape_points {
                println!(
                    "  bid {:>12}  clicks {:>6}  cost {:>12}  impressions {:>8}",
                    point.bid.micro_amount, point.clicks, point.cost.micro_amount, point.impressions
                );
                points += 1;
            }
        }
    }

    if points == 0 {
        println!("No bid landscape points found.");
    }
}

fn run_ad_groups(overrides: &GlobalOverrides, campaign_id: i64, page_size: u32, sandbox: bool) {
    let config = load_config(overrides, None, None);
    let factory = build_factory(config.app(), sandbox);
    let service = match factory.ad_group_service() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_with(ExitCode::InvalidInput);
        }
    };

    let selector = Selector::builder()
        .fields(["Id", "Name", "Status"])
        .predicate(Predicate::equals("CampaignId", campaign_id))
        .order_by("Name", SortOrder::Ascending)
        .page_size(page_size)
        .build();

    let mut count = 0usize;
    for group in service.pages(selector).entries() {
        let group = match group {
            Ok(g) => g,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_with(JobError::from_service(e).failure_kind().exit_code());
            }
        };
        println!(
            "{:>10}  {:<10}  {}",
            group.id.map(|id| id.to_string()).unwrap_or_default(),
            group.status.as_str(),
            group.name
        );
        count += 1;
    }

    println!("{} ad group(s)", count);
}
