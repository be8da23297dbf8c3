//! ETL Monitoring Dashboard
//!
//! Headless front-end for the ETL backend: watch the live panels or run a
//! single read or action from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use etl_dashboard::actions::{outcome_notice, Mutation};
use etl_dashboard::api::types::{
    DashboardStats, SystemHealth, UploadFile, UploadOptions, UploadRequest,
};
use etl_dashboard::query::Displayed;
use etl_dashboard::summary::{AnomalySummary, ErrorSummary};
use etl_dashboard::{ActionError, Actions, ApiClient, Queries, QueryCache, RefreshTable, Settings};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "etl-dashboard")]
#[command(about = "ETL monitoring dashboard client")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides settings and ETL_DASHBOARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level (defaults to RUST_LOG, then info)
    #[arg(short, long, global = true)]
    log_level: Option<Level>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow dashboard stats, system health, jobs and resource usage until Ctrl-C
    Watch,
    /// List data sources
    Sources,
    /// Show one page of the error log
    Errors {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List anomalies with per-source counts
    Anomalies,
    /// Acknowledge an anomaly
    AckAnomaly { id: String },
    /// Enable or disable a data source's schedule
    ToggleSchedule { id: String },
    /// Upload files for processing
    Upload {
        /// Where processed records are written
        #[arg(long)]
        sink: String,
        #[arg(long)]
        validate_schema: bool,
        #[arg(long)]
        error_correction: bool,
        #[arg(long)]
        anomaly_detection: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_logging(level: Option<Level>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_level);

    let settings = Settings::load().with_api_url_override(args.api_url);
    tracing::debug!("Using backend at {}", settings.api_url);

    let client = ApiClient::from_settings(&settings);
    let cache = QueryCache::with_refresh_table(RefreshTable::from_settings(&settings));
    let queries = Queries::with_settings(client.clone(), &settings);
    let actions = Actions::new(client, cache.clone());

    match args.command {
        Command::Watch => watch(&cache, &queries).await,
        Command::Sources => sources(&cache, &queries).await,
        Command::Errors { page, limit } => {
            let page = page.unwrap_or(etl_dashboard::api::DEFAULT_PAGE);
            let limit = limit.unwrap_or(queries.page_size());
            errors(&cache, &queries, page, limit).await
        }
        Command::Anomalies => anomalies(&cache, &queries).await,
        Command::AckAnomaly { id } => {
            let result = actions.acknowledge_anomaly(&id).await;
            report(Mutation::AcknowledgeAnomaly, result, |_| None)
        }
        Command::ToggleSchedule { id } => {
            let result = actions.toggle_schedule(&id).await;
            report(Mutation::ToggleSchedule, result, |_| None)
        }
        Command::Upload {
            sink,
            validate_schema,
            error_correction,
            anomaly_detection,
            files,
        } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                match UploadFile::from_path(path).await {
                    Ok(file) => uploads.push(file),
                    Err(e) => return report::<()>(Mutation::UploadFiles, Err(e.into()), |_| None),
                }
            }
            let upload = UploadRequest {
                files: uploads,
                target_sink: sink,
                options: Some(UploadOptions {
                    validate_schema,
                    error_correction,
                    anomaly_detection,
                }),
            };
            let result = actions.upload_files(&upload).await;
            report(Mutation::UploadFiles, result, |receipt| {
                Some(format!(
                    "job {} started for {} file(s)",
                    receipt.job_id, receipt.files_processed
                ))
            })
        }
    }
}

/// Print the outcome of an action; failures also set the exit status.
fn report<T>(
    mutation: Mutation,
    result: Result<T, ActionError>,
    detail: impl FnOnce(&T) -> Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", outcome_notice(mutation, &result));
    match result {
        Ok(value) => {
            if let Some(detail) = detail(&value) {
                println!("{detail}");
            }
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn sources(
    cache: &QueryCache,
    queries: &Queries,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = cache.fetch(&queries.data_sources()).await;
    let Some(sources) = state.data else {
        return Err(state.error.unwrap_or_default().into());
    };
    for source in sources.iter() {
        let schedule = match &source.schedule {
            Some(s) if s.enabled => s
                .next_run
                .clone()
                .unwrap_or_else(|| "scheduled".to_string()),
            _ => "manual".to_string(),
        };
        println!(
            "{:<12} {:<28} {:<10?} {:<8?} {:>10} records  {}",
            source.id,
            source.name,
            source.source_type,
            source.status,
            source.records_count,
            schedule
        );
    }
    Ok(())
}

async fn errors(
    cache: &QueryCache,
    queries: &Queries,
    page: u32,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = cache.fetch(&queries.data_errors_page(page, limit)).await;
    let Some(errors) = state.data else {
        return Err(state.error.unwrap_or_default().into());
    };
    let summary = ErrorSummary::from_errors(&errors.data);
    println!(
        "page {}/{} ({} errors total, {} open on this page)",
        errors.page,
        errors.page_count(),
        errors.total,
        summary.open()
    );
    for error in &errors.data {
        println!(
            "{:<10} {:<10?} {:<8?} {:<10?} {}",
            error.id, error.kind, error.severity, error.status, error.message
        );
    }
    Ok(())
}

async fn anomalies(
    cache: &QueryCache,
    queries: &Queries,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = cache.fetch(&queries.anomalies()).await;
    let Some(anomalies) = state.data else {
        return Err(state.error.unwrap_or_default().into());
    };
    let summary = AnomalySummary::from_anomalies(anomalies.iter());
    println!(
        "{} anomalies: {} active, {} critical, {} resolved",
        summary.total, summary.active, summary.critical, summary.resolved
    );
    for (source, counts) in AnomalySummary::by_source(&anomalies) {
        let marker = if counts.needs_attention() { "!" } else { " " };
        println!(
            "{marker} {source}: {} anomalies, {} active, {} critical",
            counts.total, counts.active, counts.critical
        );
    }
    for anomaly in anomalies.iter() {
        println!(
            "{:<10} {:<8?} {:<14?} {}",
            anomaly.id, anomaly.severity, anomaly.status, anomaly.title
        );
    }
    Ok(())
}

async fn watch(cache: &QueryCache, queries: &Queries) -> Result<(), Box<dyn std::error::Error>> {
    for (resource, interval) in cache.refresh_table().polled() {
        tracing::info!("Polling {:?} every {:?}", resource, interval);
    }

    let mut stats = cache.subscribe(&queries.dashboard_stats());
    let mut health = cache.subscribe(&queries.system_health());
    let mut jobs = cache.subscribe(&queries.processing_jobs());
    let mut usage = cache.subscribe(&queries.resource_usage());

    loop {
        tokio::select! {
            state = stats.changed() => {
                if state.status.is_settled() {
                    let shown = state.or_placeholder(DashboardStats::placeholder());
                    log_stats(&shown, state.error.as_deref());
                }
            }
            state = health.changed() => {
                if state.status.is_settled() {
                    let shown = state.or_placeholder(SystemHealth::placeholder());
                    log_health(&shown, state.error.as_deref());
                }
            }
            state = jobs.changed() => {
                match (&state.data, &state.error) {
                    (_, Some(error)) if state.is_error() => {
                        tracing::warn!("processing jobs: {error}")
                    }
                    (Some(jobs), _) if state.status.is_settled() => {
                        for job in jobs.iter() {
                            tracing::info!(
                                "job {} {} {:?} {:.0}% ({}/{} records)",
                                job.id, job.file_name, job.status, job.progress,
                                job.records_processed, job.total_records
                            );
                        }
                    }
                    _ => {}
                }
            }
            state = usage.changed() => {
                if let (Some(resources), true) = (&state.data, state.status.is_settled()) {
                    for r in resources.iter() {
                        tracing::info!(
                            "{} {:.0}% ({} / {} {})",
                            r.name, r.utilization() * 100.0, r.usage, r.total, r.unit
                        );
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping");
                break;
            }
        }
    }
    Ok(())
}

fn log_stats(stats: &Displayed<DashboardStats>, error: Option<&str>) {
    let s = stats.value();
    let tag = if stats.is_placeholder() { " (placeholder)" } else { "" };
    tracing::info!(
        "stats{tag}: {} sources, {} files today, {} active errors, {:.1}% success",
        s.total_sources,
        s.files_processed_today,
        s.active_errors,
        s.success_rate
    );
    if let Some(error) = error {
        tracing::warn!("dashboard stats: {error}");
    }
}

fn log_health(health: &Displayed<SystemHealth>, error: Option<&str>) {
    let h = health.value();
    let tag = if health.is_placeholder() { " (placeholder)" } else { "" };
    tracing::info!(
        "health{tag}: cpu {:.0}% memory {:.0}% storage {:.0}% network {:.0}%",
        h.cpu,
        h.memory,
        h.storage,
        h.network
    );
    if let Some(error) = error {
        tracing::warn!("system health: {error}");
    }
}
