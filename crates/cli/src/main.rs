use anyhow::Context;
use clap::{Parser, Subcommand};
use smegrowth_core::client::{ApiClient, DashboardSource, PredictionService};
use smegrowth_core::config::Settings;
use smegrowth_core::dashboard::{DashboardView, RefreshOutcome};
use smegrowth_core::form::{build_request, RawForm};
use smegrowth_core::report::{DirectorySink, ReportExporter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Parser)]
#[command(name = "smegrowth", about = "SME growth prediction client")]
struct Args {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the business metrics the prediction form expects.
    Fields,

    /// Validate a form, submit it and show the prediction.
    Predict {
        /// Field value as KEY=VALUE. KEY is the stable key or the business label.
        #[arg(long = "field", short = 'f', value_parser = parse_key_value)]
        fields: Vec<(String, String)>,

        /// Small, Medium or Large.
        #[arg(long)]
        size: String,
    },

    /// Load statistics and recent history.
    Dashboard {
        /// History page size. Defaults to HISTORY_LIMIT.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one stored prediction.
    Record { id: i64 },

    /// Download the PDF report for a stored prediction.
    Report {
        id: i64,

        /// Destination directory. Defaults to REPORT_DIR.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Check that the service is up.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    result
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let json = args.json;

    match args.command {
        Command::Fields => render::fields(json),
        Command::Predict { fields, size } => {
            let mut raw = RawForm::new();
            for (key, value) in fields {
                raw.set_labeled(&key, value)?;
            }

            let request = match build_request(&raw, &size) {
                Ok(request) => request,
                Err(errors) => {
                    render::validation_errors(&errors);
                    anyhow::bail!("form has {} invalid field(s); nothing was sent", errors.len());
                }
            };

            let client = ApiClient::from_settings(settings)?;
            let t0 = std::time::Instant::now();
            let response = client.submit(&request).await?;
            tracing::info!(
                prediction = %response.prediction,
                elapsed_ms = t0.elapsed().as_millis(),
                "prediction received"
            );
            render::prediction(&response, json)
        }
        Command::Dashboard { limit } => {
            let limit = match limit {
                Some(limit) => smegrowth_core::config::validate_history_limit(limit)?,
                None => settings.history_limit,
            };
            let client = ApiClient::from_settings(settings)?;
            let mut view = DashboardView::new(limit);

            match view.refresh(&client).await {
                RefreshOutcome::Applied => {}
                RefreshOutcome::Failed(err) => {
                    return Err(err).context("could not load dashboard");
                }
                RefreshOutcome::Stale => anyhow::bail!("dashboard load was superseded"),
            }

            let snapshot = view
                .snapshot()
                .context("dashboard refreshed without a snapshot")?;
            render::dashboard(snapshot, json)
        }
        Command::Record { id } => {
            let client = ApiClient::from_settings(settings)?;
            let record = client
                .fetch_record(id)
                .await?
                .with_context(|| format!("prediction {id} not found"))?;
            render::record(&record, json)
        }
        Command::Report { id, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| settings.report_dir.clone());
            let client = ApiClient::from_settings(settings)?;
            let exporter = ReportExporter::new(client, DirectorySink::new(out_dir));

            let exported = exporter.export(id).await?;
            render::exported(&exported, json)
        }
        Command::Health => {
            let client = ApiClient::from_settings(settings)?;
            let health = client
                .health()
                .await
                .with_context(|| format!("service at {} is not healthy", client.base_url()))?;
            render::health(&health, json)
        }
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}
