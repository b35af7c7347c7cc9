//! reach server and import binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and either serves the JSON API or runs an import/
//! export batch from the command line.

mod mailer;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use reach_api::AppState;
use reach_core::{
  import::{ContactRow, TargetRow},
  target::TargetKind,
};
use reach_engine::{DraftWorkflow, Importer, export::export_targets_csv};
use reach_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{mailer::HttpMailer, settings::ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Reach outreach tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Import a targets CSV file.
  ImportTargets {
    file: PathBuf,
    /// Kind for rows without their own `type` column.
    #[arg(long, default_value = "employer")]
    kind: TargetKind,
  },
  /// Import a contacts CSV file.
  ImportContacts { file: PathBuf },
  /// Export all targets (with `last_contacted`) to a CSV file.
  Export {
    #[arg(default_value = "targets_export.csv")]
    output: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("REACH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if !server_cfg.preview_mode && server_cfg.mailer_url.is_none() {
    anyhow::bail!("live mode requires mailer_url in the configuration");
  }

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;
  let store = Arc::new(store);

  match cli.command {
    Command::Serve => serve(store, server_cfg).await,
    Command::ImportTargets { file, kind } => import_targets(store, file, kind).await,
    Command::ImportContacts { file } => import_contacts(store, file).await,
    Command::Export { output } => export(store, output).await,
  }
}

async fn serve(store: Arc<SqliteStore>, cfg: ServerConfig) -> anyhow::Result<()> {
  let mailer = Arc::new(HttpMailer::new(
    cfg.mailer_url.clone(),
    cfg.mailer_token.clone(),
    std::time::Duration::from_secs(cfg.send_timeout_secs),
  )?);

  let state = AppState {
    store:    store.clone(),
    importer: Arc::new(Importer::new(store.clone())),
    workflow: Arc::new(DraftWorkflow::new(store, mailer, cfg.send_config())),
  };

  let app = reach_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!(
    preview = cfg.preview_mode,
    daily_limit = cfg.daily_send_limit,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn import_targets(
  store: Arc<SqliteStore>,
  file: PathBuf,
  kind: TargetKind,
) -> anyhow::Result<()> {
  let mut reader = csv::Reader::from_path(&file)
    .with_context(|| format!("failed to open {file:?}"))?;
  let rows: Vec<TargetRow> = reader
    .deserialize()
    .collect::<Result<_, _>>()
    .context("failed to parse target rows")?;

  let report = Importer::new(store).import_targets(rows, kind).await?;
  print_report(&report);
  Ok(())
}

async fn import_contacts(store: Arc<SqliteStore>, file: PathBuf) -> anyhow::Result<()> {
  let mut reader = csv::Reader::from_path(&file)
    .with_context(|| format!("failed to open {file:?}"))?;
  let rows: Vec<ContactRow> = reader
    .deserialize()
    .collect::<Result<_, _>>()
    .context("failed to parse contact rows")?;

  let report = Importer::new(store).import_contacts(rows).await?;
  print_report(&report);
  Ok(())
}

async fn export(store: Arc<SqliteStore>, output: PathBuf) -> anyhow::Result<()> {
  let file = std::fs::File::create(&output)
    .with_context(|| format!("failed to create {output:?}"))?;
  export_targets_csv(store.as_ref(), file).await?;
  tracing::info!("exported targets to {output:?}");
  Ok(())
}

fn print_report(report: &reach_core::import::ImportReport) {
  println!(
    "inserted: {}  updated: {}  skipped: {}  failed: {}",
    report.inserted, report.updated, report.skipped, report.failed
  );
  for warning in &report.warnings {
    println!("warning: {warning}");
  }
  for error in &report.errors {
    println!("error: {error}");
  }
}
