//! stocktake server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the JSON API over HTTP. The `remind` and `report`
//! subcommands run one notification pass and exit, for use from cron:
//!
//! ```text
//! 0 18 * * 1  server remind
//! 0 8  * * 2  server report --skip-empty
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use stocktake_api::{
  ApiState,
  dispatch::{remind_pending, send_report},
};
use stocktake_core::WeekKey;
use stocktake_server::{LogNotifier, ServerConfig, expand_tilde, seed::seed_sample_data};
use stocktake_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Weekly stock count server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Remind stores that have not submitted this week, then exit.
  Remind,
  /// Send the pilferage report, then exit.
  Report {
    /// Any date in the week to report on (default: current week).
    #[arg(long)]
    week:       Option<WeekKey>,
    /// Do not send a report for a week without submissions.
    #[arg(long)]
    skip_empty: bool,
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
    .add_source(config::Environment::with_prefix("STOCKTAKE").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if server_cfg.seed_sample_data {
    seed_sample_data(&store)
      .await
      .context("failed to seed sample data")?;
  }

  let notifier = LogNotifier;
  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store.clone(), notifier, &server_cfg).await?,
    Command::Remind => {
      let outcome = remind_pending(&store, &notifier, WeekKey::current(), &server_cfg.app_url)
        .await
        .context("reminder pass failed")?;
      tracing::info!(?outcome, "reminders done");
    }
    Command::Report { week, skip_empty } => {
      let week = week.unwrap_or_else(WeekKey::current);
      let outcome = send_report(&store, &notifier, week, skip_empty)
        .await
        .context("report pass failed")?;
      tracing::info!(?outcome, "report done");
    }
  }

  store.close().await.context("failed to close store")?;
  Ok(())
}

async fn serve(
  store: SqliteStore,
  notifier: LogNotifier,
  cfg: &ServerConfig,
) -> anyhow::Result<()> {
  let state = ApiState::new(Arc::new(store), Arc::new(notifier), cfg.app_url.as_str());
  let app = stocktake_server::router(state);
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c().await.ok();
      tracing::info!("shutting down");
    })
    .await
    .context("server error")?;

  Ok(())
}
