//! grievance server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! complaint store, and serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```
//! cargo run -p grievance-server --bin server -- --hash-password
//! ```
//!
//! # One-off sweep
//!
//! `--check-escalations` runs a single auto-escalation sweep against the
//! configured store, prints the number escalated, and exits. Suitable for
//! cron when `sweep_interval_secs` is unset.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use grievance_server::{AppState, ServerConfig, auth::hash_password, scheduler::spawn_sweeper};
use grievance_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Complaint tracking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Run one auto-escalation sweep and exit.
  #[arg(long)]
  check_escalations: bool,
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

  if cli.hash_password {
    let password = read_password()?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("GRIEVANCE"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.upload_dir = expand_tilde(&server_cfg.upload_dir);

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  let state = AppState::new(Arc::new(store), server_cfg.clone());

  if cli.check_escalations {
    let n = state
      .tracker
      .check_auto_escalations()
      .await
      .context("escalation sweep failed")?;
    println!("Auto-escalation check completed. {n} complaints escalated.");
    return Ok(());
  }

  if let Some(secs) = server_cfg.sweep_interval_secs.filter(|s| *s > 0) {
    tracing::info!(every_secs = secs, "background escalation sweep enabled");
    spawn_sweeper(state.tracker.clone(), Duration::from_secs(secs));
  }

  let app = grievance_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  match path.strip_prefix("~") {
    Ok(rest) => std::env::var_os("HOME")
      .map(|home| PathBuf::from(home).join(rest))
      .unwrap_or_else(|| path.to_path_buf()),
    Err(_) => path.to_path_buf(),
  }
}
