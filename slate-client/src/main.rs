//! Slate client — entry point.
//!
//! ```text
//! slate-client                   Mirror the configured host
//! slate-client --host <addr>     Override the host address
//! slate-client --config <path>   Load a custom config TOML
//! slate-client --gen-config      Write default config to stdout
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use slate_client::config::ClientConfig;
use slate_client::session::Session;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "slate-client", about = "Slate shared whiteboard client")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "slate-client.toml")]
    config: PathBuf,

    /// Host address, overriding the config file.
    #[arg(long)]
    host: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ClientConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ClientConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.network.host_address = host;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("slate-client v{}", env!("CARGO_PKG_VERSION"));

    let session = match Session::connect(&config).await {
        Ok(session) => session,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };
    println!("connected to {}", session.host_addr());

    let end = session.mirror().await;
    if end.summary.is_clean() {
        println!("host closed the session ({} commands)", end.summary.applied);
    } else {
        println!(
            "connection lost after {} commands: {}",
            end.summary.applied, end.summary.reason
        );
    }
    println!("canvas fingerprint: {}", end.raster.fingerprint());

    Ok(())
}
