//! Slate host — entry point.
//!
//! ```text
//! slate-host                     Serve on the configured address
//! slate-host --bind <addr>       Override the bind address
//! slate-host --config <path>     Load a custom config TOML
//! slate-host --gen-config        Write default config to stdout
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slate_host::config::HostConfig;
use slate_host::service::HostService;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "slate-host", about = "Slate shared whiteboard host")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "slate-host.toml")]
    config: PathBuf,

    /// Address to listen on, overriding the config file.
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&HostConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = HostConfig::load(&cli.config);
    if let Some(bind) = cli.bind {
        config.network.bind_address = bind;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("slate-host v{}", env!("CARGO_PKG_VERSION"));
    info!("bind address: {}", config.network.bind_address);
    info!(
        "canvas: {}x{} {}",
        config.canvas.width, config.canvas.height, config.canvas.background
    );
    match config.protocol.max_frame_bytes {
        0 => info!("frame limit: none"),
        n => info!("frame limit: {n} bytes"),
    }

    let service = HostService::new(config);
    let stop = service.stop_handle();

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received, shutting down");
        stop.notify_one();
    });

    println!("type 'help' for commands");
    let canvas = service.run().await?;
    info!("final canvas {}", canvas.fingerprint());

    Ok(())
}
