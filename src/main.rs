//! groovebox-router - interactive front end
//!
//! Feeds raw surface messages typed as hex through the router, logs the
//! resulting engine calls and keeps the session in sync with the config file.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use crate::cli::{Repl, ReplAction};
use groovebox_router::config::{AppConfig, ConfigWatcher};

/// Groovebox router - translate control-surface MIDI into groovebox commands
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "GROOVEBOX_CONFIG", default_value = "groovebox.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Start with the pad echo self-test enabled
    #[arg(long)]
    echo: bool,

    /// Print routing results as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting groovebox-router v{}...", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    // Hot reload only makes sense for a file that exists
    let (config_watcher, config) = if Path::new(&args.config).exists() {
        let (watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
        info!("Configuration loaded successfully with hot-reload enabled");
        (Some(watcher), (*config).clone())
    } else {
        warn!("Config file {} not found, using defaults", args.config);
        (None, AppConfig::default())
    };

    let mut repl = Repl::new(config.to_state(), args.json);
    if args.echo {
        repl = repl.with_forced_echo();
    }

    run_app(repl, config_watcher, shutdown_signal()).await?;

    info!("groovebox-router shutdown complete");
    Ok(())
}

async fn run_app(
    mut repl: Repl,
    mut config_watcher: Option<ConfigWatcher>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let mut lines = cli::spawn_line_reader("groovebox> ")?;
    info!("Ready: type hex bytes (e.g. 90 3C 64) or 'help'");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("Input closed, stopping");
                    break;
                };
                match repl.handle_line(&line) {
                    Ok(ReplAction::Continue) => {}
                    Ok(ReplAction::Quit) => break,
                    Err(e) => warn!("{:#}", e),
                }
            }

            Some(new_config) = next_config(&mut config_watcher) => {
                info!("📝 Configuration file changed, reloading...");
                repl.reload(&new_config);
                info!("✅ Configuration applied ({} tracks)", repl.state().tracks.len());
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    Ok(())
}

/// Next reloaded config, or never when hot reload is off
async fn next_config(watcher: &mut Option<ConfigWatcher>) -> Option<AppConfig> {
    match watcher {
        Some(watcher) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
