mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Settings;
use slink::{Error as SlinkError, LinkSubmission, LogMode};
use std::path::Path;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(slink_error) = e.downcast_ref::<SlinkError>() {
            eprintln!("Error: {}", slink_error);
            if let Some(suggestion) = slink_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.clone())?;
    let log_mode = cli.log.unwrap_or(settings.config.log);
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| settings.config.log_file.clone());
    init_tracing(log_mode, &log_file)?;

    match &settings.config_path {
        Some(path) => tracing::debug!("Using configuration {}", path.display()),
        None => tracing::debug!("No configuration file found, using defaults"),
    }

    let out = output::CliOutput;
    match cli.command {
        Commands::Serve {
            host,
            port,
            no_ingest,
        } => commands::run_serve(&settings, host, port, no_ingest, &out).await,
        Commands::Ingest { host, port } => commands::run_ingest(&settings, host, port).await,
        Commands::Add {
            description,
            url,
            type_id,
            icon,
        } => {
            let submission = LinkSubmission {
                description,
                url,
                type_id,
                icon,
            };
            commands::run_add(&settings, submission, &out).await
        }
        Commands::Doctor { quick, test_db } => {
            commands::run_doctor(&settings, quick, test_db, &out).await
        }
    }
}

fn init_tracing(mode: LogMode, log_file: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = if mode.to_file() {
        if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        Some(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false),
        )
    } else {
        None
    };

    let screen_layer = mode
        .to_screen()
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(screen_layer)
        .init();

    Ok(())
}
