use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use cardsync_engine::{format_elapsed, Orchestrator, Services, SyncConfig};
use clap::Parser;
use sync_logging::{sync_debug, sync_error, sync_info};

mod cli;
mod logging;
mod settings;

use cli::{Cli, Command};
use settings::Settings;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            sync_error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load(&cli.config)?;
    if cli.token.is_some() {
        settings.token = cli.token.clone();
    }
    logging::initialize(
        cli.log.unwrap_or(settings.log),
        &settings.log_file,
        cli.verbose,
    );

    let config = settings.sync_config();
    sync_debug!("Loaded {:?}: {:?}", cli.config, config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(execute(cli.command, config, settings))
}

async fn execute(command: Command, config: SyncConfig, settings: Settings) -> Result<ExitCode> {
    let services = Services::standard(&config, settings.transport_settings())
        .context("failed to build HTTP client")?;
    let orchestrator = Orchestrator::new(services, config);

    match command {
        Command::Parse(args) => match orchestrator.run(&args.request()).await {
            Ok(_) => Ok(ExitCode::SUCCESS),
            Err(aborted) => {
                sync_error!("{}", aborted);
                Ok(ExitCode::from(2))
            }
        },
        Command::Updates => {
            let started = Instant::now();
            let slugs = orchestrator.updated_titles().await?;
            sync_info!(
                "{} updates collected in {}.",
                slugs.len(),
                format_elapsed(started.elapsed())
            );
            for slug in slugs {
                println!("{slug}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
