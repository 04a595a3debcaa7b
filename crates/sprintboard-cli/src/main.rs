mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use sprintboard_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("SPRINTBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "sprintboard", &mut std::io::stdout());
        return Ok(());
    }

    if let Err(e) = run(cli).await {
        output::output_error(&e.to_string());
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    if cli.store.is_some() {
        config.endpoint = cli.store;
    }
    if cli.user.is_some() {
        config.user = cli.user;
    }
    if cli.api_key.is_some() {
        config.api_key = cli.api_key;
    }

    let mut ctx = CliContext::connect(config).await?;

    match cli.command {
        Commands::Project(cmd) => handlers::project::handle(&mut ctx, cmd.action).await?,
        Commands::Sprint(cmd) => handlers::sprint::handle(&mut ctx, cmd.action).await?,
        Commands::Column(cmd) => handlers::column::handle(&mut ctx, cmd.action).await?,
        Commands::Task(cmd) => handlers::task::handle(&mut ctx, cmd.action).await?,
        Commands::Backlog(cmd) => handlers::backlog::handle(&mut ctx, cmd.action).await?,
        Commands::Invite(cmd) => handlers::invite::handle(&mut ctx, cmd.action).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
