use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    pageturn::logging::init().context("init logging")?;

    let cli = pageturn::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        pageturn::cli::Command::Route(args) => {
            pageturn::route::run(args).context("route")?;
        }
        pageturn::cli::Command::Assets(args) => {
            pageturn::assets::run(args).await.context("assets")?;
        }
        pageturn::cli::Command::Replay(args) => {
            pageturn::replay::run(args).await.context("replay")?;
        }
        pageturn::cli::Command::Progress(args) => {
            pageturn::progress::run(args).context("progress")?;
        }
    }

    Ok(())
}
