use crate::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the summary, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let template = commands::load_template(cli.template.as_deref())?;

    match cli.command {
        Commands::Build(args) => commands::build::run(template, args)?,
        Commands::Template => commands::template::run(&template)?,
    }

    Ok(())
}
