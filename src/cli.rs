use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "neurocell",
    version,
    about = "Builds a parameterized multi-compartment neuron model",
    long_about = None
)]
pub struct Cli {
    /// Cell template (JSON). The built-in template is used when omitted.
    #[arg(long, global = true)]
    pub template: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a model from an SWC reconstruction and print a summary
    Build(BuildArgs),
    /// Print the cell template as JSON
    Template,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// SWC file; defaults to the morphology named by the template
    pub morphology: Option<PathBuf>,

    /// Display name; the template's default name is used when omitted
    #[arg(long, conflicts_with = "anonymous")]
    pub name: Option<String>,

    /// Build without a name so the template placeholder is shown
    #[arg(long)]
    pub anonymous: bool,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub z: f64,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}
