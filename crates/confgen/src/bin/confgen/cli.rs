//! confgen cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; confgen ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate swift files for every .config file in a directory
    ///
    /// Files are only written when their content changes.
    #[command(alias = "gen")]
    Generate(GenerateCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct GenerateCommand {
    /// Directory containing .config files
    #[clap(long = "config-path", alias = "configPath")]
    pub config_path: PathBuf,

    #[clap(flatten)]
    pub scheme: SchemeArgs,

    /// Extra extension inserted before .swift, e.g. `generated` for App.generated.swift
    #[clap(long = "ext")]
    pub additional_extension: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SchemeArgs {
    /// Scheme selecting overrides, e.g. `prod`
    #[clap(short = 's', long = "scheme")]
    pub scheme: String,
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Print the resolved properties of a single file
    Resolved(ResolvedCommand),
    /// Print the swift source of a single file without writing it
    Render(RenderCommand),
}

#[derive(Parser, Debug)]
pub struct ResolvedCommand {
    /// The .config file to resolve
    #[clap(short = 'f', long = "config-file")]
    pub file: PathBuf,

    #[clap(flatten)]
    pub scheme: SchemeArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct RenderCommand {
    /// The .config file to render
    #[clap(short = 'f', long = "config-file")]
    pub file: PathBuf,

    #[clap(flatten)]
    pub scheme: SchemeArgs,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
