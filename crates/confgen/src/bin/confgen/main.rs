mod cli;

use anyhow::Context;
use confgen::change::ChangeStatus;
use confgen::sources::{ConfigSource, ConfigSources};
use confgen::template::TemplateRegistry;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CONFGEN_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Generate(generate_cli) => generate(generate_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

/// Generates every document in the config directory
///
/// Stops at the first document that fails, files generated before it stay written.
pub fn generate(cli: cli::GenerateCommand) -> anyhow::Result<()> {
    let registry = TemplateRegistry::default();

    let mut sources = ConfigSources::default();
    sources.load_directory(&cli.config_path)?;

    for source in sources {
        let file_name = source
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let generation = registry
            .generate(&source.config, &source.name, &cli.scheme.scheme)
            .with_context(|| format!("Failed to generate {}", source.path.display()))?;
        for event in &generation.events {
            tracing::debug!(file = %file_name, "{event}");
        }

        let output_path = source.output_path(
            generation.filename.as_deref(),
            cli.additional_extension.as_deref(),
        );
        let existing = std::fs::read_to_string(&output_path).ok();

        match ChangeStatus::detect(&generation.text, existing.as_deref()) {
            ChangeStatus::Unchanged => {
                tracing::info!(file = %file_name, "Ignoring, it has not changed");
                continue;
            }
            ChangeStatus::Missing => {
                tracing::info!(file = %file_name, "Existing file not present, writing")
            }
            ChangeStatus::Changed => {
                tracing::info!(file = %file_name, "Existing file different from new file, writing")
            }
        }

        std::fs::write(&output_path, &generation.text)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        tracing::info!(file = %file_name, output = %output_path.display(), "Wrote");
    }

    Ok(())
}

fn load(file: &std::path::Path) -> anyhow::Result<ConfigSource> {
    let mut sources = ConfigSources::default();
    sources.load_file(file)?;
    sources
        .into_iter()
        .next()
        .context("No file loaded")
}

/// (confgen-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Resolved(resolved) => {
            let source = load(&resolved.file)?;
            let file = confgen::configuration_file::ConfigurationFile::new(
                &source.config,
                &source.name,
                &resolved.scheme.scheme,
            )?;

            match resolved.output.format {
                cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), file.file().root())?,
                cli::OutputFormat::Json => {
                    serde_json::to_writer_pretty(std::io::stdout(), file.file().root())?
                }
            };
        }
        Render(render) => {
            let source = load(&render.file)?;
            let generation = TemplateRegistry::default().generate(
                &source.config,
                &source.name,
                &render.scheme.scheme,
            )?;
            print!("{}", generation.text);
        }
    }

    Ok(())
}
