use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::debug;

use ocr_labeler::cli::args::{Cli, Commands};
use ocr_labeler::cli::commands::{self, Backend};
use ocr_labeler::config::{ColorSetting, Config, Paths};
use ocr_labeler::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    // Completions need neither configuration nor logs.
    if let Commands::Completions { shell, install } = cli.command {
        println!("{}", commands::completions(shell, install)?);
        return Ok(());
    }

    let paths = Paths::default();
    let mut config = match &cli.config {
        Some(path) if !path.exists() => bail!("Config file not found: {}", path.display()),
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_from_path(&paths.config_file)?,
    };
    config.apply_overrides(cli.images.clone(), cli.labels.clone());

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {},
    }

    let log_dir = config.logging.dir.clone().unwrap_or_else(|| paths.logs.clone());
    let _guard = logging::init(&log_dir, &config.logging.level, cli.verbose)
        .context("Failed to set up logging")?;
    debug!(?config, "Loaded configuration");

    let backend = Backend::from_config(&config).with_context(|| {
        format!(
            "Failed to open label store {}",
            config.labels.location().display()
        )
    })?;

    let output = match cli.command {
        Commands::Review => commands::review(&backend, format).await?,
        Commands::Images => commands::images(&backend, format).await?,
        Commands::Next => commands::next(&backend, format).await?,
        Commands::Labels => commands::labels(&backend, format).await?,
        Commands::Extract { image } => commands::extract(&backend, &image, format).await?,
        Commands::Completions { .. } => String::new(),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
