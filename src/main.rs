use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use schemkit::{heal, init_logging, summarize, DesignFile, EditorConfig};

#[derive(Parser)]
#[command(name = "schemkit", version, about = "Inspect and repair SchemKit design files")]
struct Cli {
    /// Editor configuration file (.json or .toml); defaults to the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary of a design file
    Info { file: PathBuf },
    /// Merge, split and dot every net, then write the result
    Heal {
        file: PathBuf,
        /// Output file; the input is overwritten when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EditorConfig> {
    let config = match path {
        Some(p) => EditorConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => EditorConfig::load_or_default().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            EditorConfig::default()
        }),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Info { file } => {
            let design = DesignFile::load_from_file(&file)?;
            println!("{}", summarize(&design)?);
        }
        Command::Heal { file, output } => {
            let config = load_config(cli.config.as_ref())?;
            let design = DesignFile::load_from_file(&file)?;
            let (healed, edits) = heal(&design, &config)?;
            let target = output.unwrap_or(file);
            healed.save_to_file(&target)?;
            println!("{} edits, wrote {}", edits, target.display());
        }
    }

    Ok(())
}
