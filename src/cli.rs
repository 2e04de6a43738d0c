/*!
nicefigs command line interface

Renders figure config documents to PNG, SVG and PDF files.
*/

use anyhow::Context;
use clap::{Parser, Subcommand};
use nicefigs::config::{apply_overrides, load_config, ConfigSource};
use nicefigs::{render_spec, ExportBase, RenderOptions, VERSION};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nicefigs")]
#[command(about = "Declarative, schema-validated multi-panel figures")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a figure config to its export files
    Render {
        /// Path to the YAML or JSON config document
        config: PathBuf,

        /// Output path, resolved against the current directory; the suffix is
        /// replaced per export format
        #[arg(long)]
        out: Option<PathBuf>,

        /// Override a config value, e.g. `export.dpi=600` or `panels.0.axes.title=Run`
        #[arg(long = "override", value_name = "KEY.PATH=VALUE")]
        overrides: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            config,
            out,
            overrides,
        } => {
            let spec = load_config(ConfigSource::Path(config.clone()))
                .with_context(|| format!("Failed to load {}", config.display()))?;
            let mut spec = apply_overrides(&spec, &overrides)?;

            let export_base = match out {
                Some(out) => {
                    spec.export.path = out.to_string_lossy().into_owned();
                    ExportBase::Cwd
                }
                None => ExportBase::Spec,
            };

            let written = render_spec(
                &spec,
                RenderOptions {
                    export_base,
                    external_data: None,
                },
            )?;
            for path in written {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
