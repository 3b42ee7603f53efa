use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::DesignConfig;
use crate::helper_functions::write_csv;
use crate::library::{design_library, LibraryInputs};
use crate::output::{to_dataframe, OutputLayout};
use crate::scores::attach_scores;
use crate::screen::{design_screen, ScreenInputs};

mod config;
mod data_handling;
mod errors;
mod helper_functions;
mod library;
mod models;
mod output;
mod scores;
mod screen;
mod selection;

#[derive(Parser)]
#[command(name = "library_designer", version, about = "Design CRISPR guide libraries and screens")]
struct Cli {
    /// JSON file overriding any of the default constants
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log diagnostic counts for every stage
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Best guides per gene from Guidescan candidates, plus controls
    DesignLibrary {
        guidescan_csv: PathBuf,
        safe_targeting_csv: PathBuf,
        non_targeting_txt: PathBuf,
        #[arg(short, long, default_value = "out.csv")]
        outfile: PathBuf,
        #[arg(short = 'k', long)]
        guides_per_gene: Option<usize>,
    },
    /// Essential, non-essential and control guides drawn across libraries
    DesignScreen {
        library_csv: PathBuf,
        state_of_the_art_csv: PathBuf,
        gene_expression_csv: PathBuf,
        essential_genes_txt: PathBuf,
        non_essential_genes_csv: PathBuf,
        #[arg(short, long, default_value = "out.csv")]
        outfile: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Left-join two headerless `id,specificity` files onto a guide table
    AttachScores {
        scores1: PathBuf,
        scores2: PathBuf,
        input: PathBuf,
        #[arg(short, long, default_value = "out.csv")]
        outfile: PathBuf,
    },
}

fn write_output(df: &mut polars::prelude::DataFrame, outfile: &Path) -> anyhow::Result<()> {
    write_csv(df, outfile).with_context(|| format!("writing {}", outfile.display()))?;
    info!("Wrote {} rows to {}", df.height(), outfile.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DesignConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::DesignLibrary {
            guidescan_csv,
            safe_targeting_csv,
            non_targeting_txt,
            outfile,
            guides_per_gene,
        } => {
            if let Some(k) = guides_per_gene {
                config.library.guides_per_gene = k;
            }
            let inputs = LibraryInputs {
                guidescan_csv,
                safe_targeting_csv,
                non_targeting_txt,
            };
            let library = design_library(&inputs, &config.library, cli.verbose)
                .with_context(|| format!("designing library from {}", inputs.guidescan_csv.display()))?;
            let mut df = to_dataframe(&library, OutputLayout::Library)?;
            write_output(&mut df, &outfile)?;
        }
        Command::DesignScreen {
            library_csv,
            state_of_the_art_csv,
            gene_expression_csv,
            essential_genes_txt,
            non_essential_genes_csv,
            outfile,
            seed,
        } => {
            if let Some(seed) = seed {
                config.screen.seed = seed;
            }
            let inputs = ScreenInputs {
                library_csv,
                state_of_the_art_csv,
                gene_expression_csv,
                essential_genes_txt,
                non_essential_genes_csv,
            };
            let screen = design_screen(&inputs, &config.screen, cli.verbose)
                .with_context(|| format!("designing screen from {}", inputs.library_csv.display()))?;
            let mut df = to_dataframe(&screen, OutputLayout::Screen)?;
            write_output(&mut df, &outfile)?;
        }
        Command::AttachScores {
            scores1,
            scores2,
            input,
            outfile,
        } => {
            let mut df = attach_scores(&scores1, &scores2, &input)
                .with_context(|| format!("attaching scores to {}", input.display()))?;
            write_output(&mut df, &outfile)?;
        }
    }

    Ok(())
}
