//! scoretab CLI: converts MusicXML scores into LilyPond guitar tab.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use scoretab::tuning::{CUSTOM_TUNING_LEN, NAMED_TUNINGS};
use scoretab::{convert_with, parse_file, score_to_json, ConvertOptions, Interval, RendererConfig};

/// Turn sheet music into fretted-instrument tablature
#[derive(Parser, Debug)]
#[command(name = "scoretab")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a MusicXML (.musicxml, .xml, .mxl) file to LilyPond tab
    Convert {
        /// Input score
        file: PathBuf,

        /// Named tuning (see `scoretab tunings`) or six pitch letters, e.g. "dadgad"
        #[arg(short, long, default_value = "standard")]
        tuning: String,

        /// Keep pitches as written instead of transposing
        #[arg(long)]
        no_transpose: bool,

        /// Transposition interval, e.g. P8, -M2, m3
        #[arg(long, default_value = "P8")]
        interval: Interval,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Only write the .ly file; do not run LilyPond
        #[arg(long)]
        no_render: bool,

        /// LilyPond executable
        #[arg(long, env = "SCORETAB_LILYPOND", default_value = "lilypond")]
        lilypond: PathBuf,

        /// Seconds to wait for LilyPond before giving up
        #[arg(long, default_value_t = 120)]
        timeout: u64,
    },

    /// List the built-in tunings
    Tunings,

    /// Print a parsed score as JSON
    Inspect {
        /// Input score
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> scoretab::Result<()> {
    match command {
        Commands::Convert {
            file,
            tuning,
            no_transpose,
            interval,
            output_dir,
            no_render,
            lilypond,
            timeout,
        } => {
            let options = ConvertOptions {
                transpose: !no_transpose,
                interval,
                output_dir,
                render: !no_render,
                renderer: RendererConfig {
                    program: lilypond,
                    timeout: Duration::from_secs(timeout),
                },
                ..ConvertOptions::new(tuning)
            };
            let output = convert_with(&file, &options)?;
            println!("{}", output.display());
        }
        Commands::Tunings => {
            for (name, descriptor) in NAMED_TUNINGS {
                println!("{name:<22}{descriptor}");
            }
            println!(
                "{:<22}any {CUSTOM_TUNING_LEN} pitch letters, e.g. \"dgdgbd\"",
                "(custom)"
            );
        }
        Commands::Inspect { file } => {
            let score = parse_file(&file)?;
            println!("{}", score_to_json(&score)?);
        }
    }
    Ok(())
}
