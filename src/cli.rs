//! Command-line interface for polyscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "polyscribe",
    version,
    about = "Chunked transcription and translation for large media and text"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (default: ~/.config/polyscribe/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a WAV file into a new document
    Transcribe {
        /// Media file to transcribe
        file: PathBuf,

        /// Source name recorded in the document header (default: file name)
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Clean up a document's primary content
    Reformat {
        /// Stored document filename (see `polyscribe list`)
        document: String,
    },

    /// Translate a document's primary content into its secondary section
    Translate {
        /// Stored document filename (see `polyscribe list`)
        document: String,

        /// Target language (default: from configuration)
        #[arg(long, value_name = "LANGUAGE")]
        language: Option<String>,
    },

    /// List stored documents, newest first
    List,

    /// Print a stored document
    Show {
        /// Stored document filename
        document: String,
    },

    /// Print the active configuration as TOML
    Config,
}
