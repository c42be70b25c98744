//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hrqa",
    version,
    author = "neur0map",
    about = "Question answering over uploaded HR handbooks",
    long_about = "hrqa ingests PDF staff handbooks into a hosted vector store and answers \
                  questions about them using hybrid search, LLM reranking and answer synthesis \
                  constrained to the retrieved excerpts."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/hrqa/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ingest a PDF handbook into the vector store
    Ingest {
        /// Path to the PDF file
        file: PathBuf,
    },

    /// Ask a question against the ingested handbook
    Ask {
        /// Question to ask
        question: String,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every stored chunk and recreate an empty collection
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
