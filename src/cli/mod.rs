//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "abr-search",
    version,
    about = "Search the Australian Business Register with keyword and embedding search",
    long_about = "abr-search streams business records out of ABR bulk XML extracts, loads them \
                  into an OpenSearch-compatible engine with sentence embeddings attached, and \
                  runs keyword and k-NN searches side by side."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/abr-search/config.toml)
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
    /// Extract business records from a directory of ABR bulk XML files
    Extract {
        /// Directory tree of .xml files (defaults to data.data_dir from config)
        #[arg(value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Print each record as a JSON line
        #[arg(long)]
        json: bool,

        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Extract, embed, and load records into the search engine
    Index {
        /// Directory tree of .xml files (defaults to data.data_dir from config)
        #[arg(value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Records per bulk request (defaults to embedding.batch_size)
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Search the index
    Search {
        /// Search query text
        query: String,

        /// Search mode
        #[arg(short, long, value_parser = ["keyword", "embedding", "both"], default_value = "both")]
        mode: String,

        /// Number of nearest neighbours for embedding search (defaults to search.k)
        #[arg(short, long)]
        k: Option<usize>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn search_defaults_to_both_modes() {
        let cli = Cli::try_parse_from(["abr-search", "search", "acme plumbing"]).unwrap();
        match cli.command {
            Commands::Search { mode, k, json, .. } => {
                assert_eq!(mode, "both");
                assert_eq!(k, None);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_search_mode() {
        assert!(Cli::try_parse_from(["abr-search", "search", "acme", "--mode", "fuzzy"]).is_err());
    }
}
