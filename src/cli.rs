use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::download::{DEFAULT_DATASET_URL, DEFAULT_SNAPSHOT_FILE};
use crate::writer::DEFAULT_DB_FILE;

#[derive(Parser, Debug)]
#[command(name = "meteorite-regions")]
#[command(version, about = "Load NASA meteorite landings into SQLite, split by continental region")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the dataset and rebuild the master and region tables
    Sync {
        /// Dataset URL
        #[arg(short, long, env = "METEORITE_URL", default_value = DEFAULT_DATASET_URL)]
        url: String,

        /// Output SQLite database path
        #[arg(short, long, env = "METEORITE_DB", default_value = DEFAULT_DB_FILE)]
        db: PathBuf,

        /// Only refresh these regions (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Skip these regions (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Show a terminal dashboard instead of status lines
        #[arg(long)]
        tui: bool,
    },

    /// Fetch the dataset and save it as a local JSON file
    Download {
        /// Dataset URL
        #[arg(short, long, env = "METEORITE_URL", default_value = DEFAULT_DATASET_URL)]
        url: String,

        /// Output file
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_FILE)]
        output: PathBuf,
    },

    /// Rebuild the tables from a local JSON file
    Load {
        /// JSON file holding an array of records
        input: PathBuf,

        /// Output SQLite database path
        #[arg(short, long, env = "METEORITE_DB", default_value = DEFAULT_DB_FILE)]
        db: PathBuf,

        /// Only refresh these regions (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Skip these regions (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// List all regions and their bounding boxes
    ListRegions,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_defaults() {
        let cli = Cli::try_parse_from(["meteorite-regions", "sync"]).unwrap();
        match cli.command {
            Commands::Sync { url, db, include, tui, .. } => {
                if std::env::var_os("METEORITE_URL").is_none() {
                    assert_eq!(url, DEFAULT_DATASET_URL);
                }
                if std::env::var_os("METEORITE_DB").is_none() {
                    assert_eq!(db, PathBuf::from(DEFAULT_DB_FILE));
                }
                assert!(include.is_none());
                assert!(!tui);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_load_with_region_list() {
        let cli = Cli::try_parse_from([
            "meteorite-regions",
            "load",
            "data.json",
            "--db",
            "out.db",
            "--include",
            "europe,australia",
        ])
        .unwrap();
        match cli.command {
            Commands::Load { input, db, include, .. } => {
                assert_eq!(input, PathBuf::from("data.json"));
                assert_eq!(db, PathBuf::from("out.db"));
                assert_eq!(include, Some(vec!["europe".to_string(), "australia".to_string()]));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
