//! Command implementations for the SnowFinder CLI.
//!
//! Provides the HTTP server plus one-shot subcommands that run the same
//! ranking and lookup operations against a local database.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use snowfinder_db::Database;

pub mod query;
pub mod serve;

/// Where the snowfall data lives.
#[derive(Args, Debug, Clone, Default)]
pub struct StorageArgs {
    /// SQLite database file (in-memory when omitted)
    #[arg(long, env = "SNOWFINDER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory of seed CSVs (resorts.csv, courses.csv, peaks.csv, snowfall.csv)
    #[arg(long, env = "SNOWFINDER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl StorageArgs {
    /// Open the database and load any seed CSVs into it.
    pub fn open(&self) -> anyhow::Result<Database> {
        let db = match &self.database {
            Some(path) => Database::open(path)?,
            None => Database::new()?,
        };
        if let Some(dir) = &self.data_dir {
            log::info!("[snowfinder] seeding from {}", dir.display());
            db.load_dir(dir)?;
        }
        if let Some((first, last)) = db.observation_date_range()? {
            log::info!("[snowfinder] observations span {} to {}", first, last);
        } else {
            log::warn!("[snowfinder] database has no snowfall observations");
        }
        Ok(db)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on; the PORT environment variable overrides the port
        #[arg(long, env = "SNOWFINDER_LISTEN", default_value = serve::DEFAULT_LISTEN)]
        listen: String,

        #[command(flatten)]
        storage: StorageArgs,

        /// Directory holding templates/index.html and static/
        #[arg(long, env = "SNOWFINDER_ASSETS_DIR", default_value = "web")]
        assets_dir: PathBuf,

        /// Bounded wait for ranking and listing queries, in seconds
        #[arg(long, default_value_t = 10)]
        query_timeout_secs: u64,

        /// Bounded wait for a single resort's peak lookup, in seconds
        #[arg(long, default_value_t = 30)]
        lookup_timeout_secs: u64,
    },

    /// Rank resorts by average snowfall in a calendar window
    Search {
        /// Window start, MM-DD
        #[arg(short = 's', long)]
        start: String,

        /// Window end, MM-DD (defaults to the start day)
        #[arg(short = 'e', long)]
        end: Option<String>,

        /// Only resorts in this prefecture ("all" for every one)
        #[arg(short = 'p', long)]
        prefecture: Option<String>,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Print peak snowfall periods as JSON
    Peaks {
        /// Resort id ("all" or omitted lists every resort)
        #[arg(short = 'r', long)]
        resort_id: Option<String>,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// List resort ids and names
    Resorts {
        #[command(flatten)]
        storage: StorageArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve {
            listen,
            storage,
            assets_dir,
            query_timeout_secs,
            lookup_timeout_secs,
        } => {
            let options = serve::ServeOptions {
                listen,
                storage,
                assets_dir,
                query_timeout_secs,
                lookup_timeout_secs,
            };
            serve::run_serve(options).await
        }
        Command::Search {
            start,
            end,
            prefecture,
            limit,
            json,
            storage,
        } => {
            let params = query::SearchArgs {
                start,
                end,
                prefecture,
                limit,
            };
            query::run_search(&storage, &params, json).await
        }
        Command::Peaks { resort_id, storage } => {
            query::run_peaks(&storage, resort_id.as_deref()).await
        }
        Command::Resorts { storage } => query::run_resorts(&storage).await,
    }
}
