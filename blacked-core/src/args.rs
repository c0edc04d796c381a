//! CLI argument parsing and validation
//!
//! # Examples
//!
//! ```
//! use blacked_core::args::BlackedArgs;
//! use blacked_core::pipeline::QueryMode;
//!
//! let args = BlackedArgs::from_iter_safe(["blacked", "--ip", "8.8.8.8", "--csv"]).unwrap();
//! assert_eq!(args.mode().unwrap(), QueryMode::DirectIp("8.8.8.8".to_string()));
//! assert!(args.csv);
//! ```

use crate::credentials::DEFAULT_KEY_FILE;
use crate::error::{Error, Result};
use crate::output::csv::DEFAULT_CSV_PATH;
use crate::output::json::DEFAULT_JSON_PATH;
use crate::output::ExportOptions;
use crate::pipeline::{PipelineOptions, QueryMode, DEFAULT_LIMIT, DEFAULT_THROTTLE_MS};
use clap::{ArgGroup, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Message shown when no query mode was given
pub const MISSING_MODE: &str = "Please provide --query, --ip or --url";

/// Shodan host lookup and search from the command line
#[derive(Debug, Clone, Parser)]
#[command(name = "blacked", version, about)]
#[command(group(ArgGroup::new("mode").args(["query", "ip", "url"]).multiple(false)))]
pub struct BlackedArgs {
    /// Search Shodan with a keyword query
    #[arg(long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Look up a specific IP address
    #[arg(long, value_name = "ADDR")]
    pub ip: Option<String>,

    /// Resolve a website URL and look up its IP
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Maximum number of search results
    #[arg(long, value_name = "N", default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Also save results as CSV
    #[arg(long)]
    pub csv: bool,

    /// API key to use instead of the key file (not persisted)
    #[arg(long, env = "SHODAN_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Credential file holding {"api_key": "..."}
    #[arg(long, value_name = "FILE", default_value = DEFAULT_KEY_FILE)]
    pub key_file: PathBuf,

    /// JSON export path
    #[arg(long, value_name = "FILE", default_value = DEFAULT_JSON_PATH)]
    pub json_out: PathBuf,

    /// CSV export path, used with --csv
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CSV_PATH)]
    pub csv_out: PathBuf,

    /// Pause between search results in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_THROTTLE_MS)]
    pub delay_ms: u64,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl BlackedArgs {
    /// Parses arguments without exiting the process on error
    pub fn from_iter_safe<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Selected query mode
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] when none of `--query`, `--ip`, `--url` has a
    /// non-blank value.
    pub fn mode(&self) -> Result<QueryMode> {
        let given = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

        if let Some(query) = given(&self.query) {
            Ok(QueryMode::Keyword(query))
        } else if let Some(ip) = given(&self.ip) {
            Ok(QueryMode::DirectIp(ip))
        } else if let Some(url) = given(&self.url) {
            Ok(QueryMode::Url(url))
        } else {
            Err(Error::Usage(MISSING_MODE.to_string()))
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            limit: self.limit,
            throttle: Duration::from_millis(self.delay_ms),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            json_path: self.json_out.clone(),
            csv_path: self.csv.then(|| self.csv_out.clone()),
        }
    }
}
