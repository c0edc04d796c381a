//! Blacked Core Library
//!
//! Queries the Shodan API by keyword, IP address or URL, normalizes every
//! returned item into a fixed-shape [`types::Record`] and exports the batch
//! as JSON, CSV and a terminal table.
//!
//! # Modules
//!
//! - [`args`] - CLI argument parsing and validation
//! - [`credentials`] - API key file and interactive prompt
//! - [`shodan`] - Shodan REST API client
//! - [`targets`] - URL host extraction and name resolution
//! - [`normalize`] - raw response to record mapping
//! - [`pipeline`] - query orchestration for the three input modes
//! - [`output`] - JSON, CSV and table sinks
//! - [`console`] - user-facing status output
//! - [`types`] - raw and normalized record types
//!
//! # Example
//!
//! ```no_run
//! use blacked_core::console::TerminalReporter;
//! use blacked_core::pipeline::{Pipeline, PipelineOptions, QueryMode};
//! use blacked_core::shodan::ShodanClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ShodanClient::new("MY_KEY")?;
//! let mut pipeline = Pipeline::new(client, PipelineOptions::default());
//! let mut reporter = TerminalReporter::default();
//! let batch = pipeline
//!     .run(&QueryMode::DirectIp("8.8.8.8".into()), &mut reporter)
//!     .await;
//! println!("{} record(s)", batch.len());
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod console;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod shodan;
pub mod targets;
pub mod types;

pub use error::{Error, Result};
