//! Query pipeline
//!
//! One invocation runs exactly one [`QueryMode`]:
//!
//! - **Keyword**: pull search results one at a time up to the limit, pausing
//!   between pulls. An API error mid-stream keeps what was already collected.
//! - **Direct IP**: one host lookup; a failure yields an empty batch.
//! - **URL**: resolve the URL's host, then behave like direct IP. A
//!   resolution failure yields an empty batch without any API call.
//!
//! Errors never escape [`Pipeline::run`]; they are reported through the
//! caller's [`Reporter`] and the batch is whatever could be collected.

use crate::console::Reporter;
use crate::error::Error;
use crate::normalize::normalize;
use crate::shodan::{HostIntel, SearchCursor};
use crate::targets::{resolve_url, Resolver, SystemResolver};
use crate::types::{RawRecord, Record, RecordBatch};
use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::sleep;

/// Default maximum number of search results per run
pub const DEFAULT_LIMIT: usize = 50;

/// Default pause between two search pulls
pub const DEFAULT_THROTTLE_MS: u64 = 200;

/// Which input drives the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// Shodan search query
    Keyword(String),
    /// Single IP lookup
    DirectIp(String),
    /// URL whose host is resolved, then looked up
    Url(String),
}

/// Tunables for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub limit: usize,
    pub throttle: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
        }
    }
}

/// Source of record timestamps that never goes backwards
///
/// A wall clock step backwards during a run repeats the previous stamp.
pub struct Clock {
    source: Box<dyn FnMut() -> DateTime<Utc> + Send>,
    last: Option<DateTime<Utc>>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::with_source(Utc::now)
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock").field("last", &self.last).finish()
    }
}

impl Clock {
    pub fn with_source(source: impl FnMut() -> DateTime<Utc> + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            last: None,
        }
    }

    pub fn stamp(&mut self) -> DateTime<Utc> {
        let now = (self.source)();
        let stamp = match self.last {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}

/// Drives one query from input to a [`RecordBatch`]
#[derive(Debug)]
pub struct Pipeline<C, R = SystemResolver> {
    client: C,
    resolver: R,
    options: PipelineOptions,
    clock: Clock,
}

impl<C: HostIntel> Pipeline<C, SystemResolver> {
    /// Pipeline using the system resolver
    pub fn new(client: C, options: PipelineOptions) -> Self {
        Self::with_resolver(client, SystemResolver, options)
    }
}

impl<C: HostIntel, R: Resolver> Pipeline<C, R> {
    pub fn with_resolver(client: C, resolver: R, options: PipelineOptions) -> Self {
        Self {
            client,
            resolver,
            options,
            clock: Clock::default(),
        }
    }

    /// Replaces the timestamp source
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Runs `mode` and returns the collected records
    pub async fn run(&mut self, mode: &QueryMode, reporter: &mut dyn Reporter) -> RecordBatch {
        match mode {
            QueryMode::Keyword(query) => self.search(query, reporter).await,
            QueryMode::DirectIp(ip) => self.lookup(ip, reporter).await,
            QueryMode::Url(url) => self.lookup_url(url, reporter).await,
        }
    }

    /// Keyword mode
    pub async fn search(&mut self, query: &str, reporter: &mut dyn Reporter) -> RecordBatch {
        reporter.info(&format!("Searching for: {}", query));

        let limit = self.options.limit;
        let mut batch = RecordBatch::with_capacity(limit.min(DEFAULT_LIMIT));
        if limit == 0 {
            return batch;
        }

        let mut cursor = self.client.search(query);
        while let Some(item) = cursor.next().await {
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(error = %e, collected = batch.len(), "search stopped early");
                    report_error(reporter, &e);
                    break;
                }
            };

            batch.push(self.record(&raw, false));
            tracing::debug!(pulled = batch.len(), limit, "search result");

            if batch.len() >= limit {
                break;
            }
            if !self.options.throttle.is_zero() {
                sleep(self.options.throttle).await;
            }
        }

        batch
    }

    /// Direct-IP mode
    pub async fn lookup(&mut self, ip: &str, reporter: &mut dyn Reporter) -> RecordBatch {
        let ip = ip.trim();
        reporter.info(&format!("Looking up IP: {}", ip));

        if let Err(e) = ip.parse::<IpAddr>() {
            reporter.error(&format!("Invalid IP address {}: {}", ip, e));
            return RecordBatch::new();
        }

        match self.client.lookup(ip).await {
            Ok(raw) => vec![self.record(&raw, true)],
            Err(e) => {
                tracing::warn!(ip, error = %e, "host lookup failed");
                report_error(reporter, &e);
                RecordBatch::new()
            }
        }
    }

    /// URL mode
    pub async fn lookup_url(&mut self, url: &str, reporter: &mut dyn Reporter) -> RecordBatch {
        match resolve_url(&self.resolver, url).await {
            Ok((host, ip)) => {
                reporter.success(&format!("Resolved {} to {}", host, ip));
                self.lookup(&ip.to_string(), reporter).await
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "resolution failed");
                reporter.error(&e.to_string());
                RecordBatch::new()
            }
        }
    }

    fn record(&mut self, raw: &RawRecord, raw_string_fallback: bool) -> Record {
        normalize(raw, self.clock.stamp(), raw_string_fallback)
    }
}

fn report_error(reporter: &mut dyn Reporter, err: &Error) {
    match err {
        Error::RemoteService(message) => reporter.error(&format!("API Error: {}", message)),
        other => reporter.error(&format!("Error: {}", other)),
    }
}
