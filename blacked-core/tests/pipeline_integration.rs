//! Integration tests for the query pipeline
//!
//! The Shodan client and the resolver are replaced by scripted doubles so
//! every mode can be exercised without network access.

use blacked_core::console::{Level, MemoryReporter};
use blacked_core::error::{Error, Result};
use blacked_core::pipeline::{Pipeline, PipelineOptions, QueryMode};
use blacked_core::shodan::{HostIntel, SearchCursor};
use blacked_core::targets::Resolver;
use blacked_core::types::{AccountInfo, RawRecord};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone)]
enum Step {
    Item(RawRecord),
    Fail(&'static str),
}

#[derive(Default)]
struct ScriptedShodan {
    search_steps: Vec<Step>,
    hosts: HashMap<String, RawRecord>,
    pulls: Rc<Cell<usize>>,
    lookups: Rc<RefCell<Vec<String>>>,
}

struct ScriptedCursor {
    steps: VecDeque<Step>,
    pulls: Rc<Cell<usize>>,
    failed: bool,
}

impl SearchCursor for ScriptedCursor {
    async fn next(&mut self) -> Option<Result<RawRecord>> {
        if self.failed {
            return None;
        }
        let step = self.steps.pop_front()?;
        self.pulls.set(self.pulls.get() + 1);
        match step {
            Step::Item(raw) => Some(Ok(raw)),
            Step::Fail(msg) => {
                self.failed = true;
                Some(Err(Error::RemoteService(msg.to_string())))
            }
        }
    }
}

impl HostIntel for ScriptedShodan {
    type Cursor = ScriptedCursor;

    async fn check_account(&self) -> Result<AccountInfo> {
        Ok(AccountInfo::default())
    }

    fn search(&self, _query: &str) -> ScriptedCursor {
        ScriptedCursor {
            steps: self.search_steps.iter().cloned().collect(),
            pulls: Rc::clone(&self.pulls),
            failed: false,
        }
    }

    async fn lookup(&self, ip: &str) -> Result<RawRecord> {
        self.lookups.borrow_mut().push(ip.to_string());
        self.hosts
            .get(ip)
            .cloned()
            .ok_or_else(|| Error::RemoteService("No information available for that IP.".to_string()))
    }
}

struct StaticResolver(HashMap<&'static str, IpAddr>);

impl Resolver for StaticResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr> {
        self.0
            .get(host)
            .copied()
            .ok_or_else(|| Error::resolution(host, "Name or service not known"))
    }
}

fn banner(n: usize) -> RawRecord {
    RawRecord::with_ip(format!("192.0.2.{}", n))
        .set("port", 80)
        .set("org", format!("Org {}", n))
        .set("hostnames", json!([format!("host{}.example", n)]))
        .set("location", json!({"country_name": "Canada"}))
        .set("domains", json!(["example"]))
        .set("data", format!("HTTP/1.1 200 OK #{}", n))
}

fn searching(count: usize) -> ScriptedShodan {
    ScriptedShodan {
        search_steps: (1..=count).map(|n| Step::Item(banner(n))).collect(),
        ..ScriptedShodan::default()
    }
}

fn google() -> RawRecord {
    RawRecord::with_ip("8.8.8.8")
        .set("port", 53)
        .set("org", "Google")
        .set("isp", Value::Null)
}

fn options(limit: usize) -> PipelineOptions {
    PipelineOptions {
        limit,
        throttle: Duration::ZERO,
    }
}

fn resolver() -> StaticResolver {
    StaticResolver(HashMap::from([("dns.example", "8.8.8.8".parse().unwrap())]))
}

#[tokio::test]
async fn test_keyword_limit_stops_early_in_source_order() {
    let client = searching(5);
    let pulls = Rc::clone(&client.pulls);
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(3));
    let mut reporter = MemoryReporter::new();

    let batch = pipeline
        .run(&QueryMode::Keyword("apache".to_string()), &mut reporter)
        .await;

    assert_eq!(batch.len(), 3);
    assert_eq!(pulls.get(), 3);
    let ips: Vec<_> = batch.iter().map(|r| r.ip.clone().unwrap()).collect();
    assert_eq!(ips, vec!["192.0.2.1", "192.0.2.2", "192.0.2.3"]);
    assert_eq!(batch[0].data, "HTTP/1.1 200 OK #1");
    assert!(reporter.errors().is_empty());
    assert!(reporter.contains("Searching for: apache"));
}

#[tokio::test]
async fn test_keyword_pull_count_never_exceeds_limit() {
    for (limit, expected) in [(0, 0), (1, 1), (50, 50), (10_000, 120)] {
        let client = searching(120);
        let pulls = Rc::clone(&client.pulls);
        let mut pipeline = Pipeline::with_resolver(client, resolver(), options(limit));

        let batch = pipeline.search("nginx", &mut MemoryReporter::new()).await;

        assert_eq!(batch.len(), expected, "limit {}", limit);
        assert_eq!(pulls.get(), expected, "limit {}", limit);
        assert!(pulls.get() <= limit);
    }
}

#[tokio::test]
async fn test_keyword_error_mid_stream_keeps_partial_results() {
    let client = ScriptedShodan {
        search_steps: vec![
            Step::Item(banner(1)),
            Step::Item(banner(2)),
            Step::Fail("Request rate limit reached"),
            Step::Item(banner(4)),
        ],
        ..ScriptedShodan::default()
    };
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(50));
    let mut reporter = MemoryReporter::new();

    let batch = pipeline.search("ssh", &mut reporter).await;

    assert_eq!(batch.len(), 2);
    assert_eq!(reporter.errors(), vec!["API Error: Request rate limit reached"]);
}

#[tokio::test]
async fn test_keyword_error_on_first_pull_is_empty() {
    let client = ScriptedShodan {
        search_steps: vec![Step::Fail("Invalid search query")],
        ..ScriptedShodan::default()
    };
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(50));
    let mut reporter = MemoryReporter::new();

    assert!(pipeline.search("port:", &mut reporter).await.is_empty());
    assert_eq!(reporter.errors().len(), 1);
}

#[tokio::test]
async fn test_keyword_defaults_missing_fields() {
    let client = ScriptedShodan {
        search_steps: vec![Step::Item(RawRecord::with_ip("192.0.2.99"))],
        ..ScriptedShodan::default()
    };
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(5));

    let batch = pipeline.search("x", &mut MemoryReporter::new()).await;

    assert_eq!(batch.len(), 1);
    let record = &batch[0];
    assert_eq!(record.org, "N/A");
    assert!(record.hostnames.is_empty());
    assert!(record.domains.is_empty());
    assert!(record.location.is_empty());
    assert_eq!(record.data, "");
    assert!(record.port.is_none());
}

#[tokio::test]
async fn test_timestamps_are_non_decreasing() {
    let mut pipeline = Pipeline::with_resolver(searching(20), resolver(), options(20));

    let batch = pipeline.search("x", &mut MemoryReporter::new()).await;

    assert_eq!(batch.len(), 20);
    assert!(batch.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_throttle_is_applied_between_pulls() {
    let throttled = PipelineOptions {
        limit: 3,
        throttle: Duration::from_millis(20),
    };
    let mut pipeline = Pipeline::with_resolver(searching(3), resolver(), throttled);

    let started = std::time::Instant::now();
    let batch = pipeline.search("x", &mut MemoryReporter::new()).await;

    assert_eq!(batch.len(), 3);
    // two pauses: none after the final pull
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn test_direct_ip_scenario() {
    let client = ScriptedShodan {
        hosts: HashMap::from([("8.8.8.8".to_string(), google())]),
        ..ScriptedShodan::default()
    };
    let lookups = Rc::clone(&client.lookups);
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(10));
    let mut reporter = MemoryReporter::new();

    let batch = pipeline
        .run(&QueryMode::DirectIp("8.8.8.8".to_string()), &mut reporter)
        .await;

    assert_eq!(batch.len(), 1);
    let record = &batch[0];
    assert_eq!(record.ip.as_deref(), Some("8.8.8.8"));
    assert_eq!(record.port, Some(53));
    assert_eq!(record.org, "Google");
    assert!(record.hostnames.is_empty());
    assert_eq!(record.data, google().render());
    assert!(record.data.contains("\"isp\":null"));
    assert_eq!(*lookups.borrow(), vec!["8.8.8.8"]);
    assert!(reporter.contains("Looking up IP: 8.8.8.8"));
}

#[tokio::test]
async fn test_direct_ip_unknown_is_empty_with_error() {
    let mut pipeline = Pipeline::with_resolver(ScriptedShodan::default(), resolver(), options(10));
    let mut reporter = MemoryReporter::new();

    let batch = pipeline.lookup("203.0.113.250", &mut reporter).await;

    assert!(batch.is_empty());
    assert_eq!(
        reporter.errors(),
        vec!["API Error: No information available for that IP."]
    );
}

#[tokio::test]
async fn test_direct_ip_rejects_malformed_address_without_lookup() {
    let client = ScriptedShodan::default();
    let lookups = Rc::clone(&client.lookups);
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(10));
    let mut reporter = MemoryReporter::new();

    let batch = pipeline.lookup("999.1.1.1", &mut reporter).await;

    assert!(batch.is_empty());
    assert!(lookups.borrow().is_empty());
    assert_eq!(reporter.errors().len(), 1);
}

#[tokio::test]
async fn test_url_mode_resolves_then_looks_up() {
    let client = ScriptedShodan {
        hosts: HashMap::from([("8.8.8.8".to_string(), google())]),
        ..ScriptedShodan::default()
    };
    let lookups = Rc::clone(&client.lookups);
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(10));
    let mut reporter = MemoryReporter::new();

    let batch = pipeline
        .run(&QueryMode::Url("https://dns.example/query".to_string()), &mut reporter)
        .await;

    assert_eq!(batch.len(), 1);
    assert_eq!(*lookups.borrow(), vec!["8.8.8.8"]);
    assert_eq!(reporter.at(Level::Success), vec!["Resolved dns.example to 8.8.8.8"]);
}

#[tokio::test]
async fn test_url_mode_unresolvable_makes_no_lookup() {
    let client = ScriptedShodan::default();
    let lookups = Rc::clone(&client.lookups);
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(10));
    let mut reporter = MemoryReporter::new();

    let batch = pipeline
        .run(&QueryMode::Url("http://nowhere.invalid".to_string()), &mut reporter)
        .await;

    assert!(batch.is_empty());
    assert!(lookups.borrow().is_empty());
    let errors = reporter.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0],
        "Failed to resolve nowhere.invalid: Name or service not known"
    );
}

#[tokio::test]
async fn test_url_mode_with_literal_ip() {
    let client = ScriptedShodan {
        hosts: HashMap::from([("8.8.8.8".to_string(), google())]),
        ..ScriptedShodan::default()
    };
    let mut pipeline = Pipeline::with_resolver(client, resolver(), options(10));

    let batch = pipeline
        .lookup_url("http://8.8.8.8:8080/", &mut MemoryReporter::new())
        .await;

    assert_eq!(batch.len(), 1);
}
