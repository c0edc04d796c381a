//! URL host extraction and name resolution
//!
//! Accepts either a full URL (`https://example.com/login`) or a bare host
//! (`example.com`, `example.com/path`, `203.0.113.9`) and turns it into a
//! single IP address for a host lookup.
//!
//! # Example
//!
//! ```
//! use blacked_core::targets::{parse_url_target, Target};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = parse_url_target("https://example.com/index.html")?;
//! assert_eq!(target, Target::Name("example.com".to_string()));
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use std::net::IpAddr;
use url::{Host, ParseError, Url};

/// Host component of a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Literal address, no resolution needed
    Ip(IpAddr),
    /// Domain name to resolve
    Name(String),
}

/// Extracts the host of `input`
///
/// Inputs without a scheme are read as `http://<input>`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if no host can be extracted.
pub fn parse_url_target(input: &str) -> Result<Target> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidInput("empty URL".to_string()));
    }

    let url = match Url::parse(input) {
        Ok(url) if url.has_host() => url,
        // "example.com:8080" parses with "example.com" as the scheme.
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{}", input))
                .map_err(|e| Error::InvalidInput(format!("{}: {}", input, e)))?
        }
        Err(e) => return Err(Error::InvalidInput(format!("{}: {}", input, e))),
    };

    match url.host() {
        Some(Host::Ipv4(ip)) => Ok(Target::Ip(IpAddr::V4(ip))),
        Some(Host::Ipv6(ip)) => Ok(Target::Ip(IpAddr::V6(ip))),
        Some(Host::Domain(name)) if !name.is_empty() => Ok(Target::Name(name.to_string())),
        _ => Err(Error::InvalidInput(format!("no host in URL: {}", input))),
    }
}

/// Name resolution used by URL mode
#[allow(async_fn_in_trait)]
pub trait Resolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr>;
}

/// Resolves through the operating system's resolver
///
/// IPv4 answers are preferred; an IPv6 address is returned only when the
/// name has no IPv4 address.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr> {
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| Error::resolution(host, e))?
            .map(|addr| addr.ip())
            .collect();

        tracing::debug!(host, answers = addrs.len(), "resolved host");

        pick_address(&addrs).ok_or_else(|| Error::resolution(host, "no addresses found"))
    }
}

fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

/// Resolves the host of a URL to one IP address
///
/// Literal IP hosts are returned without consulting `resolver`.
pub async fn resolve_url<R: Resolver>(resolver: &R, input: &str) -> Result<(String, IpAddr)> {
    let target = parse_url_target(input).map_err(|e| Error::resolution(input.trim(), e))?;
    match target {
        Target::Ip(ip) => Ok((ip.to_string(), ip)),
        Target::Name(name) => {
            let ip = resolver.resolve(&name).await?;
            Ok((name, ip))
        }
    }
}
