//! Hickory-backed DNS transport and domain reduction.

use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use log::{debug, warn};

use crate::resolver::DnsTransport;

/// [`DnsTransport`] implementation over a [`TokioResolver`].
///
/// List queries collapse lookup failures (NXDOMAIN included) into an empty
/// address set: for a block-list, no answer simply means "no record", and
/// transient transport errors are treated the same way rather than aborting
/// a scan.
pub struct HickoryTransport {
    resolver: TokioResolver,
}

impl HickoryTransport {
    pub fn new(resolver: TokioResolver) -> Self {
        HickoryTransport { resolver }
    }
}

#[async_trait]
impl DnsTransport for HickoryTransport {
    async fn lookup_addresses(&self, name: &str) -> Vec<String> {
        match self.resolver.lookup_ip(name).await {
            Ok(response) => response.iter().map(|ip| ip.to_string()).collect(),
            Err(e) => {
                debug!("lookup of {name} returned no usable answer: {e}");
                Vec::new()
            }
        }
    }

    async fn forward_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        match self.resolver.lookup_ip(host).await {
            Ok(response) => response.iter().find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            }),
            Err(e) => {
                warn!("failed to resolve {host}: {e}");
                None
            }
        }
    }

    async fn reverse_name(&self, ip: IpAddr) -> Option<String> {
        match self.resolver.reverse_lookup(ip).await {
            Ok(response) => response.iter().next().map(|name| name.to_utf8()),
            Err(e) => {
                warn!("failed to perform reverse DNS lookup for {ip}: {e}");
                None
            }
        }
    }
}

/// Reduces a hostname to its registrable two-label form
/// (e.g. `smtp.mail.example.com` → `example.com`).
///
/// Uses the Public Suffix List, so multi-label suffixes like `co.uk` come out
/// right; names the list rejects fall back to the last two labels. Returns
/// `None` for IP literals and single-label names, for which a domain-based
/// list query is meaningless.
pub fn bare_domain(hostname: &str) -> Option<String> {
    let host = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return None;
    }

    if let Some(domain) = psl::domain_str(&host) {
        return Some(domain.to_string());
    }

    let labels: Vec<&str> = host.split('.').filter(|label| !label.is_empty()).collect();
    if labels.len() >= 2 {
        Some(labels[labels.len() - 2..].join("."))
    } else {
        None
    }
}
