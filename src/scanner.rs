//! Range scanning.
//!
//! Drives the planner, the concurrent resolver and the classifier once per
//! target IP: a single octet for one host, or the full 1..=254 spread of the
//! target's class-C block. Batches run strictly sequentially; the outstanding
//! query window never spans two IPs.

use std::net::{IpAddr, Ipv4Addr};

use log::{debug, info};

use crate::classify::{Classifier, Verdict};
use crate::dns::bare_domain;
use crate::error_handling::CheckError;
use crate::models::{AggregateResult, IpScanResult, ServerSpec};
use crate::planner;
use crate::resolver::{ConcurrentResolver, DnsTransport};

/// Resolved scan target: the base IPv4 address plus, when recoverable, the
/// registrable domain used for RHSBL queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub base: Ipv4Addr,
    pub domain: Option<String>,
}

/// Resolves the configured host into a [`Target`].
///
/// A hostname is forward-resolved to its first IPv4 address; failure is
/// fatal, the check cannot proceed without an address. An IPv4 literal is
/// used as-is, with a reverse lookup to recover a hostname for RHSBL; a
/// missing reverse mapping merely leaves the domain unknown (RHSBL names are
/// then not generated). With `ip_only` set the reverse lookup is skipped
/// entirely.
pub async fn resolve_target(
    host: &str,
    ip_only: bool,
    transport: &dyn DnsTransport,
) -> Result<Target, CheckError> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        let domain = if ip_only {
            None
        } else {
            let name = transport.reverse_name(IpAddr::V4(ip)).await;
            name.as_deref().and_then(bare_domain)
        };
        return Ok(Target { base: ip, domain });
    }

    let ip = transport
        .forward_ipv4(host)
        .await
        .ok_or_else(|| CheckError::TargetUnresolvable(host.to_string()))?;
    Ok(Target {
        base: ip,
        domain: bare_domain(host),
    })
}

/// Everything one invocation produces: the ordered per-IP results (input to
/// the CSV writer) and the aggregate totals.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub results: Vec<IpScanResult>,
    pub totals: AggregateResult,
}

/// Sequential per-IP driver around the concurrent resolution engine.
pub struct RangeScanner<'a> {
    resolver: &'a ConcurrentResolver,
    classifier: Classifier,
    servers: &'a [ServerSpec],
    rhservers: &'a [ServerSpec],
    ip_only: bool,
}

impl<'a> RangeScanner<'a> {
    pub fn new(
        resolver: &'a ConcurrentResolver,
        classifier: Classifier,
        servers: &'a [ServerSpec],
        rhservers: &'a [ServerSpec],
        ip_only: bool,
    ) -> Self {
        RangeScanner {
            resolver,
            classifier,
            servers,
            rhservers,
            ip_only,
        }
    }

    /// Scans the target: one IP, or its whole class-C block.
    ///
    /// Class-C mode forces IP-only classification: a single domain name is
    /// not meaningful across 254 distinct addresses, so RHSBL names are never
    /// generated even when rhservers are configured. Each last-octet value is
    /// independent; nothing per-IP aborts the remaining addresses.
    pub async fn scan(&self, target: &Target, class_c: bool) -> Result<ScanOutcome, CheckError> {
        let ip_only = self.ip_only || class_c;
        planner::ensure_sources(self.servers, self.rhservers, ip_only)?;

        let [o1, o2, o3, o4] = target.base.octets();
        let octets = if class_c {
            crate::config::CLASS_C_FIRST_OCTET..=crate::config::CLASS_C_LAST_OCTET
        } else {
            o4..=o4
        };

        let mut results = Vec::new();
        let mut totals = AggregateResult::default();

        for octet in octets {
            let ip = Ipv4Addr::new(o1, o2, o3, octet);
            let result = self.scan_ip(ip, target.domain.as_deref(), ip_only).await?;
            if !result.listed.is_empty() {
                info!(
                    "{} listed on {} server(s): {}",
                    result.ip,
                    result.listed.len(),
                    result.listed.iter().cloned().collect::<Vec<_>>().join(", ")
                );
            }
            totals.absorb(&result);
            results.push(result);
        }

        Ok(ScanOutcome { results, totals })
    }

    async fn scan_ip(
        &self,
        ip: Ipv4Addr,
        domain: Option<&str>,
        ip_only: bool,
    ) -> Result<IpScanResult, CheckError> {
        let names = planner::plan(ip, domain, self.servers, self.rhservers, ip_only)?;
        debug!("scanning {} with {} queries", ip, names.len());

        let classifier = self.classifier;
        let mut result = IpScanResult::new(ip.to_string());
        self.resolver
            .resolve_batch(names, |name, outcome| {
                match classifier.classify(&name.server, &outcome) {
                    Verdict::Listed => {
                        result.listed.insert(name.server.suffix.clone());
                    }
                    Verdict::TimedOut => {
                        result.timed_out.insert(name.server.suffix.clone());
                    }
                    Verdict::Clear => {}
                }
            })
            .await;

        Ok(result)
    }
}
