use std::collections::BTreeSet;
use std::fmt;

/// How an answer from a list server is to be interpreted.
///
/// Most servers are `Generic`: any answer means "listed" (or, for a whitelist
/// check, a missing answer means "not whitelisted"). A server can instead
/// carry an explicit confirmation pattern that reinterprets the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMatch {
    /// No pattern; a plain answer is the signal.
    Generic,
    /// Listed iff any resolved address matches the pattern.
    Blacklist(String),
    /// Listed iff *no* resolved address matches the pattern
    /// (the expected whitelisting answer is absent).
    Whitelist(String),
}

/// One configured block-list (or domain-list) server, immutable after
/// configuration parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    /// DNS suffix of the list, e.g. `bl.example.org`.
    pub suffix: String,
    /// Per-server override pattern, independent of the top-level mode.
    pub matcher: ListMatch,
}

impl ServerSpec {
    pub fn generic(suffix: &str) -> Self {
        ServerSpec {
            suffix: suffix.to_string(),
            matcher: ListMatch::Generic,
        }
    }
}

/// Top-level check mode, mutually exclusive, fixed per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Presence on a list is bad.
    Blacklist,
    /// Absence from a list is bad.
    Whitelist,
}

/// A fully qualified DNS name to resolve, carrying the server it targets so
/// the answer can be attributed without guessing from the name text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryName {
    pub fqdn: String,
    pub server: ServerSpec,
}

impl fmt::Display for QueryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn)
    }
}

/// The one-and-only outcome of resolving a [`QueryName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// At least one address record came back, in answer order.
    Answered(Vec<String>),
    /// The transport answered with no address records, or reported an error.
    NoRecord,
    /// The query was still outstanding when a wait cycle produced nothing.
    TimedOut,
}

/// Listing state for a single scanned IP. Built fresh per IP and never
/// mutated once the scan of that IP completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpScanResult {
    pub ip: String,
    /// Servers on which the IP was found listed (or not properly
    /// whitelisted, in whitelist mode).
    pub listed: BTreeSet<String>,
    /// Servers whose query timed out.
    pub timed_out: BTreeSet<String>,
}

impl IpScanResult {
    pub fn new(ip: String) -> Self {
        IpScanResult {
            ip,
            listed: BTreeSet::new(),
            timed_out: BTreeSet::new(),
        }
    }
}

/// Running totals across all IPs scanned in one invocation. Monotone:
/// `absorb` only ever increments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Sum of listed-server hits across all scanned IPs.
    pub servers_listed: usize,
    /// Sum of timed-out queries across all scanned IPs.
    pub timeouts: usize,
    /// Number of scanned IPs with at least one listing.
    pub hosts_listed: usize,
}

impl AggregateResult {
    pub fn absorb(&mut self, result: &IpScanResult) {
        self.servers_listed += result.listed.len();
        self.timeouts += result.timed_out.len();
        if !result.listed.is_empty() {
            self.hosts_listed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_accumulates_monotonically() {
        let mut agg = AggregateResult::default();

        let mut first = IpScanResult::new("192.0.2.1".to_string());
        first.listed.insert("bl.example.org".to_string());
        first.listed.insert("bl2.example.org".to_string());
        first.timed_out.insert("slow.example.org".to_string());

        let second = IpScanResult::new("192.0.2.2".to_string());

        agg.absorb(&first);
        agg.absorb(&second);

        assert_eq!(agg.servers_listed, 2);
        assert_eq!(agg.timeouts, 1);
        assert_eq!(agg.hosts_listed, 1);
    }
}
