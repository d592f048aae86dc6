//! Listing classification.
//!
//! Turns one resolved (or timed-out) query into a listed/clear/timeout
//! verdict under the active check mode. A server's own BL/WL pattern is
//! independent of the top-level mode and always takes precedence over the
//! plain-answer interpretation.

use regex::Regex;

use crate::models::{CheckMode, ListMatch, ResolutionOutcome, ServerSpec};

/// Per-query verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Counts toward the listed totals.
    Listed,
    /// Nothing to report for this server.
    Clear,
    /// Recorded separately; never counts as listed.
    TimedOut,
}

/// Pure match predicate for per-server confirmation patterns.
///
/// The pattern is tried as a regular expression first; a pattern that does
/// not compile degrades to plain substring containment, which keeps literal
/// patterns like `127.0.0.2` working without escaping.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(candidate),
        Err(_) => candidate.contains(pattern),
    }
}

/// Applies the classification table for one check mode.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    mode: CheckMode,
}

impl Classifier {
    pub fn new(mode: CheckMode) -> Self {
        Classifier { mode }
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    /// Classifies one query outcome against the server it targeted.
    pub fn classify(&self, server: &ServerSpec, outcome: &ResolutionOutcome) -> Verdict {
        let addrs: &[String] = match outcome {
            ResolutionOutcome::TimedOut => return Verdict::TimedOut,
            ResolutionOutcome::NoRecord => &[],
            ResolutionOutcome::Answered(addrs) => addrs,
        };

        if addrs.is_empty() {
            // No answer. On a blacklist check that is clean; on a whitelist
            // check the absence of a whitelisting answer means the host is
            // not whitelisted, which is what we are probing for.
            return match self.mode {
                CheckMode::Blacklist => Verdict::Clear,
                CheckMode::Whitelist => Verdict::Listed,
            };
        }

        match &server.matcher {
            ListMatch::Blacklist(pattern) => {
                if addrs.iter().any(|addr| matches(pattern, addr)) {
                    Verdict::Listed
                } else {
                    Verdict::Clear
                }
            }
            ListMatch::Whitelist(pattern) => {
                // The expected whitelisting answer is absent: not properly
                // whitelisted, so it counts as listed.
                if addrs.iter().any(|addr| matches(pattern, addr)) {
                    Verdict::Clear
                } else {
                    Verdict::Listed
                }
            }
            ListMatch::Generic => match self.mode {
                CheckMode::Blacklist => Verdict::Listed,
                // A plain answer from a pattern-less server does not flip
                // state on a whitelist check; such a server only signals
                // through the no-answer row above. Asymmetric, but it is the
                // long-observed behavior of this check and callers may
                // depend on it.
                CheckMode::Whitelist => Verdict::Clear,
            },
        }
    }
}
