//! Bounded-concurrency DNS resolution.
//!
//! [`ConcurrentResolver`] drives a batch of query names with at most
//! `workers` lookups outstanding at a time and delivers every name's outcome
//! to a callback exactly once. Concurrency here is a bounded asynchronous
//! I/O window, not parallel threads: the only suspension point is the wait
//! for at least one outstanding query to become ready.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use log::debug;

use crate::error_handling::CheckError;
use crate::models::{QueryName, ResolutionOutcome};

/// DNS transport seam.
///
/// The scheduling loop never talks to a resolver implementation directly;
/// it only needs address lookups for list queries plus forward/reverse
/// resolution of the target itself. Retry behavior lives inside the
/// implementation (the hickory resolver's `attempts`), not in the loop.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Resolves `name` to its address records, in answer order.
    ///
    /// Returns an empty vector when the name has no address records or the
    /// lookup fails; the caller treats both as "no record".
    async fn lookup_addresses(&self, name: &str) -> Vec<String>;

    /// Forward-resolves a hostname to its first IPv4 address.
    async fn forward_ipv4(&self, host: &str) -> Option<std::net::Ipv4Addr>;

    /// Reverse-resolves an address to a hostname, if it has a PTR mapping.
    async fn reverse_name(&self, ip: std::net::IpAddr) -> Option<String>;
}

/// Resolves batches of query names through a bounded window.
pub struct ConcurrentResolver {
    transport: Arc<dyn DnsTransport>,
    workers: usize,
    query_timeout: Duration,
}

impl std::fmt::Debug for ConcurrentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentResolver")
            .field("workers", &self.workers)
            .field("query_timeout", &self.query_timeout)
            .finish_non_exhaustive()
    }
}

impl ConcurrentResolver {
    /// Creates a resolver with the given window size and per-wait-cycle
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns `CheckError::InvalidWorkerCount` when `workers` is zero.
    pub fn new(
        transport: Arc<dyn DnsTransport>,
        workers: usize,
        query_timeout: Duration,
    ) -> Result<Self, CheckError> {
        if workers == 0 {
            return Err(CheckError::InvalidWorkerCount);
        }
        Ok(ConcurrentResolver {
            transport,
            workers,
            query_timeout,
        })
    }

    /// Resolves one batch, invoking `deliver` exactly once per input name.
    ///
    /// The loop alternates between filling the window and waiting up to the
    /// query timeout for completions. When a wait produces at least one
    /// completion, every already-ready completion is drained before the
    /// window is refilled, so bursty replies cannot starve the fill step.
    /// A wait that produces nothing flushes all outstanding queries as
    /// [`ResolutionOutcome::TimedOut`]; their lookups are dropped and a late
    /// answer is discarded.
    ///
    /// Delivery order follows readiness, not input order. Duplicate names
    /// each get their own outcome.
    pub async fn resolve_batch<F>(&self, names: Vec<QueryName>, mut deliver: F)
    where
        F: FnMut(QueryName, ResolutionOutcome),
    {
        let mut input = names.into_iter();
        let mut outstanding = FuturesUnordered::new();
        // Keyed by a per-batch sequence id so duplicate names stay distinct.
        let mut pending: HashMap<u64, QueryName> = HashMap::new();
        let mut next_id: u64 = 0;

        loop {
            // Filling: top the window up from the remaining input.
            while outstanding.len() < self.workers {
                let Some(name) = input.next() else { break };
                let id = next_id;
                next_id += 1;
                debug!("issuing query {} ({})", name.fqdn, id);
                pending.insert(id, name.clone());
                let transport = Arc::clone(&self.transport);
                outstanding.push(async move {
                    let addrs = transport.lookup_addresses(&name.fqdn).await;
                    (id, addrs)
                });
            }

            if outstanding.is_empty() {
                // Input exhausted and nothing in flight: batch done.
                break;
            }

            // Waiting: block for up to the query timeout for one completion.
            match tokio::time::timeout(self.query_timeout, outstanding.next()).await {
                Ok(Some((id, addrs))) => {
                    Self::complete(&mut pending, &mut deliver, id, addrs);
                    // Drain everything that is already ready before refilling.
                    while let Some(Some((id, addrs))) = outstanding.next().now_or_never() {
                        Self::complete(&mut pending, &mut deliver, id, addrs);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    // Timeout flush: hard cutoff for the whole window.
                    debug!(
                        "no replies within {:?}; flushing {} outstanding queries",
                        self.query_timeout,
                        pending.len()
                    );
                    outstanding.clear();
                    for (_, name) in pending.drain() {
                        deliver(name, ResolutionOutcome::TimedOut);
                    }
                }
            }
        }
    }

    fn complete<F>(
        pending: &mut HashMap<u64, QueryName>,
        deliver: &mut F,
        id: u64,
        addrs: Vec<String>,
    ) where
        F: FnMut(QueryName, ResolutionOutcome),
    {
        // The id was inserted when the query was issued and is removed only
        // here or in the timeout flush, so it must still be present.
        let Some(name) = pending.remove(&id) else {
            return;
        };
        let outcome = if addrs.is_empty() {
            ResolutionOutcome::NoRecord
        } else {
            ResolutionOutcome::Answered(addrs)
        };
        debug!("query {} resolved: {:?}", name.fqdn, outcome);
        deliver(name, outcome);
    }
}
