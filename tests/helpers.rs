// Shared test helpers: a programmable in-memory DNS transport.
//
// Used across the integration test files to exercise the resolution engine
// and scanner without touching the network.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use rbl_status::resolver::DnsTransport;

/// In-memory [`DnsTransport`] with programmable answers, per-name delays,
/// and bookkeeping for concurrency assertions.
#[derive(Default)]
pub struct MockTransport {
    answers: HashMap<String, Vec<String>>,
    delays: HashMap<String, Duration>,
    forward: HashMap<String, Ipv4Addr>,
    reverse: HashMap<IpAddr, String>,
    issued: Mutex<Vec<String>>,
    in_flight: Mutex<Flight>,
}

#[derive(Default)]
struct Flight {
    current: usize,
    max: usize,
}

#[allow(dead_code)] // Used by other test files
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs address records for a query name.
    pub fn with_answer(mut self, name: &str, addrs: &[&str]) -> Self {
        self.answers
            .insert(name.to_string(), addrs.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Delays the lookup of a query name. Combine with a paused tokio clock
    /// to simulate slow or never-answering servers deterministically.
    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn with_forward(mut self, host: &str, ip: Ipv4Addr) -> Self {
        self.forward.insert(host.to_string(), ip);
        self
    }

    pub fn with_reverse(mut self, ip: IpAddr, name: &str) -> Self {
        self.reverse.insert(ip, name.to_string());
        self
    }

    /// Every query name passed to `lookup_addresses`, in issue order.
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }

    /// High-water mark of concurrently outstanding lookups.
    pub fn max_in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().max
    }
}

#[async_trait]
impl DnsTransport for MockTransport {
    async fn lookup_addresses(&self, name: &str) -> Vec<String> {
        self.issued.lock().unwrap().push(name.to_string());
        {
            let mut flight = self.in_flight.lock().unwrap();
            flight.current += 1;
            flight.max = flight.max.max(flight.current);
        }

        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }

        self.in_flight.lock().unwrap().current -= 1;
        self.answers.get(name).cloned().unwrap_or_default()
    }

    async fn forward_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        self.forward.get(host).copied()
    }

    async fn reverse_name(&self, ip: IpAddr) -> Option<String> {
        self.reverse.get(&ip).cloned()
    }
}
