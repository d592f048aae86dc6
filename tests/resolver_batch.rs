//! Behavioral tests for the bounded-concurrency resolution engine.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use rbl_status::error_handling::CheckError;
use rbl_status::models::{QueryName, ResolutionOutcome, ServerSpec};
use rbl_status::resolver::{ConcurrentResolver, DnsTransport};

use helpers::MockTransport;

fn name(fqdn: &str) -> QueryName {
    QueryName {
        fqdn: fqdn.to_string(),
        server: ServerSpec::generic("bl.example.org"),
    }
}

#[test]
fn zero_workers_rejected_at_construction() {
    let transport = Arc::new(MockTransport::new());
    let err = ConcurrentResolver::new(transport, 0, Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, CheckError::InvalidWorkerCount));
}

#[tokio::test(start_paused = true)]
async fn empty_batch_completes_without_callbacks() {
    let transport = Arc::new(MockTransport::new());
    let resolver = ConcurrentResolver::new(transport, 4, Duration::from_secs(1)).unwrap();

    let mut calls = 0;
    resolver.resolve_batch(Vec::new(), |_, _| calls += 1).await;
    assert_eq!(calls, 0);
}

#[tokio::test(start_paused = true)]
async fn outstanding_queries_never_exceed_worker_bound() {
    let mut transport = MockTransport::new();
    let names: Vec<QueryName> = (0..20).map(|i| name(&format!("q{i}.bl.example.org"))).collect();
    for n in &names {
        transport = transport.with_delay(&n.fqdn, Duration::from_millis(10));
    }
    let transport = Arc::new(transport);

    let resolver =
        ConcurrentResolver::new(Arc::clone(&transport) as Arc<dyn DnsTransport>, 3, Duration::from_secs(5)).unwrap();

    let mut delivered = 0;
    resolver
        .resolve_batch(names, |_, _| delivered += 1)
        .await;

    assert_eq!(delivered, 20);
    assert!(
        transport.max_in_flight() <= 3,
        "saw {} concurrent lookups with a window of 3",
        transport.max_in_flight()
    );
}

#[tokio::test(start_paused = true)]
async fn every_name_gets_exactly_one_outcome() {
    let transport = Arc::new(
        MockTransport::new()
            .with_answer("listed.bl.example.org", &["127.0.0.2"])
            .with_delay("slow.bl.example.org", Duration::from_secs(3600)),
    );
    let resolver =
        ConcurrentResolver::new(Arc::clone(&transport) as Arc<dyn DnsTransport>, 8, Duration::from_secs(2)).unwrap();

    let names = vec![
        name("listed.bl.example.org"),
        name("absent.bl.example.org"),
        name("slow.bl.example.org"),
    ];

    let mut outcomes = Vec::new();
    resolver
        .resolve_batch(names, |name, outcome| outcomes.push((name.fqdn, outcome)))
        .await;

    assert_eq!(outcomes.len(), 3);
    let by_name = |fqdn: &str| {
        outcomes
            .iter()
            .filter(|(n, _)| n == fqdn)
            .map(|(_, o)| o.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(
        by_name("listed.bl.example.org"),
        vec![ResolutionOutcome::Answered(vec!["127.0.0.2".to_string()])]
    );
    assert_eq!(
        by_name("absent.bl.example.org"),
        vec![ResolutionOutcome::NoRecord]
    );
    assert_eq!(
        by_name("slow.bl.example.org"),
        vec![ResolutionOutcome::TimedOut]
    );
}

#[tokio::test(start_paused = true)]
async fn duplicate_names_each_get_independent_outcomes() {
    let transport = Arc::new(MockTransport::new().with_answer("dup.bl.example.org", &["127.0.0.2"]));
    let resolver =
        ConcurrentResolver::new(Arc::clone(&transport) as Arc<dyn DnsTransport>, 2, Duration::from_secs(1)).unwrap();

    let names = vec![name("dup.bl.example.org"), name("dup.bl.example.org")];
    let mut delivered = Vec::new();
    resolver
        .resolve_batch(names, |name, _| delivered.push(name.fqdn))
        .await;

    assert_eq!(
        delivered,
        vec!["dup.bl.example.org".to_string(), "dup.bl.example.org".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn silent_wait_cycle_flushes_all_outstanding_as_timed_out() {
    let transport = Arc::new(
        MockTransport::new()
            .with_delay("s1.bl.example.org", Duration::from_secs(3600))
            .with_delay("s2.bl.example.org", Duration::from_secs(3600)),
    );
    let resolver =
        ConcurrentResolver::new(Arc::clone(&transport) as Arc<dyn DnsTransport>, 4, Duration::from_secs(1)).unwrap();

    let names = vec![name("s1.bl.example.org"), name("s2.bl.example.org")];
    let mut outcomes = Vec::new();
    resolver
        .resolve_batch(names, |name, outcome| outcomes.push((name.fqdn, outcome)))
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes
        .iter()
        .all(|(_, o)| *o == ResolutionOutcome::TimedOut));
}

#[tokio::test(start_paused = true)]
async fn answers_arriving_together_are_drained_before_refilling() {
    // Four queries complete at the same instant; with a window of 2 the
    // second pair is only issued after the first pair has been delivered.
    let mut transport = MockTransport::new();
    for n in ["a", "b", "c", "d"] {
        transport = transport.with_delay(&format!("{n}.bl.example.org"), Duration::from_millis(5));
    }
    let transport = Arc::new(transport);
    let resolver =
        ConcurrentResolver::new(Arc::clone(&transport) as Arc<dyn DnsTransport>, 2, Duration::from_secs(1)).unwrap();

    let names: Vec<QueryName> = ["a", "b", "c", "d"]
        .iter()
        .map(|n| name(&format!("{n}.bl.example.org")))
        .collect();

    let mut delivered = Vec::new();
    resolver
        .resolve_batch(names, |name, _| delivered.push(name.fqdn))
        .await;

    assert_eq!(delivered.len(), 4);
    // The first two issued queries were delivered before the last two were
    // issued at all.
    let issued = transport.issued();
    assert_eq!(issued.len(), 4);
    assert!(issued[..2].iter().all(|n| delivered[..2].contains(n)));
}
