//! Concurrency test: parallel registration and querying.
//!
//! Validates that the registry stays consistent under concurrent writers
//! and readers sharing one instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use vcp_identity::{Authorization, PrivacyTier, Registry, RegistryError, Token};

#[test]
fn stress_16_concurrent_writers() {
    let registry = Arc::new(Registry::new());

    let mut handles = Vec::new();
    for thread_id in 0..16 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            for i in 0..200 {
                let token = Token::parse(&format!("company.org{thread_id}.unit{i}"))
                    .expect("token should parse");
                registry
                    .register(token, PrivacyTier::Public, None, None)
                    .expect("distinct tokens never collide");
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(registry.len(), 3_200);
    let r = registry
        .find("company.**", &Authorization::anonymous())
        .unwrap();
    assert_eq!(r.tokens.len(), 3_200);

    // Entry ids are dense and unique.
    let mut ids: Vec<u64> = registry.entries().iter().map(|e| e.id.0).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..3_200).collect::<Vec<u64>>());
}

#[test]
fn stress_readers_during_writes_see_consistent_results() {
    let registry = Arc::new(Registry::new());
    for i in 0..100 {
        registry
            .register(
                Token::parse(&format!("family.seed{i}.guide")).unwrap(),
                PrivacyTier::Public,
                None,
                None,
            )
            .unwrap();
    }

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..500 {
                registry
                    .register(
                        Token::parse(&format!("family.new{i}.guide")).unwrap(),
                        PrivacyTier::Public,
                        None,
                        None,
                    )
                    .unwrap();
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        readers.push(thread::spawn(move || {
            let mut last = 0;
            for _ in 0..200 {
                let r = registry
                    .find("family.*.guide", &Authorization::anonymous())
                    .unwrap();
                // Monotonic: a reader never sees the set shrink.
                assert!(r.tokens.len() >= last);
                assert!(r.tokens.len() >= 100);
                last = r.tokens.len();

                // Always sorted.
                let canon: Vec<String> = r.tokens.iter().map(Token::canonical).collect();
                let mut sorted = canon.clone();
                sorted.sort();
                assert_eq!(canon, sorted);
            }
        }));
    }

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    let r = registry
        .find("family.*.guide", &Authorization::anonymous())
        .unwrap();
    assert_eq!(r.tokens.len(), 600);
}

#[test]
fn stress_racing_supersession_has_one_winner_per_tier() {
    let registry = Arc::new(Registry::new());
    let token = Token::parse("company.acme.legal").unwrap();
    registry
        .register(token.clone(), PrivacyTier::Public, None, None)
        .unwrap();

    let wins = Arc::new(AtomicUsize::new(0));
    let collisions = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let registry = Arc::clone(&registry);
        let token = token.clone();
        let wins = Arc::clone(&wins);
        let collisions = Arc::clone(&collisions);
        handles.push(thread::spawn(move || {
            match registry.register(token, PrivacyTier::Organizational, None, None) {
                Ok(_) => wins.fetch_add(1, Ordering::SeqCst),
                Err(RegistryError::NamespaceCollision { .. }) => {
                    collisions.fetch_add(1, Ordering::SeqCst)
                }
                Err(e) => panic!("unexpected error: {e}"),
            };
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_eq!(collisions.load(Ordering::SeqCst), 31);
    assert_eq!(registry.history(&token).len(), 2);
    assert_eq!(registry.stats().active, 1);
}
