//! Scale test: 20K registrations.
//!
//! Validates that the existence index grows without false negatives and
//! that pattern queries stay proportional to the matching subtree.

use vcp_identity::index::{ExistenceIndex, HierarchyIndex};
use vcp_identity::{Authorization, EntryId, Pattern, PrivacyTier, Registry, RegistryConfig, Token};

fn populate(registry: &Registry, orgs: usize, units: usize) {
    for o in 0..orgs {
        for u in 0..units {
            let token = Token::parse(&format!("company.org{o}.dept{}.unit{u}", u % 10))
                .expect("token should parse");
            registry
                .register(token, PrivacyTier::Public, None, None)
                .expect("registration should succeed");
        }
    }
}

#[test]
fn stress_20k_registrations_no_false_negatives() {
    let registry = Registry::with_config(RegistryConfig::default().with_expected_entries(64));
    populate(&registry, 200, 100);

    assert_eq!(registry.len(), 20_000);
    let stats = registry.stats();
    assert_eq!(stats.canonical_paths, 20_000);
    assert!(stats.existence_capacity >= 20_000);

    for entry in registry.entries() {
        assert!(registry.might_exist(&entry.token), "{}", entry.token);
    }
}

#[test]
fn stress_20k_queries_scoped() {
    let registry = Registry::new();
    populate(&registry, 200, 100);
    let anon = Authorization::anonymous();

    let r = registry.find("company.org7.**", &anon).unwrap();
    assert_eq!(r.tokens.len(), 100);

    let r = registry.find("company.*.dept3.*", &anon).unwrap();
    assert_eq!(r.tokens.len(), 200 * 10);

    let r = registry.find("company.org199.dept9.unit99", &anon).unwrap();
    assert_eq!(r.tokens.len(), 1);

    let r = registry.find("company.org200.**", &anon).unwrap();
    assert!(r.is_empty());
}

#[test]
fn stress_exact_miss_is_pruned() {
    let mut trie = HierarchyIndex::new();
    let mut bloom = ExistenceIndex::with_capacity(10_000, 0.001);
    for i in 0..10_000u64 {
        let t = Token::parse(&format!("family.kid{i}.guide")).unwrap();
        trie.insert(&t, EntryId(i));
        bloom.insert(&t.canonical());
    }

    let mut pruned = 0;
    for i in 10_000..11_000 {
        let p = Pattern::parse(&format!("family.kid{i}.guide")).unwrap();
        let res = trie.resolve(&p, &bloom);
        assert!(res.ids.is_empty());
        pruned += res.pruned;
    }
    // Target false-positive rate is 0.1%; allow generous slack.
    assert!(pruned >= 950, "only {pruned} of 1000 misses pruned");

    let res = trie.resolve(&Pattern::parse("family.*.guide").unwrap(), &bloom);
    assert_eq!(res.ids.len(), 10_000);
}
