//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Parse and register tokens across every privacy tier
//! 2. Query as outsider, member, and owner
//! 3. Supersede an entry at a stricter tier
//! 4. Revoke an entry
//! 5. Save, reload, and query again

use std::sync::{Arc, Mutex};

use vcp_identity::proof::{commit, commit_key};
use vcp_identity::storage::{load_registry, save_registry};
use vcp_identity::{
    Authorization, OwnershipProof, OwnershipSecret, PrivacyTier, Registry, RegistryError,
    RegistryEvent, Token,
};

fn tok(raw: &str) -> Token {
    Token::parse(raw).expect("token should parse")
}

fn full(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(Token::full).collect()
}

#[test]
fn full_workflow_register_query_revoke_persist() {
    let registry = Registry::new();

    // ── Step 1: Register ────────────────────────────────────────────────
    registry
        .register(tok("company.acme.handbook"), PrivacyTier::Public, None, None)
        .unwrap();
    registry
        .register(
            tok("company.acme.legal.compliance@1.0.0:SEC"),
            PrivacyTier::Organizational,
            None,
            Some("acme".into()),
        )
        .unwrap();
    registry
        .register(tok("company.acme.hr.reviews"), PrivacyTier::Personal, None, None)
        .unwrap();

    let secret = OwnershipSecret::generate();
    registry
        .register(
            tok("company.acme.whistle.box"),
            PrivacyTier::Pseudonymous,
            Some(commit(&secret, "company.acme.whistle.box")),
            None,
        )
        .unwrap();

    let key = ed25519_dalek::SigningKey::generate(&mut rand::thread_rng());
    registry
        .register(
            tok("anon.q9.journal"),
            PrivacyTier::Pseudonymous,
            Some(commit_key(&key.verifying_key(), "anon.q9.journal")),
            None,
        )
        .unwrap();

    // ── Step 2: Query ───────────────────────────────────────────────────
    let outsider = registry
        .find("company.acme.**", &Authorization::anonymous())
        .unwrap();
    assert_eq!(full(&outsider.tokens), vec!["company.acme.handbook"]);
    assert_eq!(outsider.redacted_count, 3);
    assert!(!outsider.scope_authorized);

    let member = Authorization::anonymous().with_org("acme");
    let inside = registry.find("company.acme.**", &member).unwrap();
    assert_eq!(
        full(&inside.tokens),
        vec![
            "company.acme.handbook",
            "company.acme.legal.compliance@1.0.0:SEC"
        ]
    );
    assert_eq!(inside.redacted_count, 2);

    let owner = member
        .clone()
        .with_proof(OwnershipProof::Reveal(secret.clone()));
    let owned = registry.find("company.acme.**", &owner).unwrap();
    assert_eq!(owned.tokens.len(), 3);
    assert_eq!(owned.redacted_count, 1);

    let signer = Authorization::anonymous()
        .with_proof(OwnershipProof::sign(&key, &registry.challenge()));
    let signed = registry.find("anon.*.*", &signer).unwrap();
    assert_eq!(full(&signed.tokens), vec!["anon.q9.journal"]);

    // ── Step 3: Supersede ───────────────────────────────────────────────
    let err = registry
        .register(tok("company.acme.handbook"), PrivacyTier::Public, None, None)
        .unwrap_err();
    assert!(matches!(err, RegistryError::NamespaceCollision { .. }));

    registry
        .register(tok("company.acme.handbook"), PrivacyTier::Organizational, None, None)
        .unwrap();
    let outsider = registry
        .find("company.acme.**", &Authorization::anonymous())
        .unwrap();
    assert!(outsider.tokens.is_empty());
    assert_eq!(outsider.redacted_count, 4);

    // ── Step 4: Revoke ──────────────────────────────────────────────────
    registry.revoke(&tok("company.acme.hr.reviews")).unwrap();
    let outsider = registry
        .find("company.acme.**", &Authorization::anonymous())
        .unwrap();
    assert_eq!(outsider.redacted_count, 3);
    assert_eq!(registry.history(&tok("company.acme.hr.reviews")).len(), 2);

    // ── Step 5: Persist ─────────────────────────────────────────────────
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");
    save_registry(&registry, &path).unwrap();
    let reloaded = load_registry(&path).unwrap();

    assert_eq!(reloaded.len(), registry.len());
    for pattern in ["company.acme.**", "*.*.*", "anon.**"] {
        let a = registry.find(pattern, &owner).unwrap();
        let b = reloaded.find(pattern, &owner).unwrap();
        assert_eq!(a, b, "{pattern}");
    }

    // Signatures answer a specific challenge; a reloaded registry issues a
    // new one.
    let stale = reloaded.find("anon.*.*", &signer).unwrap();
    assert!(stale.tokens.is_empty());
    assert_eq!(stale.redacted_count, 1);
}

#[test]
fn workflow_hierarchy_navigation() {
    let registry = Registry::new();
    let leaf = tok("org.example.dept.team.policy@2.1.0:GOV");

    let mut cursor = Some(leaf.clone());
    while let Some(t) = cursor {
        registry
            .register(t.clone(), PrivacyTier::Public, None, None)
            .unwrap();
        cursor = t.parent();
    }

    let r = registry
        .find("org.example.**", &Authorization::anonymous())
        .unwrap();
    assert_eq!(
        full(&r.tokens),
        vec![
            "org.example.dept:GOV",
            "org.example.dept.team:GOV",
            "org.example.dept.team.policy@2.1.0:GOV",
        ]
    );
    for t in &r.tokens[..2] {
        assert!(t.is_ancestor_of(&leaf));
    }

    let child = leaf.child("draft").unwrap();
    assert!(child.is_descendant_of(&leaf));
    assert!(registry
        .resolve(&child, &Authorization::anonymous())
        .is_none());
}

#[test]
fn workflow_subscription_feed() {
    let registry = Registry::new();
    let events: Arc<Mutex<Vec<(RegistryEvent, String, PrivacyTier)>>> = Arc::default();

    let sink = Arc::clone(&events);
    let id = registry
        .subscribe(
            "family.**",
            Authorization::anonymous(),
            move |n| {
                sink.lock()
                    .unwrap()
                    .push((n.event, n.token.canonical(), n.privacy_tier));
            },
        )
        .unwrap();

    registry
        .register(tok("family.safe.guide"), PrivacyTier::Public, None, None)
        .unwrap();
    registry.revoke(&tok("family.safe.guide")).unwrap();
    registry
        .register(tok("family.home.rules"), PrivacyTier::Personal, None, None)
        .unwrap();
    registry
        .register(tok("work.focus.assistant"), PrivacyTier::Public, None, None)
        .unwrap();

    assert!(registry.unsubscribe(id));
    registry
        .register(tok("family.strict.guide"), PrivacyTier::Public, None, None)
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (RegistryEvent::Registered, "family.safe.guide".to_string(), PrivacyTier::Public),
            (RegistryEvent::Revoked, "family.safe.guide".to_string(), PrivacyTier::Revoked),
        ]
    );
}
