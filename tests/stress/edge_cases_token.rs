//! Edge case tests: token grammar limits, pattern corner cases, and
//! privacy-tier boundaries.

use vcp_identity::token::{MAX_LENGTH, MAX_SEGMENTS, MAX_SEGMENT_LENGTH, MIN_SEGMENTS};
use vcp_identity::{
    Authorization, OwnershipProof, OwnershipSecret, Pattern, PrivacyTier, Registry,
    RegistryError, SemVer, Token,
};

fn malformed(raw: &str) -> bool {
    matches!(Token::parse(raw), Err(RegistryError::MalformedToken(_)))
}

// === Token Grammar ===

#[test]
fn edge_depth_bounds() {
    let seg = |n: usize| (0..n).map(|i| format!("s{i}")).collect::<Vec<_>>().join(".");
    assert!(malformed(&seg(MIN_SEGMENTS - 1)));
    assert!(Token::parse(&seg(MIN_SEGMENTS)).is_ok());
    assert!(Token::parse(&seg(MAX_SEGMENTS)).is_ok());
    assert!(malformed(&seg(MAX_SEGMENTS + 1)));
}

#[test]
fn edge_segment_length_bound() {
    let ok = "a".repeat(MAX_SEGMENT_LENGTH);
    let long = "a".repeat(MAX_SEGMENT_LENGTH + 1);
    assert!(Token::parse(&format!("family.{ok}.guide")).is_ok());
    assert!(malformed(&format!("family.{long}.guide")));
}

#[test]
fn edge_total_length_bound() {
    // Ten segments of 25 bytes plus nine dots is 259 bytes.
    let seg = "a".repeat(25);
    let raw = vec![seg.as_str(); 10].join(".");
    assert!(raw.len() > MAX_LENGTH);
    assert!(malformed(&raw));
}

#[test]
fn edge_segment_characters() {
    assert!(Token::parse("family.safe-mode.guide-2").is_ok());
    for raw in [
        "family.Safe.guide",
        "family.2safe.guide",
        "family.-safe.guide",
        "family.safe_mode.guide",
        "family..guide",
        "family.safe.guide.",
        ".family.safe.guide",
        "family.säfe.guide",
        "family.safe guide.x",
    ] {
        assert!(malformed(raw), "{raw:?} should be rejected");
    }
}

#[test]
fn edge_version_and_namespace_suffixes() {
    let t = Token::parse("family.safe.guide@10.0.3:GOV2").unwrap();
    assert_eq!(t.version(), Some(&SemVer::new(10, 0, 3)));
    assert_eq!(t.namespace(), Some("GOV2"));

    for raw in [
        "family.safe.guide@1.0",
        "family.safe.guide@1.0.0.0",
        "family.safe.guide@v1.0.0",
        "family.safe.guide@",
        "family.safe.guide:",
        "family.safe.guide:sec",
        "family.safe.guide:2SEC",
        "family.safe.guide:SEC@1.0.0",
    ] {
        assert!(malformed(raw), "{raw:?} should be rejected");
    }
}

#[test]
fn edge_identity_ignores_metadata() {
    let a = Token::parse("family.safe.guide@1.0.0:SEC").unwrap();
    let b = Token::parse("family.safe.guide").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.canonical(), b.canonical());
    assert_ne!(a.full(), b.full());

    let mut set = std::collections::HashSet::new();
    set.insert(a);
    assert!(!set.insert(b));
}

#[test]
fn edge_serde_rejects_malformed() {
    let ok: Token = serde_json::from_str("\"work.focus.assistant@1.2.3\"").unwrap();
    assert_eq!(serde_json::to_string(&ok).unwrap(), "\"work.focus.assistant@1.2.3\"");
    assert!(serde_json::from_str::<Token>("\"work.focus\"").is_err());
}

// === Patterns ===

#[test]
fn edge_double_star_needs_a_segment() {
    let registry = Registry::new();
    registry
        .register(Token::parse("company.acme.legal").unwrap(), PrivacyTier::Public, None, None)
        .unwrap();
    let anon = Authorization::anonymous();

    assert!(registry.find("company.acme.legal.**", &anon).unwrap().is_empty());
    assert_eq!(registry.find("company.acme.**", &anon).unwrap().tokens.len(), 1);
    assert_eq!(registry.find("company.**", &anon).unwrap().tokens.len(), 1);
}

#[test]
fn edge_pattern_depth_beyond_tokens() {
    let p = Pattern::parse("a.b.c.d.e.f.g.h.i.j.**").unwrap();
    assert_eq!(p.fixed().len(), MAX_SEGMENTS);
    let deepest = Token::parse("a.b.c.d.e.f.g.h.i.j").unwrap();
    assert!(!p.matches(&deepest));
}

// === Privacy Tiers ===

#[test]
fn edge_revoked_is_not_redacted() {
    let registry = Registry::new();
    let t = Token::parse("user.alice.notes").unwrap();
    registry
        .register(t.clone(), PrivacyTier::Personal, None, None)
        .unwrap();
    let before = registry.find("user.**", &Authorization::anonymous()).unwrap();
    assert_eq!(before.redacted_count, 1);

    registry.revoke(&t).unwrap();
    let after = registry.find("user.**", &Authorization::anonymous()).unwrap();
    assert!(after.is_empty());
    assert_eq!(after.redacted_count, 0);
    assert!(after.scope_authorized);
}

#[test]
fn edge_proof_for_other_token_does_not_open() {
    let registry = Registry::new();
    let mine = OwnershipSecret::generate();
    let theirs = OwnershipSecret::generate();
    registry
        .register(
            Token::parse("anon.mine.notes").unwrap(),
            PrivacyTier::Pseudonymous,
            Some(vcp_identity::commit(&mine, "anon.mine.notes")),
            None,
        )
        .unwrap();
    registry
        .register(
            Token::parse("anon.theirs.notes").unwrap(),
            PrivacyTier::Pseudonymous,
            Some(vcp_identity::commit(&theirs, "anon.theirs.notes")),
            None,
        )
        .unwrap();

    let auth = Authorization::anonymous().with_proof(OwnershipProof::Reveal(mine));
    let r = registry.find("anon.*.notes", &auth).unwrap();
    let canon: Vec<String> = r.tokens.iter().map(Token::canonical).collect();
    assert_eq!(canon, vec!["anon.mine.notes"]);
    assert_eq!(r.redacted_count, 1);
}

#[test]
fn edge_roles_grant_nothing() {
    let registry = Registry::new();
    registry
        .register(
            Token::parse("community.garden.rules").unwrap(),
            PrivacyTier::Community,
            None,
            None,
        )
        .unwrap();
    let auth = Authorization::anonymous()
        .with_role("admin")
        .with_role("moderator")
        .with_org("garden");
    let r = registry.find("community.**", &auth).unwrap();
    assert!(r.tokens.is_empty());
    assert_eq!(r.redacted_count, 1);
}

#[test]
fn edge_namespace_variant_cannot_disclose_stricter_path() {
    let registry = Registry::new();
    registry
        .register(
            Token::parse("user.alice.diary").unwrap(),
            PrivacyTier::Personal,
            None,
            None,
        )
        .unwrap();

    let err = registry
        .register(
            Token::parse("user.alice.diary:X").unwrap(),
            PrivacyTier::Public,
            None,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::NamespaceCollision { .. }));

    let r = registry
        .find("user.alice.**", &Authorization::anonymous())
        .unwrap();
    assert!(r.tokens.is_empty());
    assert_eq!(r.redacted_count, 1);
}
