//! Registry walkthrough: register tokens under each privacy tier and query
//! them as different callers.
//!
//! Run with:
//!   cargo run --example registry_walkthrough -p vcp-identity

use vcp_identity::{
    commit, Authorization, OwnershipProof, OwnershipSecret, PrivacyTier, QueryResult, Registry,
    Token,
};

fn show(label: &str, result: &QueryResult) {
    println!("{label}:");
    for token in &result.tokens {
        println!("  {token}");
    }
    println!(
        "  redacted: {}  scope authorized: {}",
        result.redacted_count, result.scope_authorized
    );
    println!();
}

fn main() {
    let registry = Registry::new();

    // ── 1. Parse a token ────────────────────────────────────────────────────
    //
    // Identity is the canonical path; version and namespace ride along as
    // metadata.
    let token = Token::parse("company.acme.legal.compliance@1.0.0:SEC")
        .expect("token should parse");
    println!("Token:     {token}");
    println!("  Canonical: {}", token.canonical());
    println!("  URI:       {}", token.to_uri(&registry.config().registry_host));
    println!();

    // ── 2. Register under different tiers ───────────────────────────────────
    registry
        .register(
            Token::parse("company.acme.handbook").expect("token should parse"),
            PrivacyTier::Public,
            None,
            None,
        )
        .expect("public registration");
    registry
        .register(token, PrivacyTier::Organizational, None, Some("acme".into()))
        .expect("organizational registration");

    // Pseudonymous entries store only a commitment to the owner's secret.
    let secret = OwnershipSecret::generate();
    registry
        .register(
            Token::parse("company.acme.whistle.box").expect("token should parse"),
            PrivacyTier::Pseudonymous,
            Some(commit(&secret, "company.acme.whistle.box")),
            None,
        )
        .expect("pseudonymous registration");

    // ── 3. Query as different callers ───────────────────────────────────────
    let outsider = Authorization::anonymous();
    let member = Authorization::anonymous().with_org("acme");
    let owner = member
        .clone()
        .with_proof(OwnershipProof::Reveal(secret));

    for (label, auth) in [("Outsider", &outsider), ("Member", &member), ("Owner", &owner)] {
        let result = registry
            .find("company.acme.**", auth)
            .expect("pattern is valid");
        show(label, &result);
    }

    // ── 4. Revoke ───────────────────────────────────────────────────────────
    registry
        .revoke(&Token::parse("company.acme.handbook").expect("token should parse"))
        .expect("revocation");
    let result = registry
        .find("company.acme.**", &outsider)
        .expect("pattern is valid");
    show("Outsider after revocation", &result);

    println!("{:#?}", registry.stats());
}
