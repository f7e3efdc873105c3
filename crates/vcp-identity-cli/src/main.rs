//! VCP Identity CLI: the `vcpi` command.
//!
//! Parses identity tokens, evaluates wildcard patterns, and manages a
//! registry snapshot on disk.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use vcp_identity::registry::infer_privacy_tier;
use vcp_identity::storage::{load_registry, save_registry};
use vcp_identity::time::micros_to_rfc3339;
use vcp_identity::token::infer_namespace_tier;
use vcp_identity::{
    commit, Authorization, OwnershipProof, OwnershipSecret, Pattern, PrivacyTier, Registry,
    RegistryConfig, RegistryEntry, Token,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_registry_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --registry")?;
    Ok(PathBuf::from(home).join(".vcp").join("registry.json"))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// VCP identity CLI: parse tokens, register them with a privacy tier, and
/// query the registry.
#[derive(Parser, Debug)]
#[command(
    name = "vcpi",
    about = "VCP identity token CLI",
    version,
    long_about = "vcpi: VCP identity token CLI\n\nParse hierarchical identity tokens, register them under privacy tiers,\nand run wildcard queries that redact what the caller may not see."
)]
struct Cli {
    /// Registry snapshot file (default: ~/.vcp/registry.json)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Registry host used for token URIs
    #[arg(long, global = true)]
    host: Option<String>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a token and show its parts
    Parse {
        /// Token, e.g. company.acme.legal.compliance@1.0.0:SEC
        token: String,
    },

    /// Test whether a token matches a pattern
    Match {
        /// Pattern, e.g. company.acme.**
        pattern: String,
        /// Token to test
        token: String,
    },

    /// Register a token
    Register {
        token: String,

        /// Privacy tier (public, organizational, community, personal,
        /// pseudonymous). Inferred from the domain when omitted.
        #[arg(long)]
        tier: Option<String>,

        /// Organization scope for organizational entries
        #[arg(long)]
        org: Option<String>,

        /// Owner secret (hex) for pseudonymous entries
        #[arg(long)]
        secret: Option<String>,
    },

    /// Find tokens matching a pattern
    Find {
        pattern: String,

        /// Organization membership (repeatable)
        #[arg(long)]
        org: Vec<String>,

        /// Role tag (repeatable)
        #[arg(long)]
        role: Vec<String>,

        /// Ownership secret (hex) for pseudonymous entries (repeatable)
        #[arg(long)]
        secret: Vec<String>,

        /// Maximum number of tokens to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Probe the existence index for a token (advisory)
    Exists { token: String },

    /// Revoke a registered token
    Revoke { token: String },

    /// Show every registration of a token, oldest first
    History { token: String },

    /// Show registry statistics
    Stats,

    /// Generate a new ownership secret
    Secret,

    /// Compute the owner commitment for a token
    Commit {
        token: String,

        /// Owner secret (hex)
        #[arg(long)]
        secret: String,
    },
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let host = cli.host.clone();
    let registry_path = match cli.registry.clone() {
        Some(p) => p,
        None => default_registry_path()?,
    };
    log::debug!("registry snapshot: {}", registry_path.display());

    match cli.command {
        Commands::Parse { token } => cmd_parse(&registry_path, &token, host.as_deref(), json),
        Commands::Match { pattern, token } => cmd_match(&pattern, &token, json),
        Commands::Register {
            token,
            tier,
            org,
            secret,
        } => cmd_register(
            &registry_path,
            host.as_deref(),
            &token,
            tier.as_deref(),
            org,
            secret.as_deref(),
            json,
        ),
        Commands::Find {
            pattern,
            org,
            role,
            secret,
            limit,
        } => cmd_find(&registry_path, &pattern, org, role, &secret, limit, json),
        Commands::Exists { token } => cmd_exists(&registry_path, &token, json),
        Commands::Revoke { token } => cmd_revoke(&registry_path, &token, json),
        Commands::History { token } => cmd_history(&registry_path, &token, json),
        Commands::Stats => cmd_stats(&registry_path, json),
        Commands::Secret => cmd_secret(json),
        Commands::Commit { token, secret } => cmd_commit(&token, &secret, json),
    }
}

// ── Registry helpers ──────────────────────────────────────────────────────────

/// Load the snapshot, or start an empty registry if none exists yet.
/// `host` overrides the snapshot's registry host.
fn open_registry(path: &Path, host: Option<&str>) -> Result<Registry> {
    if !path.exists() {
        let mut config = RegistryConfig::default();
        if let Some(h) = host {
            config = config.with_registry_host(h);
        }
        return Ok(Registry::with_config(config));
    }

    let registry = load_registry(path)
        .with_context(|| format!("failed to load registry {}", path.display()))?;
    match host {
        Some(h) if h != registry.config().registry_host => {
            let config = registry.config().clone().with_registry_host(h);
            Ok(Registry::from_entries(config, registry.entries())?)
        }
        _ => Ok(registry),
    }
}

fn persist(registry: &Registry, path: &Path) -> Result<()> {
    save_registry(registry, path)
        .with_context(|| format!("failed to save registry {}", path.display()))
}

fn parse_tier(raw: &str) -> Result<PrivacyTier> {
    let tier: PrivacyTier = raw
        .parse()
        .map_err(|_| anyhow!("unknown tier '{raw}'"))?;
    if tier == PrivacyTier::Revoked {
        return Err(anyhow!("use `vcpi revoke` to revoke a token"));
    }
    Ok(tier)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_entry(entry: &RegistryEntry) {
    println!("  {:<6} {}", entry.id, entry.token);
    println!("         tier:       {}", entry.privacy_tier);
    println!("         state:      {:?}", entry.state);
    println!(
        "         registered: {}",
        micros_to_rfc3339(entry.registered_at)
    );
    if let Some(org) = &entry.org_scope {
        println!("         org scope:  {org}");
    }
    if let Some(c) = &entry.owner_commitment {
        println!("         commitment: {}", c.to_hex());
    }
}

// ── Command implementations ───────────────────────────────────────────────────

fn cmd_parse(path: &Path, raw: &str, host: Option<&str>, json: bool) -> Result<()> {
    let token = Token::parse(raw)?;
    let host = open_registry(path, host)?.config().registry_host.clone();
    let host = host.as_str();
    let namespace_tier = infer_namespace_tier(&token);
    let suggested_tier = infer_privacy_tier(&token);

    if json {
        return print_json(&json!({
            "canonical": token.canonical(),
            "full": token.full(),
            "domain": token.domain(),
            "path": token.path(),
            "approach": token.approach(),
            "role": token.role(),
            "depth": token.depth(),
            "version": token.version().map(ToString::to_string),
            "namespace": token.namespace(),
            "uri": token.to_uri(host),
            "namespace_tier": namespace_tier,
            "suggested_privacy_tier": suggested_tier,
        }));
    }

    println!("Token: {}", token.full());
    println!("  Canonical: {}", token.canonical());
    println!("  Domain:    {}", token.domain());
    if !token.path().is_empty() {
        println!("  Path:      {}", token.path().join("."));
    }
    println!("  Approach:  {}", token.approach());
    println!("  Role:      {}", token.role());
    println!("  Depth:     {}", token.depth());
    if let Some(v) = token.version() {
        println!("  Version:   {v}");
    }
    if let Some(ns) = token.namespace() {
        println!("  Namespace: {ns}");
    }
    println!("  URI:       {}", token.to_uri(host));
    println!("  Governance: {namespace_tier:?}");
    println!("  Suggested tier: {suggested_tier}");
    Ok(())
}

fn cmd_match(pattern: &str, raw: &str, json: bool) -> Result<()> {
    let pattern = Pattern::parse(pattern)?;
    let token = Token::parse(raw)?;
    let matched = pattern.matches(&token);

    if json {
        return print_json(&json!({
            "pattern": pattern.to_string(),
            "token": token.full(),
            "matches": matched,
        }));
    }
    if matched {
        println!("{} matches {}", token.full(), pattern);
    } else {
        println!("{} does not match {}", token.full(), pattern);
    }
    Ok(())
}

fn cmd_register(
    path: &Path,
    host: Option<&str>,
    raw: &str,
    tier: Option<&str>,
    org: Option<String>,
    secret: Option<&str>,
    json: bool,
) -> Result<()> {
    let token = Token::parse(raw)?;
    let tier = match (tier, secret) {
        (Some(t), _) => parse_tier(t)?,
        (None, Some(_)) => PrivacyTier::Pseudonymous,
        (None, None) => infer_privacy_tier(&token),
    };
    let commitment = match secret {
        Some(hex) => {
            let secret = OwnershipSecret::from_hex(hex)?;
            Some(commit(&secret, &token.canonical()))
        }
        None => None,
    };

    let registry = open_registry(path, host)?;
    let entry = registry.register(token, tier, commitment, org)?;
    persist(&registry, path)?;

    if json {
        return print_json(&entry);
    }
    println!("Registered {} at tier {}", entry.token, entry.privacy_tier);
    if let Some(prev) = entry.supersedes {
        println!("  supersedes {prev}");
    }
    Ok(())
}

fn cmd_find(
    path: &Path,
    pattern: &str,
    orgs: Vec<String>,
    roles: Vec<String>,
    secrets: &[String],
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let registry = open_registry(path, None)?;

    let mut auth = Authorization::anonymous().with_orgs(orgs);
    for role in roles {
        auth = auth.with_role(role);
    }
    for hex in secrets {
        auth = auth.with_proof(OwnershipProof::Reveal(OwnershipSecret::from_hex(hex)?));
    }

    let result = match limit {
        Some(n) => registry.find_limited(pattern, &auth, n)?,
        None => registry.find(pattern, &auth)?,
    };

    if json {
        return print_json(&result);
    }
    for token in &result.tokens {
        println!("{token}");
    }
    if result.truncated {
        println!("(more results omitted; raise --limit)");
    }
    if result.redacted_count > 0 {
        println!("{} matching token(s) redacted", result.redacted_count);
    }
    if result.is_empty() && result.redacted_count == 0 {
        println!("No matches for {pattern}");
    }
    Ok(())
}

fn cmd_exists(path: &Path, raw: &str, json: bool) -> Result<()> {
    let token = Token::parse(raw)?;
    let registry = open_registry(path, None)?;
    let maybe = registry.might_exist(&token);

    if json {
        return print_json(&json!({
            "token": token.canonical(),
            "might_exist": maybe,
        }));
    }
    if maybe {
        println!("{} may be registered", token.canonical());
    } else {
        println!("{} is not registered", token.canonical());
    }
    Ok(())
}

fn cmd_revoke(path: &Path, raw: &str, json: bool) -> Result<()> {
    let token = Token::parse(raw)?;
    let registry = open_registry(path, None)?;
    let entry = registry.revoke(&token)?;
    persist(&registry, path)?;

    if json {
        return print_json(&entry);
    }
    println!("Revoked {}", entry.token);
    Ok(())
}

fn cmd_history(path: &Path, raw: &str, json: bool) -> Result<()> {
    let token = Token::parse(raw)?;
    let registry = open_registry(path, None)?;
    let history = registry.history(&token);

    if json {
        return print_json(&history);
    }
    if history.is_empty() {
        println!("No registrations for {}", token.full());
        return Ok(());
    }
    println!("History for {} ({} entries):", token.full(), history.len());
    for entry in &history {
        print_entry(entry);
    }
    Ok(())
}

fn cmd_stats(path: &Path, json: bool) -> Result<()> {
    let registry = open_registry(path, None)?;
    let stats = registry.stats();

    if json {
        return print_json(&stats);
    }
    println!("Registry: {}", path.display());
    println!("  Entries:         {}", stats.entries);
    println!("  Active:          {}", stats.active);
    println!("  Superseded:      {}", stats.superseded);
    println!("  Canonical paths: {}", stats.canonical_paths);
    println!("  Trie nodes:      {}", stats.trie_nodes);
    println!(
        "  Existence index: {} bits, {} hashes, capacity {}, est. fp {:.4}",
        stats.existence_bits,
        stats.existence_hashes,
        stats.existence_capacity,
        stats.existence_estimated_fp_rate
    );
    Ok(())
}

fn cmd_secret(json: bool) -> Result<()> {
    let secret = OwnershipSecret::generate();
    if json {
        return print_json(&json!({ "secret": secret.to_hex() }));
    }
    println!("{}", secret.to_hex());
    eprintln!("Keep this secret; it is the only way to see your pseudonymous entries.");
    Ok(())
}

fn cmd_commit(raw: &str, secret: &str, json: bool) -> Result<()> {
    let token = Token::parse(raw)?;
    let secret = OwnershipSecret::from_hex(secret)?;
    let commitment = commit(&secret, &token.canonical());

    if json {
        return print_json(&json!({
            "token": token.canonical(),
            "commitment": commitment.to_hex(),
        }));
    }
    println!("{}", commitment.to_hex());
    Ok(())
}
