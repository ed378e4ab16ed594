//! statepack: inspect and warm the state-pack cache from the command line.
//!
//! ```bash
//! # Resolve a pack through manifest, cache, remote and seed
//! statepack get GA
//!
//! # Force a remote fetch
//! STATEPACK_BASE_URL=https://packs.example.org statepack get GA --force-remote
//!
//! # Cache-only read, as JSON
//! statepack --json cached GA
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use statepack::seed::{state_by_name, BundledSeed, SeedSource, STATES};
use statepack::types::{ManifestResult, PackResult, PackSource};
use statepack::{PackContext, PackOptions, PackResolver, PackStoreConfig};

#[derive(Parser)]
#[command(
    name = "statepack",
    author,
    version,
    about = "Fetch, cache and inspect state packs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Remote base URL (overrides STATEPACK_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Cache directory (overrides STATEPACK_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Use a process-local store; nothing is persisted
    #[arg(long, global = true)]
    memory: bool,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Print resolution counters to stderr when done
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the manifest
    Manifest {
        /// Refresh from the remote source even if the cached copy is fresh
        #[arg(long)]
        force: bool,
    },

    /// Resolve a state's pack
    Get {
        /// State code or full name ("GA", "new york")
        state: String,

        /// Fetch from the remote source even if the cache is fresh
        #[arg(long)]
        force_remote: bool,
    },

    /// Read a state's pack from the cache only
    Cached {
        /// State code or full name
        state: String,
    },

    /// Remove every cached pack of a state
    Clear {
        /// State code or full name
        state: String,
    },

    /// List states with bundled seed packs
    States,
}

impl Cli {
    fn config(&self) -> PackStoreConfig {
        let mut config = PackStoreConfig::from_env();
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone()).filter(|b| !b.trim().is_empty());
        }
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir = Some(cache_dir.clone());
        }
        if self.memory {
            config.memory_store = true;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,statepack=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    if let Commands::States = cli.command {
        print_states(json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let resolver = PackResolver::new(PackContext::from_config(cli.config()));

    let code = match &cli.command {
        Commands::Manifest { force } => {
            let result = resolver.get_manifest(*force).await;
            print_manifest(&result, json)?;
            exit_for(result.status.source)
        }
        Commands::Get {
            state,
            force_remote,
        } => {
            let opts = PackOptions {
                force_remote: *force_remote,
            };
            let result = resolver.get_pack(&state_code(state), opts).await;
            print_pack(&result, json)?;
            exit_for(result.status.source)
        }
        Commands::Cached { state } => {
            let result = resolver.get_cached_pack(&state_code(state));
            print_pack(&result, json)?;
            exit_for(result.status.source)
        }
        Commands::Clear { state } => {
            let state = state_code(state);
            let removed = resolver.clear_cached_pack(&state)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "state": state,
                        "removed": removed,
                    }))?
                );
            } else {
                println!("Removed {} cached pack(s) for {}", removed, state);
            }
            ExitCode::SUCCESS
        }
        Commands::States => ExitCode::SUCCESS,
    };

    if cli.metrics {
        eprintln!("{}", resolver.metrics().format_report());
    }
    Ok(code)
}

/// Accept a full state name wherever a code is expected.
fn state_code(input: &str) -> String {
    state_by_name(input)
        .map(|info| info.code.to_string())
        .unwrap_or_else(|| input.trim().to_uppercase())
}

fn exit_for(source: PackSource) -> ExitCode {
    match source {
        PackSource::None => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    }
}

fn print_pack(result: &PackResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}: {}", result.status.state, result.describe());
    if let Some(pack) = &result.pack {
        println!(
            "  domains: {}, issues: {}, authorities: {}",
            pack.domains.len(),
            pack.all_issues().count(),
            pack.authorities.len()
        );
    }
    if let Some(key) = &result.status.cache_key {
        println!("  cache key: {}", key);
    }
    if let Some(at) = result.status.last_fetched_at {
        println!("  fetched at: {}", at.to_rfc3339());
    }
    if let Some(verified) = result.status.content_verified {
        println!("  content hash: {}", if verified { "ok" } else { "MISMATCH" });
    }
    if result.status.source != PackSource::None {
        if let Some(error) = &result.status.error {
            println!("  error: {}", error);
        }
    }
    Ok(())
}

fn print_manifest(result: &ManifestResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let status = &result.status;
    let mut line = format!("manifest: {}", status.source);
    if status.is_stale == Some(true) {
        line.push_str(" (stale)");
    }
    println!("{}", line);
    if let Some(manifest) = &result.manifest {
        println!("  schema: {}", manifest.schema_version);
        for (state, entry) in &manifest.packs {
            println!("  {}: {}", state, entry.pack_version);
        }
    }
    if let Some(error) = &status.error {
        println!("  error: {}", error);
    }
    Ok(())
}

fn print_states(json: bool) -> Result<()> {
    let seed = BundledSeed::new();
    let rows: Vec<_> = STATES
        .iter()
        .map(|info| {
            let quality = if BundledSeed::is_curated(info.code) {
                "curated"
            } else {
                "baseline"
            };
            let version = seed
                .get_state_pack(info.code)
                .and_then(|p| p.get("packVersion").and_then(|v| v.as_str()).map(str::to_string))
                .unwrap_or_default();
            (info.code, info.name, quality, version)
        })
        .collect();

    if json {
        let value: Vec<_> = rows
            .iter()
            .map(|(code, name, quality, version)| {
                json!({ "code": code, "name": name, "quality": quality, "packVersion": version })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for (code, name, quality, version) in rows {
            println!("{:<3} {:<22} {:<9} {}", code, name, quality, version);
        }
    }
    Ok(())
}
