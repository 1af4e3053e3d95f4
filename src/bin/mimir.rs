//! mimir: artifact generation runner
//!
//! Runs one generation and prints the resulting bundle as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mimir::cache::{CacheStore, FileStore, MemoryStore};
use mimir::version::BuildInfo;
use mimir::{Complexity, Config, GenerationRequest, Mimir, ModelTier, ProjectFacts};

/// Mimir artifact generator
#[derive(Parser)]
#[command(name = "mimir")]
#[command(version = mimir::PKG_VERSION)]
#[command(about = "Generate coding-assistant agents, skills and a project summary")]
struct Args {
    /// What the user wants to achieve
    #[arg(short, long)]
    goal: String,

    /// Opaque fingerprint of the project's current state
    #[arg(short, long)]
    fingerprint: String,

    /// Agent to generate (repeatable)
    #[arg(short, long = "agent")]
    agents: Vec<String>,

    /// Skill to generate (repeatable)
    #[arg(short, long = "skill")]
    skills: Vec<String>,

    /// Mark an item as complex, allowing a more capable tier (repeatable)
    #[arg(long = "complex")]
    complex: Vec<String>,

    /// Skip the project summary
    #[arg(long)]
    no_summary: bool,

    /// Highest model tier to use: fast, balanced or capable
    #[arg(long)]
    ceiling: Option<ModelTier>,

    /// Project facts JSON (default: cached facts for the fingerprint)
    #[arg(long)]
    facts: Option<PathBuf>,

    /// Config file (default: ~/.mimir/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override template directory
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Cache directory (default: ~/.cache/mimir/artifacts)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Do not call the generation service even if an API key is set
    #[arg(long)]
    offline: bool,

    /// Pretty-print the bundle
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    tracing::debug!(build = %BuildInfo::current(), "mimir starting");
    let config = Config::load(args.config.as_deref())?;

    let cache_config = config.cache.to_cache_config();
    let cache = if config.cache.memory_only && args.cache_dir.is_none() {
        CacheStore::new(Arc::new(MemoryStore::new()), cache_config)
    } else {
        let dir = args
            .cache_dir
            .clone()
            .or_else(|| config.cache.dir.clone())
            .unwrap_or_else(FileStore::default_dir);
        CacheStore::new(Arc::new(FileStore::new(dir)), cache_config)
    };

    let facts = match &args.facts {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read facts file {}: {e}", path.display()))?;
            let facts: ProjectFacts = serde_json::from_str(&raw)?;
            cache.set_facts(&args.fingerprint, &facts).await;
            facts
        }
        None => match cache.get_facts(&args.fingerprint).await {
            Some(facts) => facts,
            None => {
                tracing::warn!(
                    fingerprint = args.fingerprint.as_str(),
                    "no facts given or cached, generating without project facts"
                );
                ProjectFacts::default()
            }
        },
    };

    let mut builder = Mimir::builder().config(&config).cache(cache);
    if let Some(dir) = &args.templates {
        builder = builder.override_dir(dir);
    }
    if args.offline {
        builder = builder.offline();
    }
    let coordinator = builder.build()?;

    let mut request = GenerationRequest::builder(args.goal, args.fingerprint)
        .agents(args.agents)
        .skills(args.skills)
        .summary(!args.no_summary)
        .ceiling(args.ceiling.unwrap_or(config.engine.ceiling))
        .facts(facts);
    for name in args.complex {
        request = request.complexity(name, Complexity::High);
    }
    let request = request.build();

    let bundle = coordinator.run(&request).await?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&bundle)?
    } else {
        serde_json::to_string(&bundle)?
    };
    println!("{json}");
    Ok(())
}
