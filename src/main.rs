//! AgentDNS Node CLI
//!
//! Command-line interface for running resolver operations against a node's
//! record store and retrieval index.

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agentdns::{
    Agent, ChatClient, Cost, FastEmbedder, NodeConfig, Organization, QdrantIndex, Resolver, Result,
    RocksStore, SearchOptions, SearchPipeline,
};

#[derive(Parser)]
#[command(name = "agentdns")]
#[command(author, version, about = "AgentDNS naming and discovery node", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new node configuration
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Register a demo dataset of organizations and agents
    Seed,

    /// Resolve an agent address to its canonical record
    Resolve {
        /// Address, e.g. agentdns://acme/translator
        address: String,
    },

    /// List an organization's agents
    Children {
        /// Organization address, e.g. agentdns://acme
        address: String,

        /// Maximum number of agents to list
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search agents with a free-text query
    Search {
        /// Natural-language description of what you need
        query: String,

        /// Maximum number of results
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Register a single record from a JSON file
    Register {
        /// Path to the JSON record
        file: String,

        /// Treat the record as an organization instead of an agent
        #[arg(long)]
        organization: bool,
    },
}

/// Read a JSON record file into the given record type.
fn read_record<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| agentdns::Error::Config(format!("invalid record file {}: {}", path, e)))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wire up the resolver from configuration.
async fn build_resolver(config: &NodeConfig) -> Result<Resolver> {
    let store = Arc::new(RocksStore::open(&config.store.path)?);

    info!("Loading embedding model (downloads ~90MB on first use)...");
    let embedder = Arc::new(FastEmbedder::new(&config.embedding).await?);

    let index = Arc::new(QdrantIndex::connect(&config.index, embedder.clone()).await?);
    index.ensure_collection().await?;

    let llm = Arc::new(ChatClient::new(&config.completion)?);

    let pipeline = SearchPipeline::new(
        store.clone(),
        index.clone(),
        embedder,
        llm,
        SearchOptions {
            fusion_coeff: config.search.fusion_coeff,
        },
    );

    Ok(Resolver::new(store, index, pipeline))
}

fn load_config(path: &str) -> Result<NodeConfig> {
    if Path::new(path).exists() {
        info!("Loading configuration from: {}", path);
        NodeConfig::load(path)
    } else {
        info!("Using default configuration");
        Ok(NodeConfig::default())
    }
}

fn print_agent(agent: &Agent) {
    println!("{}", agent.address);
    println!("  name:         {}", agent.name);
    println!("  organization: {}", agent.organization);
    println!("  description:  {}", agent.description);
    println!("  endpoint:     {}", agent.endpoint);
    println!(
        "  cost:         {} {} ({})",
        agent.cost.amount, agent.cost.currency, agent.cost.model
    );
    if !agent.capabilities.is_empty() {
        println!("  capabilities: {}", agent.capabilities.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { output } => {
            info!("Initializing new node configuration at: {}", output);
            let config = NodeConfig::default();
            config.save(&output)?;
            info!("Configuration saved successfully");
        }

        Commands::Seed => {
            let config = load_config(&cli.config)?;
            let resolver = build_resolver(&config).await?;

            for organization in demo_organizations() {
                resolver.register_organization(organization).await?;
            }
            for agent in demo_agents() {
                resolver.register_agent(agent).await?;
            }
            info!("Demo dataset registered");
        }

        Commands::Resolve { address } => {
            let config = load_config(&cli.config)?;
            let resolver = build_resolver(&config).await?;

            match resolver.resolve(&address).await? {
                Some(agent) => print_agent(&agent),
                None => println!("No record for {}", address),
            }
        }

        Commands::Children { address, limit } => {
            let config = load_config(&cli.config)?;
            let resolver = build_resolver(&config).await?;

            let agents = resolver.list_children(&address, limit).await?;
            if agents.is_empty() {
                println!("No agents under {}", address);
            }
            for agent in &agents {
                print_agent(agent);
            }
        }

        Commands::Search { query, limit } => {
            let config = load_config(&cli.config)?;
            let resolver = build_resolver(&config).await?;

            let agents = resolver.search(&query, limit).await?;
            if agents.is_empty() {
                println!("No matching agents");
            }
            for (i, agent) in agents.iter().enumerate() {
                println!("#{}", i + 1);
                print_agent(agent);
            }
        }

        Commands::Register { file, organization } => {
            let config = load_config(&cli.config)?;
            let resolver = build_resolver(&config).await?;

            if organization {
                let record: Organization = read_record(&file)?;
                let address = record.address.clone();
                resolver.register_organization(record).await?;
                info!("Registered organization {}", address);
            } else {
                let record: Agent = read_record(&file)?;
                let address = record.address.clone();
                resolver.register_agent(record).await?;
                info!("Registered agent {}", address);
            }
        }
    }

    Ok(())
}

fn demo_organizations() -> Vec<Organization> {
    [
        ("acme", "Acme AI", "General-purpose AI tooling vendor"),
        ("scholarly", "Scholarly Labs", "Academic research assistants"),
        ("polyglot", "Polyglot Inc", "Language and localization services"),
    ]
    .into_iter()
    .map(|(org, name, description)| Organization {
        address: format!("agentdns://{}", org),
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

fn demo_agents() -> Vec<Agent> {
    [
        (
            "scholarly",
            "paperbot",
            "Finds and summarizes academic papers across major publication databases",
            "paper search, paper summary, academic, literature review",
            "https://api.scholarly.example/paperbot",
        ),
        (
            "polyglot",
            "translator",
            "Translates documents between more than 100 languages with localization support",
            "translation, multilingual, localization",
            "https://api.polyglot.example/translate",
        ),
        (
            "acme",
            "code-reviewer",
            "Reviews code for defects and suggests refactorings across many languages",
            "code review, refactoring, programming",
            "https://api.acme.example/code-reviewer",
        ),
        (
            "acme",
            "data-analyst",
            "Analyzes datasets with visualization, statistics and predictive modeling",
            "data analysis, visualization, statistics, forecasting",
            "https://api.acme.example/data-analyst",
        ),
        (
            "acme",
            "voice-assistant",
            "Speech recognition, transcription and speech synthesis services",
            "speech recognition, transcription, text to speech",
            "https://api.acme.example/voice",
        ),
    ]
    .into_iter()
    .map(|(org, name, description, tags, endpoint)| Agent {
        address: format!("agentdns://{}/{}", org, name),
        name: name.to_string(),
        organization: org.to_string(),
        description: description.to_string(),
        interfaces: Vec::new(),
        endpoint: endpoint.to_string(),
        cost: Cost::default(),
        capabilities: tags.split(", ").map(String::from).collect(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_register_subcommand() {
        let cli = Cli::try_parse_from(["agentdns", "register", "agent.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Register {
                organization: false,
                ..
            }
        ));

        let cli =
            Cli::try_parse_from(["agentdns", "register", "org.json", "--organization"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Register {
                organization: true,
                ..
            }
        ));
    }

    #[test]
    fn test_read_record_agent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");
        std::fs::write(
            &path,
            r#"{
                "address": "agentdns://acme/translator",
                "name": "Translator",
                "organization": "acme",
                "description": "Translates documents",
                "endpoint": "https://api.acme.example/translate"
            }"#,
        )
        .unwrap();

        let agent: Agent = read_record(path.to_str().unwrap()).unwrap();
        assert_eq!(agent.address, "agentdns://acme/translator");
    }

    #[test]
    fn test_read_record_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: Result<Agent> = read_record(path.to_str().unwrap());
        assert!(matches!(result, Err(agentdns::Error::Config(_))));
    }
}
