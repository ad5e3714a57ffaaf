//! Policy chat binary
//!
//! Run with: cargo run --bin policy-chat -- --document "Sample Policies.pdf"

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policy_rag::chat;
use policy_rag::config::RagConfig;
use policy_rag::generation::AnswerComposer;
use policy_rag::providers::{OllamaClient, OllamaEmbedder, OllamaLlm};
use policy_rag::retrieval::RetrievalService;

/// Ask questions about a policy document
#[derive(Parser, Debug)]
#[command(name = "policy-chat", version, about)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source document to index (overrides config)
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// Storage location for the persisted index (overrides config)
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Number of passages to retrieve per question (overrides config)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RagConfig::from_file(path)?,
        None => RagConfig::default(),
    };
    if let Some(document) = args.document {
        config.document.source_path = document;
    }
    if let Some(index) = args.index {
        config.index.storage_path = index;
    }
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
    }
    config.validate()?;

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                     Policy Chat                           ║
║        Document Q&A over a persistent vector index        ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    tracing::info!("Configuration loaded");
    tracing::info!("  - Document: {}", config.document.source_path.display());
    tracing::info!("  - Index: {}", config.index.storage_path.display());
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Top-k: {}", config.retrieval.top_k);

    // One client shared by the embedder and the LLM
    let client = Arc::new(OllamaClient::new(&config.llm)?);

    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    match client.health_check().await {
        Ok(true) => tracing::info!("Ollama is running"),
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Please start Ollama:");
            tracing::warn!("  1. Install: brew install ollama");
            tracing::warn!("  2. Start: ollama serve");
            tracing::warn!(
                "  3. Pull models: ollama pull {} && ollama pull {}",
                config.llm.embed_model,
                config.llm.generate_model
            );
        }
    }

    let embedder = Arc::new(OllamaEmbedder::from_client(
        Arc::clone(&client),
        config.llm.embedding_dimensions,
    ));
    let llm = Arc::new(OllamaLlm::from_client(
        client,
        config.llm.generate_model.clone(),
    ));

    let service = RetrievalService::open(
        &config.document.source_path,
        &config.index.storage_path,
        &config.chunking,
        config.retrieval.top_k,
        embedder,
    )
    .await?;

    let composer = AnswerComposer::new(llm);

    chat::run(&service, &composer, &config.chat).await?;

    Ok(())
}
