use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::{error, info};
use std::io;
use std::path::Path;

use local_rag::chunking::DEFAULT_MAX_CHUNK_CHARS;
use local_rag::document::Document;
use local_rag::ollama::{OllamaClient, OllamaConfig};
use local_rag::rag::{RagEngine, RagSettings, DEFAULT_TOP_K};

/// Ask questions about a document using a local embedding and generation model
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the document to index (supports text and PDF)
    #[arg(index = 1)]
    file_path: String,

    /// Maximum chunk length in characters
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    max_chunk_chars: usize,

    /// Number of chunks passed to the model as context
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let file_path = args.file_path;

    let path = Path::new(&file_path);
    if !path.exists() {
        error!("File not found: {}", file_path);
        return Err(anyhow::anyhow!("File not found"));
    }

    let config = OllamaConfig::from_env();
    info!(
        "Using {} (embedder: {}, generator: {})",
        config.host, config.embed_model, config.generate_model
    );
    let client = OllamaClient::new(config);

    let settings = RagSettings {
        max_chunk_chars: args.max_chunk_chars,
        top_k: args.top_k,
        ..RagSettings::default()
    };
    let mut rag_engine = RagEngine::initialize(client.clone(), client, settings)
        .await
        .context("Models are not ready")?;

    let document = Document::from_file(&file_path).context("Failed to load document")?;
    info!("Document type: {}", document.mime_type);

    info!("Chunking text...");
    let count = rag_engine.load_text(&document.content);
    rag_engine
        .index_documents()
        .await
        .context("Failed to index document")?;
    println!("Indexed {} chunks from {}.", count, document.document_id);
    println!("Type 'exit' to quit.");

    rag_engine
        .run_query_loop(io::stdin().lock(), io::stdout())
        .await
        .context("Error in query loop")?;

    Ok(())
}
