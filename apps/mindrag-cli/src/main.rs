use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mindrag_core::config::{resolve_with_base, Config};
use mindrag_core::extract::extract_chunks;
use mindrag_embed::load_embedder;
use mindrag_engine::RetrievalEngine;
use mindrag_cli::{ask, read_history, read_mindmap, OllamaComposer};

#[derive(Parser)]
#[command(name = "mindrag")]
#[command(about = "Answer follow-up questions about a conversation mindmap")]
struct Cli {
    /// Configuration file (env overlays and APP_* variables still apply)
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the chunks extracted from a mindmap
    Chunks {
        mindmap: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Rank mindmap chunks against a question
    Query {
        mindmap: PathBuf,
        question: String,
        /// Overrides retrieval.top_k
        #[arg(long)]
        top_k: Option<usize>,
        /// JSON array of {"speaker", "text"} turns
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Retrieve context and let the chat model answer
    Ask {
        mindmap: PathBuf,
        question: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        history: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_file(&cli.config).map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let mut settings = config.settings()?;
    // Relative model directories are taken from the config file's location.
    if let Some(base) = cli.config.parent() {
        settings.embedding.model_dir = resolve_with_base(base, &settings.embedding.model_dir).display().to_string();
    }

    match cli.command {
        Command::Chunks { mindmap, json } => {
            let chunks = extract_chunks(&read_mindmap(&mindmap)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
            } else {
                for chunk in &chunks {
                    println!("{:<18} {}", chunk.id, chunk.text);
                }
            }
        }
        Command::Query { mindmap, question, top_k, history, json } => {
            let top_k = top_k.unwrap_or(settings.retrieval.top_k);
            let history = read_history(history.as_deref())?;
            let engine = RetrievalEngine::new(load_embedder(&settings.embedding)?);
            let report = engine.rebuild(&read_mindmap(&mindmap)?)?;
            info!(chunks = report.chunks, model = %engine.embedder().model_id(), "index ready");

            let context = engine.query(&question, top_k, &history)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&context)?);
            } else {
                for (rank, chunk) in context.chunks.iter().enumerate() {
                    println!("{:>2}. {:>8.4}  [{}] {}", rank + 1, chunk.distance, chunk.kind, chunk.text);
                }
            }
        }
        Command::Ask { mindmap, question, top_k, history } => {
            let top_k = top_k.unwrap_or(settings.retrieval.top_k);
            let history = read_history(history.as_deref())?;
            let composer = OllamaComposer::from_settings(&settings.composer)?;
            let doc = read_mindmap(&mindmap)?;
            info!(model = composer.model(), "answering with Ollama");
            let answer = ask(&doc, &question, top_k, history, load_embedder(&settings.embedding), &composer)?;
            println!("{answer}");
        }
    }
    Ok(())
}
