use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ragdex::{list_indexes, ExtractiveGenerator, HashingEmbedder, RagPipeline, Settings};

#[derive(Parser)]
#[command(name = "ragdex")]
#[command(version = "0.1")]
#[command(about = "Ask questions about uploaded text documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed and index a .txt file
    Ingest {
        file: PathBuf,
        /// Index name; a UUID is generated when omitted
        #[arg(long)]
        name: Option<String>,
    },
    /// Answer a question from an index
    Query {
        name: String,
        question: String,
        #[arg(long)]
        show_prompt: bool,
    },
    /// Rank the chunks of an index against a query
    Search {
        name: String,
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
    },
    List,
    Config,
}

type Pipeline = RagPipeline<HashingEmbedder, ExtractiveGenerator>;

fn build_pipeline(settings: &Settings) -> Result<Pipeline> {
    let embedder = HashingEmbedder::new(settings.dimensions)?;
    Ok(RagPipeline::new(settings, embedder, ExtractiveGenerator::default()))
}

fn ingest_command(settings: &Settings, file: PathBuf, name: Option<String>) -> Result<()> {
    let pipeline = build_pipeline(settings)?;
    let report = pipeline
        .ingest_file(&file, name.as_deref())
        .with_context(|| format!("Failed to ingest '{}'", file.display()))?;
    log::info!("Indexed {} chunks as '{}'", report.chunks, report.request_id);

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn query_command(settings: &Settings, name: &str, question: &str, show_prompt: bool) -> Result<()> {
    let pipeline = build_pipeline(settings)?;
    let answer = pipeline
        .answer(name, question)
        .with_context(|| format!("Failed to answer from index '{}'", name))?;

    let mut output = serde_json::json!({
        "response": answer.response,
        "sources": answer.sources.iter().map(|hit| {
            serde_json::json!({
                "similarity": hit.similarity,
                "text": hit.document.text,
                "metadata": hit.metadata,
            })
        }).collect::<Vec<_>>(),
    });
    if show_prompt {
        output["prompt"] = serde_json::Value::String(answer.prompt);
    }

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn search_command(settings: &Settings, name: &str, query: &str, top_k: Option<usize>) -> Result<()> {
    let pipeline = build_pipeline(settings)?;
    let top_k = top_k.unwrap_or(settings.top_k);
    let results = pipeline
        .search(name, query, top_k)
        .with_context(|| format!("Failed to search index '{}'", name))?;

    let output = serde_json::json!({
        "query": query,
        "results": results.iter().map(|hit| {
            serde_json::json!({
                "position": hit.position,
                "similarity": hit.similarity,
                "text": hit.document.text,
                "metadata": hit.metadata,
            })
        }).collect::<Vec<_>>(),
        "actual_results_count": results.len(),
        "requested_results_count": top_k
    });

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn list_command(settings: &Settings) -> Result<()> {
    for name in list_indexes(&settings.storage_root)? {
        println!("{}", name);
    }
    Ok(())
}

fn config_command(settings: &Settings) -> Result<()> {
    settings.print_config();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    let settings = Settings::load()?;

    match args.command {
        Commands::Ingest { file, name } => ingest_command(&settings, file, name)?,
        Commands::Query {
            name,
            question,
            show_prompt,
        } => query_command(&settings, &name, &question, show_prompt)?,
        Commands::Search { name, query, top_k } => search_command(&settings, &name, &query, top_k)?,
        Commands::List => list_command(&settings)?,
        Commands::Config => config_command(&settings)?,
    }
    Ok(())
}
