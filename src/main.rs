mod batch;
mod config;
mod generation;
mod note;
mod text;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use batch::run_batch;
use config::Config;
use generation::{generate_note, GenerationLimits, HfTokenizer, HttpGenerator, TokenCodec};

/// Headless CLI for structured SOAP note generation from clinical dialogue
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the text-generation inference server
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Path to the tokenizer file (tokenizer.json)
    #[arg(short, long)]
    tokenizer: Option<PathBuf>,

    /// Input CSV with a 'dialogue' column (omit for interactive mode)
    #[arg(long)]
    input_csv: Option<PathBuf>,

    /// Output CSV path for batch mode
    #[arg(long, default_value = "preds.csv")]
    output_csv: PathBuf,

    /// Maximum input tokens per generation window
    #[arg(long)]
    max_input: Option<usize>,

    /// Maximum output tokens per chunk pass
    #[arg(long)]
    max_out: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = Config::default_config_path()?;
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        if let Err(e) = Config::default().save(&config_path) {
            warn!("Could not write default config to {:?}: {e:#}", config_path);
        }
    }
    let config = Config::load(&config_path)?;

    let endpoint = args.endpoint.unwrap_or_else(|| config.endpoint.clone());
    let tokenizer_path = match &args.tokenizer {
        Some(path) => path.clone(),
        None => config.get_tokenizer_path()?,
    };
    let limits = GenerationLimits {
        max_input_tokens: args.max_input.unwrap_or(config.max_input_tokens),
        max_output_tokens: args.max_out.unwrap_or(config.max_output_tokens),
        max_subjective_sentences: config.max_subjective_sentences,
    };

    info!("SOAP generation CLI starting...");
    info!("Endpoint: {}", endpoint);
    info!("Tokenizer: {:?}", tokenizer_path);

    if !tokenizer_path.exists() {
        error!("Tokenizer file not found: {:?}", tokenizer_path);
        eprintln!("\nTokenizer file not found: {:?}", tokenizer_path);
        eprintln!("\nCopy the tokenizer.json shipped with the generation model (e.g. from its");
        eprintln!("Hugging Face model directory) to: {:?}", tokenizer_path);
        eprintln!("Or specify a custom path with: --tokenizer /path/to/tokenizer.json");
        return Ok(());
    }

    let codec = HfTokenizer::from_file(&tokenizer_path)?;
    let generator = HttpGenerator::new(&endpoint)?;

    match generator.health().await {
        Ok(()) => info!("Inference server reachable"),
        Err(e) => warn!("Inference server health check failed: {e:#}"),
    }

    if let Some(input_csv) = &args.input_csv {
        let summary = run_batch(input_csv, &args.output_csv, &generator, &codec, &limits).await?;

        println!("\n--- Batch Summary ---");
        println!("Notes generated: {}", summary.count());
        if let Some(mean) = summary.mean_latency_ms() {
            println!("Mean latency: {}ms", mean);
        }
        if let Some(duration) = summary.duration_ms() {
            println!("Total duration: {}ms", duration);
        }
        println!("\nWrote predictions to {:?}", args.output_csv);
        return Ok(());
    }

    interactive_loop(&generator, &codec, &limits).await
}

/// Read dialogues line-by-line from stdin until a quit sentinel.
async fn interactive_loop(
    generator: &HttpGenerator,
    codec: &dyn TokenCodec,
    limits: &GenerationLimits,
) -> Result<()> {
    let stdin = std::io::stdin();

    loop {
        println!("\nPaste dialogue (or 'quit'):");

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let dialogue = line.trim();

        if matches!(dialogue.to_lowercase().as_str(), "quit" | "q" | "exit") {
            break;
        }
        if dialogue.is_empty() {
            println!("\nNo dialogue provided.");
            continue;
        }

        match generate_note(dialogue, generator, codec, limits).await {
            Ok(note) => {
                println!("\n=== SOAP output ===\n");
                println!("{note}");
                println!("\n===================");
            }
            Err(e) => {
                error!("Generation failed: {e:#}");
            }
        }
    }

    info!("Session complete");
    Ok(())
}
