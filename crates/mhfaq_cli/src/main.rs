use anyhow::Result;
use clap::{Parser, Subcommand};
use mhfaq_core::{
    FaqError, LoaderConfig, ModelLoader, QueryOutcome, QueryService, DEFAULT_TOP_K,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Scores above this are shown as the primary answer in chat mode.
const CHAT_CONFIDENCE: f32 = 0.5;
/// Runner-up matches above this are offered as "did you also mean".
const SUGGESTION_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Parser)]
#[command(name = "mhfaq")]
#[command(about = "Mental health FAQ retrieval CLI")]
struct Cli {
    /// FAQ corpus CSV (Questions, Answers, optional category columns).
    #[arg(long, global = true, default_value = "processed_faq.csv")]
    corpus: PathBuf,

    /// MiniLM safetensors weights. Without --model-path and
    /// --tokenizer-path the deterministic hash encoder is used.
    #[arg(long, global = true)]
    model_path: Option<PathBuf>,

    /// tokenizer.json matching the model.
    #[arg(long, global = true)]
    tokenizer_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Answer a single question and print the ranked matches.
    Query {
        #[arg(long)]
        question: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: i64,
        #[arg(long, default_value_t = 0.0)]
        min_score: f64,
    },
    /// Interactive question loop; type 'quit' to exit.
    Chat,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let loader = Arc::new(ModelLoader::new(LoaderConfig {
        corpus_path: cli.corpus,
        model_path: cli.model_path,
        tokenizer_path: cli.tokenizer_path,
    }));
    let service = QueryService::new(loader);

    match cli.command {
        Commands::Query {
            question,
            top_k,
            min_score,
        } => {
            let outcome = service.answer(&question, top_k, min_score)?;
            print_outcome(&outcome);
        }
        Commands::Chat => chat_loop(&service)?,
    }

    Ok(())
}

fn print_outcome(outcome: &QueryOutcome) {
    if let Some(message) = &outcome.message {
        println!("note: {message}");
    }
    for (i, m) in outcome.matches.iter().enumerate() {
        println!(
            "{}. [{}] {} (confidence {:.1}%)",
            i + 1,
            m.category,
            m.question,
            m.score * 100.0
        );
        println!("{}\n", m.answer);
    }
}

fn chat_loop(service: &QueryService) -> Result<()> {
    println!("FAQ Bot is ready! Type 'quit' to exit.");
    println!("{}", "-".repeat(50));

    let stdin = std::io::stdin();
    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\nBot: Goodbye!");
            return Ok(());
        }
        let query = line.trim();

        if query.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            return Ok(());
        }
        if query.is_empty() {
            continue;
        }

        match service.answer(query, DEFAULT_TOP_K, 0.0) {
            Ok(outcome) => print_chat_answer(&outcome),
            Err(FaqError::Unavailable(reason)) => {
                println!("\nBot: The FAQ model is unavailable ({reason}).");
                return Ok(());
            }
            Err(err) => println!("\nBot: Sorry, I encountered an error: {err}"),
        }
    }
}

fn print_chat_answer(outcome: &QueryOutcome) {
    let Some(best) = outcome.matches.first() else {
        println!(
            "\nFAQ Bot: I'm sorry, I don't have a good answer for that. \
             Could you try rephrasing your question?"
        );
        return;
    };

    if best.score > CHAT_CONFIDENCE {
        println!("\n{}", "=".repeat(50));
        println!(
            "FAQ Bot (Confidence: {:.1}%):\n\n{}",
            best.score * 100.0,
            best.answer
        );
        println!("{}", "=".repeat(50));

        let suggestions: Vec<_> = outcome
            .matches
            .iter()
            .skip(1)
            .filter(|m| m.score > SUGGESTION_CONFIDENCE)
            .collect();
        if !suggestions.is_empty() {
            println!("\n{}", "-".repeat(50));
            println!("Did you also mean one of these?");
            for (i, m) in suggestions.iter().enumerate() {
                println!(
                    "\n{}. {} (Confidence: {:.1}%)",
                    i + 1,
                    m.question,
                    m.score * 100.0
                );
            }
        }
    } else {
        println!(
            "\nFAQ Bot: I'm sorry, I don't have a good answer for that. \
             Could you try rephrasing your question?"
        );
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
