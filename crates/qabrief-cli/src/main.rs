//! qabrief - QA briefing CLI
//!
//! Turns tickets into model briefings and model replies into test steps and
//! comment documents.
//!
//! ## Commands
//!
//! - `simplify`: Flatten a ticket payload into a briefing
//! - `parse-steps`: Normalise a model reply into test steps
//! - `render`: Render a labelled summary reply as a comment document
//! - `extract`: Flatten a document to plain text
//! - `fetch`: Fetch and simplify a live ticket
//! - `comment`: Render a summary reply and post it on a ticket
//! - `validate`: Run the full validation pipeline for a ticket

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qabrief_agent::{
    JiraClient, OpenAiClient, OpenAiConfig, SimulatedExecutor, TicketService, ValidationPipeline,
};
use qabrief_core::{extract_text, parse_test_steps, render_summary, simplify_issue, Node};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "qabrief")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "QA briefings from tickets, test steps and feedback from model replies", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a ticket payload (JSON) into a briefing
    Simplify {
        /// Path to the ticket payload, or `-` for stdin
        path: PathBuf,

        /// Print only the model prompt
        #[arg(long)]
        prompt_only: bool,
    },

    /// Normalise a model reply into test steps
    ParseSteps {
        /// Path to the raw reply, or `-` for stdin
        path: PathBuf,
    },

    /// Render a labelled summary reply as a comment document
    Render {
        /// Path to the raw reply, or `-` for stdin
        path: PathBuf,
    },

    /// Flatten a document (JSON) to plain text
    Extract {
        /// Path to the document, or `-` for stdin
        path: PathBuf,
    },

    /// Fetch and simplify a live ticket
    Fetch {
        /// Ticket key, e.g. QA-7
        key: String,

        /// Print only the model prompt
        #[arg(long)]
        prompt_only: bool,
    },

    /// Render a summary reply and post it as a comment
    Comment {
        /// Ticket key
        key: String,

        /// Path to the raw reply, or `-` for stdin
        path: PathBuf,
    },

    /// Run the full validation pipeline for a ticket
    Validate {
        /// Ticket key
        key: String,

        /// Model name override
        #[arg(long, env = "OPENAI_MODEL")]
        model: Option<String>,

        /// Application URL the steps target
        #[arg(long, env = "QABRIEF_TARGET_URL")]
        target_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    qabrief_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Simplify { path, prompt_only } => {
            let payload = read_json(&path)?;
            println!("{}", simplify_output(&payload, prompt_only)?);
            Ok(())
        }
        Commands::ParseSteps { path } => {
            println!("{}", parse_steps_output(&read_input(&path)?)?);
            Ok(())
        }
        Commands::Render { path } => {
            println!("{}", render_output(&read_input(&path)?)?);
            Ok(())
        }
        Commands::Extract { path } => {
            println!("{}", extract_output(&read_json(&path)?));
            Ok(())
        }
        Commands::Fetch { key, prompt_only } => cmd_fetch(&key, prompt_only).await,
        Commands::Comment { key, path } => cmd_comment(&key, &path).await,
        Commands::Validate {
            key,
            model,
            target_url,
        } => cmd_validate(&key, model, target_url).await,
    }
}

/// Read a file, or stdin when `path` is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = read_input(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn simplify_output(payload: &Value, prompt_only: bool) -> Result<String> {
    let issue = simplify_issue(payload).context("Failed to simplify ticket")?;
    if prompt_only {
        Ok(issue.prompt)
    } else {
        to_pretty(&issue)
    }
}

fn parse_steps_output(reply: &str) -> Result<String> {
    to_pretty(&parse_test_steps(reply))
}

fn render_output(reply: &str) -> Result<String> {
    to_pretty(&render_summary(reply))
}

fn extract_output(document: &Value) -> String {
    extract_text(&Node::from_value(document))
}

async fn cmd_fetch(key: &str, prompt_only: bool) -> Result<()> {
    let client = JiraClient::from_env().context("Ticketing service is not configured")?;
    let payload = client
        .fetch_issue(key)
        .await
        .with_context(|| format!("Failed to fetch {}", key))?;
    println!("{}", simplify_output(&payload, prompt_only)?);
    Ok(())
}

async fn cmd_comment(key: &str, path: &Path) -> Result<()> {
    let client = JiraClient::from_env().context("Ticketing service is not configured")?;
    let document = render_summary(&read_input(path)?);
    let created = client
        .post_comment(key, &document)
        .await
        .with_context(|| format!("Failed to post comment on {}", key))?;

    let id = created.get("id").and_then(Value::as_str).unwrap_or("?");
    info!(key = %key, comment_id = %id, "comment posted");
    println!("Posted comment {} on {}", id, key);
    Ok(())
}

async fn cmd_validate(key: &str, model: Option<String>, target_url: Option<String>) -> Result<()> {
    let tickets = JiraClient::from_env().context("Ticketing service is not configured")?;

    let mut model_config = OpenAiConfig::from_env().context("Language model is not configured")?;
    if let Some(model) = model {
        model_config = model_config.with_model(model);
    }
    let language_model = OpenAiClient::new(model_config)?;

    let mut executor = SimulatedExecutor::new();
    if let Some(url) = target_url {
        executor = executor.with_target_url(url);
    }

    let pipeline = ValidationPipeline::new(
        Arc::new(tickets),
        Arc::new(language_model),
        Arc::new(executor),
    );
    let report = pipeline
        .run(key)
        .await
        .with_context(|| format!("Validation of {} failed", key))?;
    println!("{}", to_pretty(&report)?);
    Ok(())
}
