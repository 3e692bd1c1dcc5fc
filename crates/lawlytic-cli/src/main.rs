mod analyze;
mod display;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use lawlytic_ai::{GeminiClient, RetryPolicy, SchedulerConfig};
use lawlytic_core::defaults;
use lawlytic_service::{DocumentService, ServiceConfig};
use lawlytic_store::{BlobStore, FsBlobStore, MemoryBlobStore, open_document_store};
use tracing_subscriber::EnvFilter;

/// Clause-by-clause risk analysis for legal documents.
#[derive(Parser, Debug)]
#[command(name = "lawlytic", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Print JSON instead of the card view
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Config {
    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Generative model name
    #[arg(long, env = "LAWLYTIC_MODEL", default_value = defaults::DEFAULT_MODEL, global = true)]
    model: String,

    /// DuckDB database file
    #[arg(long, env = "LAWLYTIC_DB", default_value = "lawlytic.duckdb", global = true)]
    db: PathBuf,

    /// Directory for original uploaded files
    #[arg(long, env = "LAWLYTIC_BLOB_DIR", default_value = "lawlytic-blobs", global = true)]
    blob_dir: PathBuf,

    /// Keep everything in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Clauses per model request
    #[arg(long, env = "LAWLYTIC_BATCH_SIZE", default_value_t = defaults::BATCH_SIZE, global = true)]
    batch_size: usize,

    /// Batch requests in flight at once
    #[arg(long, env = "LAWLYTIC_MAX_CONCURRENCY", default_value_t = defaults::MAX_CONCURRENCY, global = true)]
    max_concurrency: usize,

    /// Model attempts per batch before falling back
    #[arg(long, env = "LAWLYTIC_MAX_RETRIES", default_value_t = defaults::MAX_RETRIES, global = true)]
    max_retries: u32,

    /// Delay before each admitted batch request, in milliseconds
    #[arg(long, env = "LAWLYTIC_PACING_MS", default_value_t = defaults::PACING.as_millis() as u64, global = true)]
    pacing_ms: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a document and store the result
    Analyze {
        /// Plain text (.txt) or PDF file
        file: PathBuf,

        /// Owner the document is stored under
        #[arg(long, env = "LAWLYTIC_OWNER", default_value = "local")]
        owner: String,

        /// MIME type, if the extension does not say
        #[arg(long)]
        content_type: Option<String>,
    },

    /// List an owner's documents, newest first
    #[command(alias = "ls")]
    List {
        #[arg(long, env = "LAWLYTIC_OWNER", default_value = "local")]
        owner: String,
    },

    /// Show a stored document
    Show {
        id: String,

        /// List every clause, not just flagged ones
        #[arg(long)]
        clauses: bool,
    },

    /// Ask a question about a stored document
    Chat {
        id: String,

        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Generate and store a document's timeline
    Timeline { id: String },
}

impl Command {
    fn needs_model(&self) -> bool {
        matches!(
            self,
            Self::Analyze { .. } | Self::Chat { .. } | Self::Timeline { .. }
        )
    }
}

impl Config {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            },
            scheduler: SchedulerConfig {
                batch_size: self.batch_size,
                max_concurrency: self.max_concurrency,
                pacing: Duration::from_millis(self.pacing_ms),
            },
        }
    }

    fn build_service(&self, needs_model: bool) -> anyhow::Result<DocumentService> {
        let api_key = match (&self.api_key, needs_model) {
            (Some(key), _) => key.clone(),
            (None, true) => bail!("GOOGLE_API_KEY is not set (pass --api-key or add it to .env)"),
            (None, false) => String::new(),
        };
        let gateway = Arc::new(
            GeminiClient::new(api_key, self.model.clone()).context("building Gemini client")?,
        );

        let (store, blobs): (_, Arc<dyn BlobStore>) = if self.ephemeral {
            (open_document_store(None), Arc::new(MemoryBlobStore::new()))
        } else {
            (
                open_document_store(Some(&self.db)),
                Arc::new(FsBlobStore::new(&self.blob_dir)),
            )
        };
        tracing::debug!(backend = store.backend(), "document store selected");

        Ok(DocumentService::new(
            gateway,
            store,
            blobs,
            self.service_config(),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("lawlytic v{}", env!("CARGO_PKG_VERSION"));

    let service = cli.config.build_service(cli.command.needs_model())?;

    match cli.command {
        Command::Analyze {
            file,
            owner,
            content_type,
        } => {
            let stats =
                analyze::run_analyze(&service, &file, &owner, content_type.as_deref()).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats.outcome)?);
            } else {
                eprintln!(
                    "  Analysed {} clauses from {} ({} bytes) in {:.1}s",
                    stats.outcome.analysis.len(),
                    stats.file_name,
                    stats.bytes,
                    stats.elapsed_secs
                );
                let record = service
                    .get(&stats.outcome.document_id)
                    .await
                    .context("reading back stored document")?;
                display::print_document_card(&record, false);
            }
        }
        Command::List { owner } => {
            let summaries = service.list(&owner).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                display::print_summaries(&summaries);
            }
        }
        Command::Show { id, clauses } => {
            let record = service.get(&id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                display::print_document_card(&record, clauses);
            }
        }
        Command::Chat { id, question } => {
            let answer = service.chat(&id, &question.join(" ")).await?;
            if cli.json {
                println!("{}", serde_json::json!({ "answer": answer }));
            } else {
                println!("{answer}");
            }
        }
        Command::Timeline { id } => {
            let events = service.timeline(&id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                display::print_timeline(&events);
            }
        }
    }

    Ok(())
}
