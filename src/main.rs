// src/main.rs

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use asksql::config::AskConfig;
use asksql::db::{self, PgQueryExecutor};
use asksql::llm::GeminiClient;
use asksql::pipeline::AskPipeline;
use asksql::schema::SchemaCache;
use asksql::server::{self, AppState};

#[derive(Parser)]
#[command(name = "asksql")]
#[command(about = "Answer natural-language questions about a PostgreSQL database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Override DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Override GEMINI_MODEL
    #[arg(long, global = true)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override ASKSQL_HOST
        #[arg(long)]
        host: Option<String>,

        /// Override ASKSQL_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Answer a single question and print the result
    Ask {
        /// The question, in plain language
        question: String,
    },
    /// Print the schema text given to the model
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AskConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(model) = cli.model {
        config.gemini_model = model;
    }

    init_logging(&config, cli.debug);

    match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Command::Ask { question } => ask(config, &question).await,
        Command::Schema => print_schema(config).await,
    }
}

fn init_logging(config: &AskConfig, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connect to the database, load the schema once and wire the pipeline.
async fn build_pipeline(config: &AskConfig) -> Result<AskPipeline> {
    config.validate()?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    info!("Database connected");

    let snapshot = db::load_snapshot(&pool, &config.db_schema).await;
    let schema = Arc::new(SchemaCache::new(snapshot));

    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_base_url,
        config.gemini_timeout(),
    )?;
    let executor = PgQueryExecutor::new(pool, config.statement_timeout_ms);

    Ok(AskPipeline::new(Arc::new(llm), Arc::new(executor), schema, &config.gemini_model)
        .with_max_result_chars(config.max_result_chars))
}

async fn serve(config: AskConfig) -> Result<()> {
    info!("Starting asksql (model: {})", config.gemini_model);

    let pipeline = Arc::new(build_pipeline(&config).await?);
    if !pipeline.schema().is_loaded() {
        tracing::warn!("Serving without a schema; every question will fail until restart");
    }

    let state = AppState::new(pipeline, config.request_timeout());
    server::run(&config.bind_address(), state).await
}

async fn ask(config: AskConfig, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Prompt is required");
    }

    let pipeline = build_pipeline(&config).await?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match pipeline.ask(question, &cancel).await {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(failure) => anyhow::bail!(failure.caller_outcome().message()),
    }
}

async fn print_schema(config: AskConfig) -> Result<()> {
    let pool = db::create_pool(&config.database_url, 1).await?;
    let columns = db::load_schema(&pool, &config.db_schema).await?;
    println!("{}", asksql::schema::format_schema(&columns));
    Ok(())
}
