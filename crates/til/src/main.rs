//! Today I Learned: share, filter and vote on short facts.
//!
//! Serves the web UI backed by a hosted table store.

use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use til_store::{Categories, FACTS_TABLE, TableClient};

#[derive(Parser)]
#[command(name = "til")]
#[command(about = "Today I Learned web UI", long_about = None)]
struct Args {
    /// Base URL of the hosted table store
    #[arg(long, env = "TIL_STORE_URL")]
    store_url: String,

    /// Public API key of the table store
    #[arg(long, env = "TIL_STORE_KEY", hide_env_values = true)]
    store_key: String,

    /// Table holding the facts
    #[arg(long, env = "TIL_TABLE", default_value = FACTS_TABLE)]
    table: String,

    /// HTTP listen address
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Static files directory (logo, extra CSS)
    #[arg(long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "til=info,til_web=info,til_store=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let client = connect(&args)?;

    let categories = Arc::new(Categories::default());
    let router = til_web::create_router(
        Arc::new(client),
        categories,
        args.static_dir.as_deref(),
    );

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to listen on {}", args.listen))?;

    tracing::info!(listen = %args.listen, store = %args.store_url, table = %args.table, "til web server started");

    axum::serve(listener, router)
        .await
        .into_diagnostic()?;

    Ok(())
}

fn connect(args: &Args) -> Result<TableClient> {
    TableClient::with_table(&args.store_url, &args.store_key, &args.table)
        .into_diagnostic()
        .wrap_err("failed to configure the table store client")
}
