//! Agri-Sarthi — WhatsApp agricultural advisory backend.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod routes;
mod state;

use cli::{Cli, Command};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Serve => serve(&cli).await,
        Command::Etl => run_etl(&cli),
        Command::Index => rebuild_index(&cli),
        Command::Text {
            message,
            from_number,
            location,
            url,
        } => client::send_text(url, message, from_number, location).await,
        Command::Audio {
            file,
            from_number,
            location,
            url,
        } => client::send_audio(url, file, from_number, location).await,
    }
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let config = sarthi_core::SarthiConfig::from_env(&cli.data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::from_config(config)?);
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Agri-Sarthi listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_etl(cli: &Cli) -> anyhow::Result<()> {
    let config = sarthi_core::SarthiConfig::from_env(&cli.data_dir)?;
    let store = sarthi_store::KnowledgeStore::open(&config.data_paths.knowledge_db)?;
    let report = sarthi_store::run_etl(&store)?;
    println!(
        "Loaded {} crop, {} soil, {} pest and {} scheme rows into {}",
        report.crops,
        report.soils,
        report.pests,
        report.schemes,
        config.data_paths.knowledge_db.display()
    );
    Ok(())
}

fn rebuild_index(cli: &Cli) -> anyhow::Result<()> {
    let config = sarthi_core::SarthiConfig::from_env(&cli.data_dir)?;
    let store = sarthi_store::KnowledgeStore::open(&config.data_paths.knowledge_db)?;
    let embedder = sarthi_infer::create_embedder(&config.data_paths.model_dir);
    let collection = sarthi_index::VectorCollection::open(
        &config.data_paths.vectordb,
        &config.collection_name,
        config.embedding_dim,
    )?;

    let report = sarthi_index::rebuild_index(&store, &collection, embedder.as_ref())?;
    println!(
        "Indexed {} documents from {} tables into {}",
        report.documents,
        report.tables,
        collection.db_path().display()
    );
    Ok(())
}
