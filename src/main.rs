use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use neohealth_backend::chat::ChatAssistant;
use neohealth_backend::reference::ReferenceDataset;
use neohealth_backend::store::{PgRecordStore, PgUserStore, RecordStore, UserStore};
use neohealth_backend::{app, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(config.database_url.expose_secret())
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let assistant = ChatAssistant::from_config(store.clone(), &config)?;
    let reference = ReferenceDataset::bundled()?;
    tracing::info!(
        rows = reference.len(),
        persona = ?config.persona,
        "📚 reference dataset loaded"
    );

    let state = AppState::new(store, users, assistant, reference, config.sample_size);

    tracing::info!("🧠 Server running at {}", config.bind_addr);

    axum::serve(
        tokio::net::TcpListener::bind(config.bind_addr).await?,
        app(state).into_make_service(),
    )
    .await?;

    Ok(())
}
