use std::sync::Arc;

use roombook_api::config::ApiConfig;
use roombook_auth::{CredentialStore, UserStore};
use roombook_infra::{InMemoryUserStore, PostgresUserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    let config = ApiConfig::from_env()?;
    roombook_observability::init(config.log_format);

    let (store, credentials): (Arc<dyn UserStore>, Arc<dyn CredentialStore>) = match &config.database_url {
        Some(url) => {
            let store = PostgresUserStore::connect(url).await?;
            store.ensure_schema().await?;
            let store = Arc::new(store);
            (store.clone(), store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using seeded in-memory user store");
            let store = Arc::new(InMemoryUserStore::with_default_seed());
            (store.clone(), store)
        }
    };

    let app = roombook_api::app::build_app(&config, store, credentials);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, freeze_policy = ?config.freeze_policy, token_ttl_secs = config.token_ttl.num_seconds(), "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
