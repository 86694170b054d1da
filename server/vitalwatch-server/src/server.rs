use crate::config::ServerConfig;
use anyhow::Context;
use auth_identity::{PasswordService, TokenService};
use database_layer::{
    Clock, DatabasePool, HealthStore, InMemoryStore, PoolSettings, PostgresStore, SystemClock,
};
use insight_service::{create_generator, SummaryGenerator};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Instant;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HealthStore>,
    pub tokens: TokenService,
    pub passwords: PasswordService,
    /// `None` when no generation credential is configured
    pub insight: Option<Arc<dyn SummaryGenerator>>,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn HealthStore>,
        insight: Option<Arc<dyn SummaryGenerator>>,
    ) -> Self {
        let identity = config.identity_config();
        Self {
            store,
            tokens: TokenService::new(&identity),
            passwords: PasswordService::new(&identity),
            insight,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Build the store and generator described by `config`
    pub async fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let store: Arc<dyn HealthStore> = match &config.database_url {
            Some(url) => {
                let settings = PoolSettings {
                    max_connections: config.database_max_connections,
                    ..PoolSettings::default()
                };
                let pool = DatabasePool::connect(url.expose_secret(), &settings)
                    .await
                    .context("failed to connect to PostgreSQL")?;
                let store = PostgresStore::new(pool, clock);
                store.migrate().await.context("failed to apply schema")?;
                tracing::info!("Using PostgreSQL health store");
                Arc::new(store)
            }
            None => {
                tracing::warn!("No database_url configured; using the in-memory health store");
                Arc::new(InMemoryStore::new(clock))
            }
        };

        let insight = create_generator(&config.insight).context("invalid insight configuration")?;
        match &insight {
            Some(generator) => tracing::info!(provider = generator.name(), "AI analysis enabled"),
            None => tracing::info!("No insight API key configured; AI analysis disabled"),
        }

        Ok(Self::new(config, store, insight))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
