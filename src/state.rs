use crate::auth::repo::{PgUserStore, UserStore};
use crate::blogs::repo::{BlogStore, PgBlogStore};
use crate::config::{AppConfig, JwtConfig, StoreKind};
use crate::memory::MemoryStore;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub blogs: Arc<dyn BlogStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        match (config.store, config.database_url.as_deref()) {
            (StoreKind::Postgres, Some(url)) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;

                Ok(Self::from_parts(
                    config,
                    Arc::new(PgUserStore::new(db.clone())),
                    Arc::new(PgBlogStore::new(db)),
                ))
            }
            (StoreKind::Postgres, None) => anyhow::bail!("DATABASE_URL is not set"),
            (StoreKind::Memory, _) => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Ok(Self::with_memory_store(config))
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        blogs: Arc<dyn BlogStore>,
    ) -> Self {
        Self {
            config,
            users,
            blogs,
        }
    }

    pub fn with_memory_store(config: Arc<AppConfig>) -> Self {
        let store = MemoryStore::new();
        Self::from_parts(config, Arc::new(store.clone()), Arc::new(store))
    }

    /// In-memory state with fixed secrets and default token lifetimes.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreKind::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test-access-secret".into(),
                refresh_secret: "test-refresh-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_seconds: 60 * 60,
                refresh_ttl_seconds: 60 * 60 * 24 * 7,
            },
            cookie_secure: false,
        });
        Self::with_memory_store(config)
    }
}
