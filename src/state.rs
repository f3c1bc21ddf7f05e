use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::db;
use crate::expenses::repo::{ExpenseRepo, PgExpenseRepo};
use crate::memory::MemoryStore;
use std::sync::Arc;

/// Shared, read-only after startup: configuration and the two stores.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub expenses: Arc<dyn ExpenseRepo>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        match config.database_url.as_deref() {
            Some(url) => {
                let pool = db::connect(url).await?;
                db::migrate(&pool).await?;
                Ok(Self {
                    users: Arc::new(PgUserRepo::new(pool.clone())),
                    expenses: Arc::new(PgExpenseRepo::new(pool)),
                    config,
                })
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory store, data is not persisted");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        expenses: Arc<dyn ExpenseRepo>,
    ) -> Self {
        Self {
            config,
            users,
            expenses,
        }
    }

    /// Both stores backed by one `MemoryStore`.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(config, store.clone(), store)
    }

    pub fn fake() -> Self {
        Self::in_memory(Arc::new(AppConfig::for_tests("test")))
    }
}
