use std::sync::Arc;

use crate::auth::session::Sessions;
use crate::config::AppConfig;
use crate::store::{self, RecipeStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
    pub sessions: Sessions,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = store::open(&config).await?;
        let sessions = Sessions::new(config.session_ttl);
        Ok(Self {
            store,
            sessions,
            config,
        })
    }

    pub fn from_parts(store: Arc<dyn RecipeStore>, config: Arc<AppConfig>) -> Self {
        let sessions = Sessions::new(config.session_ttl);
        Self {
            store,
            sessions,
            config,
        }
    }
}
