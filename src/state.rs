use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{ItemStore, MemoryStore, PgStore, UserStore};
use crate::render::Renderer;

/// Shared per-process dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub items: Arc<dyn ItemStore>,
    pub users: Arc<dyn UserStore>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        items: Arc<dyn ItemStore>,
        users: Arc<dyn UserStore>,
        renderer: Renderer,
    ) -> Self {
        Self {
            config: Arc::new(config),
            items,
            users,
            renderer: Arc::new(renderer),
        }
    }

    pub fn with_memory_store(config: AppConfig, renderer: Renderer) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store, renderer)
    }

    pub fn with_pg_store(config: AppConfig, store: PgStore, renderer: Renderer) -> Self {
        let store = Arc::new(store);
        Self::new(config, store.clone(), store, renderer)
    }
}
