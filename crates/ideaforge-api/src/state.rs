use std::sync::Arc;

use ideaforge_engine::GenerationEngine;
use ideaforge_persist::PersistClient;

use crate::auth::AuthService;
use crate::config::Config;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<PersistClient>,
    pub engine: Arc<GenerationEngine>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        config: Config,
        persist: PersistClient,
        engine: GenerationEngine,
        auth: AuthService,
    ) -> Self {
        Self {
            config: Arc::new(config),
            persist: Arc::new(persist),
            engine: Arc::new(engine),
            auth: Arc::new(auth),
        }
    }
}
