use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::llm::{build_providers, Providers};

pub mod error;
pub mod session;

use error::InitializationError;
pub use session::{QueryOutcome, RagSession, SessionRegistry, SessionStats, FALLBACK_ANSWER};

/// Application state shared across all routes.
///
/// Contains:
/// - Paths and the validated configuration
/// - The embedding and generation providers, built once
/// - The per-client session registry
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: Arc<AppConfig>,
    pub providers: Providers,
    pub sessions: SessionRegistry,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Resolve paths, load configuration and build the model providers.
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone())
            .load()
            .map_err(InitializationError::Config)?;
        Self::with_config(paths, config)
    }

    pub fn with_config(
        paths: Arc<AppPaths>,
        config: AppConfig,
    ) -> Result<Arc<Self>, InitializationError> {
        let providers = build_providers(&config.llm).map_err(InitializationError::Providers)?;
        Ok(Self::with_providers(paths, config, providers))
    }

    pub fn with_providers(paths: Arc<AppPaths>, config: AppConfig, providers: Providers) -> Arc<Self> {
        Arc::new(AppState {
            paths,
            config: Arc::new(config),
            providers,
            sessions: SessionRegistry::new(),
            started_at: Utc::now(),
        })
    }
}
