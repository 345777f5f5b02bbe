use std::sync::Arc;

use anyhow::Context;

use crate::core::config::{AppPaths, Settings};
use crate::docs::DocumentLoader;
use crate::llm::OpenAiProvider;
use crate::rag::{RagService, SqliteDocStore};

/// Global application state shared across all routes and background tasks.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub rag: Arc<RagService>,
}

impl AppState {
    /// Initializes the application state: paths, settings, the vector
    /// store, and the RAG service wired to the configured provider.
    pub async fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let settings = Settings::load(&paths);

        let provider = Arc::new(OpenAiProvider::new(
            settings.openai_base_url.clone(),
            settings.openai_api_key.clone(),
        ));

        let store = Arc::new(
            SqliteDocStore::new(&paths)
                .await
                .context("Failed to open the vector store")?,
        );

        let rag = Arc::new(RagService::new(
            settings.clone(),
            provider,
            store,
            Arc::new(DocumentLoader::new()),
        ));

        Ok(Arc::new(AppState {
            paths,
            settings,
            rag,
        }))
    }

    /// Assemble state from pre-built parts (for testing).
    pub fn from_parts(paths: Arc<AppPaths>, settings: Settings, rag: Arc<RagService>) -> Arc<Self> {
        Arc::new(AppState {
            paths,
            settings,
            rag,
        })
    }
}
