use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use super::paths::AppPaths;

/// Application settings.
///
/// Loaded from an optional `config.yml` in the data directory, with
/// environment variables taking precedence over file values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OpenAI API key. Empty means "not configured"; the server still
    /// starts but chat and indexing requests will fail.
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_chat_model: String,
    pub openai_embedding_model: String,

    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub retrieval_top_k: usize,

    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com".to_string(),
            openai_chat_model: "gpt-4o-mini".to_string(),
            openai_embedding_model: "text-embedding-3-small".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_top_k: 5,
            host: "0.0.0.0".to_string(),
            port: 3005,
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Self {
        let mut settings = load_config_file(&config_path(paths));
        settings.apply_env_overrides();
        settings
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("OPENAI_API_KEY") {
            self.openai_api_key = value;
        }
        if let Ok(value) = env::var("OPENAI_BASE_URL") {
            self.openai_base_url = value;
        }
        if let Ok(value) = env::var("OPENAI_CHAT_MODEL") {
            self.openai_chat_model = value;
        }
        if let Ok(value) = env::var("OPENAI_EMBEDDING_MODEL") {
            self.openai_embedding_model = value;
        }
        if let Ok(value) = env::var("CHUNK_SIZE") {
            if let Ok(parsed) = value.parse() {
                self.chunk_size = parsed;
            }
        }
        if let Ok(value) = env::var("CHUNK_OVERLAP") {
            if let Ok(parsed) = value.parse() {
                self.chunk_overlap = parsed;
            }
        }
        if let Ok(value) = env::var("RETRIEVAL_TOP_K") {
            if let Ok(parsed) = value.parse() {
                self.retrieval_top_k = parsed;
            }
        }
        if let Ok(value) = env::var("HOST") {
            self.host = value;
        }
        if let Ok(value) = env::var("PORT") {
            if let Ok(parsed) = value.parse() {
                self.port = parsed;
            }
        }
    }
}

fn config_path(paths: &AppPaths) -> PathBuf {
    if let Ok(path) = env::var("DOCQA_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    paths.data_dir.join("config.yml")
}

fn load_config_file(path: &PathBuf) -> Settings {
    if !path.exists() {
        return Settings::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Settings>(&contents) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("Failed to parse {}: {}; using defaults", path.display(), err);
                Settings::default()
            }
        },
        Err(err) => {
            tracing::warn!("Failed to read {}: {}; using defaults", path.display(), err);
            Settings::default()
        }
    }
}
