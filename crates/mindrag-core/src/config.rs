//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_RETRIEVAL__TOP_K`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_file(Path::new("config.toml"))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(path));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(env_overlay(path, "dev"))),
            "prod" | "production" => figment = figment.merge(Toml::file(env_overlay(path, "prod"))),
            "test" | "testing" => figment = figment.merge(Toml::file(env_overlay(path, "test"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    /// Wrap an already-assembled figment; defaults are layered underneath.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> Result<()> {
        let settings = self.settings()?;
        match env {
            "prod" | "production" if settings.embedding.backend == EmbeddingBackend::Fake => Err(
                Error::InvalidConfig("the fake embedding backend is not allowed in production".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

fn env_overlay(path: &Path, env: &str) -> PathBuf {
    path.with_extension(format!("{env}.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub composer: ComposerSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("retrieval.top_k", self.retrieval.top_k),
            ("embedding.max_len", self.embedding.max_len),
            ("embedding.batch_size", self.embedding.batch_size),
            ("embedding.dim", self.embedding.dim),
            ("embedding.timeout_secs", self.embedding.timeout_secs as usize),
            ("composer.timeout_secs", self.composer.timeout_secs as usize),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{key} must be greater than zero")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Local,
    Ollama,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    /// Directory holding `config.json`, `tokenizer.json` and the weights.
    pub model_dir: String,
    pub max_len: usize,
    pub batch_size: usize,
    /// Vector length for the fake backend; real backends report their own.
    pub dim: usize,
    pub ollama_url: String,
    pub ollama_model: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Local,
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            batch_size: 64,
            dim: 384,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "all-minilm".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComposerSettings {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
