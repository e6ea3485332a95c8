// Configuration Storage Service
// Handles pipeline config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to create config dir: {0}")]
    CreateDir(std::io::Error),
    #[error("Failed to read config: {0}")]
    Read(std::io::Error),
    #[error("Failed to write config: {0}")]
    Write(std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            pipeline: PipelineConfig::default(),
            provider: None,
            api_keys: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default = "default_persona")]
    pub default_persona: String,
    #[serde(default = "default_mode")]
    pub default_mode: String,
    #[serde(default = "default_ai_threshold")]
    pub ai_threshold: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default = "default_true")]
    pub use_enrichment: bool,
    /// Fixed seed for every randomized component; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_persona: default_persona(),
            default_mode: default_mode(),
            ai_threshold: default_ai_threshold(),
            max_retries: default_max_retries(),
            strict_mode: false,
            use_enrichment: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    /// HTTP(S) proxy for provider requests.
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_version() -> String { "1.0.0".to_string() }
fn default_persona() -> String { "conversational".to_string() }
fn default_mode() -> String { "explain".to_string() }
fn default_ai_threshold() -> f64 { 0.5 }
fn default_max_retries() -> u32 { 2 }
fn default_true() -> bool { true }
fn default_max_tokens() -> u32 { 800 }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("synthpost"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir).map_err(ConfigError::CreateDir)
    }

    /// Load configuration; a missing file yields the defaults.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file).map_err(ConfigError::Read)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
        fs::write(&self.config_file, content).map_err(ConfigError::Write)
    }

    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir).map_err(ConfigError::CreateDir)?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));
        fs::copy(&self.config_file, &backup_file).map_err(ConfigError::Write)?;

        self.cleanup_old_backups(&backup_dir, 10)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(ConfigError::Read)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Names embed the timestamp, so lexical order is chronological
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    pub fn get_api_key(&self, provider: &str) -> Result<Option<String>, ConfigError> {
        let config = self.load()?;
        Ok(config.api_keys.get(provider).cloned())
    }

    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        config.api_keys.insert(provider.to_string(), key.to_string());
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(label: &str) -> (ConfigStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("synthpost-config-{}-{}", label, uuid::Uuid::new_v4()));
        (ConfigStore::new(dir.clone()), dir)
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.default_persona, "conversational");
        assert_eq!(config.pipeline.default_mode, "explain");
        assert_eq!(config.pipeline.max_retries, 2);
        assert!((config.pipeline.ai_threshold - 0.5).abs() < f64::EPSILON);
        assert!(config.pipeline.use_enrichment);
        assert!(config.provider.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"pipeline":{"maxRetries":4,"seed":7}}"#).unwrap();
        assert_eq!(parsed.version, "1.0.0");
        assert_eq!(parsed.pipeline.max_retries, 4);
        assert_eq!(parsed.pipeline.seed, Some(7));
        assert_eq!(parsed.pipeline.default_persona, "conversational");
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let (store, _dir) = temp_store("missing");
        let config = store.load().unwrap();
        assert_eq!(config.pipeline.default_mode, "explain");
    }

    #[test]
    fn test_save_load_and_backup() {
        let (store, dir) = temp_store("save");
        let mut config = AppConfig::default();
        config.pipeline.strict_mode = true;
        store.save(&config).unwrap();
        store.set_api_key("openai", "sk-test").unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.pipeline.strict_mode);
        assert_eq!(store.get_api_key("openai").unwrap().as_deref(), Some("sk-test"));

        let backups = fs::read_dir(dir.join("backups")).unwrap().count();
        assert_eq!(backups, 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_provider_config_round_trip() {
        let (store, dir) = temp_store("provider");
        let mut config = AppConfig::default();
        config.provider = Some(ProviderConfig {
            name: "openai".to_string(),
            model: Some("gpt-4o-mini".to_string()),
            base_url: None,
            proxy_url: Some("http://127.0.0.1:3128".to_string()),
            max_tokens: 512,
        });
        store.save(&config).unwrap();

        let raw = fs::read_to_string(store.config_file()).unwrap();
        assert!(raw.contains("\"proxyUrl\": \"http://127.0.0.1:3128\""));

        let provider = store.load().unwrap().provider.unwrap();
        assert_eq!(provider.proxy_url.as_deref(), Some("http://127.0.0.1:3128"));
        assert_eq!(provider.max_tokens, 512);

        let parsed: ProviderConfig = serde_json::from_str(r#"{"name":"openai"}"#).unwrap();
        assert!(parsed.proxy_url.is_none());
        assert_eq!(parsed.max_tokens, 800);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let (store, dir) = temp_store("invalid");
        store.ensure_dir().unwrap();
        fs::write(store.config_file(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(ConfigError::Parse(_))));
        let _ = fs::remove_dir_all(dir);
    }
}
