//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::AppConfig;

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths.
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        // 1. Current directory: .organ-factcheck.toml
        search_paths.push(PathBuf::from(".organ-factcheck.toml"));

        // 2. User config directory: ~/.config/organ-factcheck/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("organ-factcheck").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Create a config loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Load configuration from the first available file, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// contains invalid values.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Self::load_from_path(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(AppConfig::default())
    }

    /// Load configuration from a specific path.
    fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        validate(&config)?;
        Ok(config)
    }

    /// Get the search paths for debugging.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Check values serde cannot check on its own.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` for an unparseable provider `base_url`
/// or a zero `max_tokens`.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    for kind in config.agent.provider_order() {
        let endpoint = config.providers.resolve(kind);
        url::Url::parse(&endpoint.base_url).map_err(|e| {
            ConfigError::Invalid(format!("providers.{kind}.base_url {:?}: {e}", endpoint.base_url))
        })?;
        if endpoint.max_tokens == 0 {
            return Err(ConfigError::Invalid(format!(
                "providers.{kind}.max_tokens must be greater than zero"
            )));
        }
    }
    Ok(())
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::{ExportMode, ProviderKind};

    #[test]
    fn test_config_loader_default_paths() {
        let loader = ConfigLoader::new();
        assert!(!loader.search_paths().is_empty());
        assert!(loader.search_paths()[0].ends_with(".organ-factcheck.toml"));
    }

    #[test]
    fn test_config_loader_returns_defaults_when_no_file() {
        let loader = ConfigLoader::with_path(PathBuf::from("/nonexistent/path.toml"));
        let config = loader.load().unwrap();
        assert_eq!(config.agent.primary, ProviderKind::Gemini);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [agent]
            primary = "claude"
            fallbacks = ["gemini"]
            interactive = false

            [providers.claude]
            model = "claude-opus"
            api_key_env = "MY_CLAUDE_KEY"

            [output]
            dir = "reports"
            export = "always"

            [knowledge]
            data_path = "organs.json"
            "#
        )
        .unwrap();

        let config = ConfigLoader::with_path(file.path().to_path_buf())
            .load()
            .unwrap();
        assert_eq!(config.agent.primary, ProviderKind::Claude);
        assert_eq!(config.agent.fallbacks, vec![ProviderKind::Gemini]);
        assert!(!config.agent.interactive);
        assert_eq!(config.providers.resolve(ProviderKind::Claude).model, "claude-opus");
        assert_eq!(config.output.dir, PathBuf::from("reports"));
        assert_eq!(config.output.export, ExportMode::Always);
        assert_eq!(config.knowledge.data_path, Some(PathBuf::from("organs.json")));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[agent]\nprimary = \"openai\"\n").unwrap();

        let err = ConfigLoader::with_path(file.path().to_path_buf())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[providers.gemini]\nbase_url = \"not a url\"\n").unwrap();

        let err = ConfigLoader::with_path(file.path().to_path_buf())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("gemini")));
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let mut config = AppConfig::default();
        config.providers.claude.max_tokens = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(validate(&AppConfig::default()).is_ok());
    }
}
