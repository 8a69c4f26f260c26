//! Configuration types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// AI provider kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Claude,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Claude => "claude",
        }
    }

    #[must_use]
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Claude => "claude-sonnet-4-20250514",
        }
    }

    #[must_use]
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Claude => "https://api.anthropic.com",
        }
    }

    #[must_use]
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-provider overrides. Unset fields use the provider's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Environment variable name for the API key.
    pub api_key_env: Option<String>,
    /// Maximum tokens in response.
    pub max_tokens: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: None,
            base_url: None,
            api_key_env: None,
            max_tokens: 8192,
        }
    }
}

/// Fully resolved connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub max_tokens: u32,
}

/// Settings for every supported provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: ProviderSettings,
    pub claude: ProviderSettings,
}

impl ProvidersConfig {
    #[must_use]
    pub fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Claude => &self.claude,
        }
    }

    /// Merge overrides with the provider's defaults.
    #[must_use]
    pub fn resolve(&self, kind: ProviderKind) -> ProviderEndpoint {
        let settings = self.settings(kind);
        ProviderEndpoint {
            kind,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| kind.default_model().to_string()),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| kind.default_base_url().to_string()),
            api_key_env: settings
                .api_key_env
                .clone()
                .unwrap_or_else(|| kind.default_api_key_env().to_string()),
            max_tokens: settings.max_tokens,
        }
    }
}

/// Provider selection for the analysis agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Provider tried first.
    pub primary: ProviderKind,
    /// Providers tried in order when the previous one fails.
    pub fallbacks: Vec<ProviderKind>,
    /// Print per-provider progress while analyzing.
    pub interactive: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            primary: ProviderKind::Gemini,
            fallbacks: vec![ProviderKind::Claude],
            interactive: true,
        }
    }
}

impl AgentConfig {
    /// Primary followed by fallbacks, without repeats.
    #[must_use]
    pub fn provider_order(&self) -> Vec<ProviderKind> {
        let mut order = vec![self.primary];
        for kind in &self.fallbacks {
            if !order.contains(kind) {
                order.push(*kind);
            }
        }
        order
    }
}

/// Whether the runner writes a session export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Ask the user after each successful analysis.
    #[default]
    Ask,
    Always,
    Never,
}

/// Session export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory exports are written to, relative to the working directory.
    pub dir: PathBuf,
    pub export: ExportMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            export: ExportMode::Ask,
        }
    }
}

/// Knowledge base settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Replacement recommendations data file. Embedded data is used when unset.
    pub data_path: Option<PathBuf>,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub providers: ProvidersConfig,
    pub output: OutputConfig,
    pub knowledge: KnowledgeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.agent.primary, ProviderKind::Gemini);
        assert_eq!(config.agent.fallbacks, vec![ProviderKind::Claude]);
        assert!(config.agent.interactive);
        assert_eq!(config.output.dir, PathBuf::from("outputs"));
        assert_eq!(config.output.export, ExportMode::Ask);
        assert!(config.knowledge.data_path.is_none());
    }

    #[test]
    fn test_resolve_uses_provider_defaults() {
        let providers = ProvidersConfig::default();
        let claude = providers.resolve(ProviderKind::Claude);
        assert_eq!(claude.model, "claude-sonnet-4-20250514");
        assert_eq!(claude.base_url, "https://api.anthropic.com");
        assert_eq!(claude.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(claude.max_tokens, 8192);

        let gemini = providers.resolve(ProviderKind::Gemini);
        assert_eq!(gemini.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let toml = r#"
            [claude]
            model = "claude-test"
            max_tokens = 512
        "#;
        let providers: ProvidersConfig = toml::from_str(toml).unwrap();
        let claude = providers.resolve(ProviderKind::Claude);
        assert_eq!(claude.model, "claude-test");
        assert_eq!(claude.max_tokens, 512);
        assert_eq!(claude.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_provider_order_dedupes() {
        let config = AgentConfig {
            primary: ProviderKind::Claude,
            fallbacks: vec![ProviderKind::Claude, ProviderKind::Gemini, ProviderKind::Gemini],
            interactive: false,
        };
        assert_eq!(
            config.provider_order(),
            vec![ProviderKind::Claude, ProviderKind::Gemini]
        );
    }

    #[test]
    fn test_export_mode_deserialize() {
        let config: OutputConfig = toml::from_str(r#"export = "never""#).unwrap();
        assert_eq!(config.export, ExportMode::Never);
        assert_eq!(config.dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::Gemini.to_string(), "gemini");
        assert_eq!(ProviderKind::Claude.to_string(), "claude");
    }
}
