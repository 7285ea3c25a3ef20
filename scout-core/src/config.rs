//! Configuration system for Shadow Scout.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/shadow-scout/config.toml` and/or
//! `.shadow-scout/config.toml` in the workspace directory.

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Name of the workspace-local configuration directory.
pub const WORKSPACE_CONFIG_DIR: &str = ".shadow-scout";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
}

/// Configuration for the generative-text backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name. Only "gemini" is supported.
    pub provider: String,
    /// Candidate model identifiers, tried in order. The first is preferred.
    pub models: Vec<String>,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Inline API key. Takes precedence over `api_key_env` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Maximum tokens to generate in a response.
    pub max_tokens: usize,
    /// Default temperature for generation.
    pub temperature: f32,
    /// Upper bound on a whole synthesis request.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            models: vec![
                "gemini-3-flash-preview".to_string(),
                "gemini-2.5-flash".to_string(),
            ],
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: 8192,
            temperature: 0.7,
            timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: inline value first, then the environment variable.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Which live web-search backend to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    /// DuckDuckGo HTML results. Needs no credentials.
    #[default]
    DuckDuckGo,
    /// Google Programmable Search (Custom Search JSON API).
    Google,
}

impl fmt::Display for SearchBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBackendKind::DuckDuckGo => write!(f, "duckduckgo"),
            SearchBackendKind::Google => write!(f, "google"),
        }
    }
}

impl FromStr for SearchBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchBackendKind::DuckDuckGo),
            "google" => Ok(SearchBackendKind::Google),
            other => Err(ConfigError::Invalid {
                message: format!("unknown search backend '{}'", other),
            }),
        }
    }
}

/// Configuration for evidence collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub backend: SearchBackendKind,
    /// Result-count bound passed to the backend.
    pub max_results: usize,
    /// Upper bound on a single live search call.
    pub timeout_secs: u64,
    /// Whether the seeded fixture profiles answer trigger queries.
    pub fixtures: bool,
    pub user_agent: String,
    pub duckduckgo: DuckDuckGoConfig,
    pub google: GoogleSearchConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackendKind::default(),
            max_results: 10,
            timeout_secs: 15,
            fixtures: true,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) ShadowScout/0.1".to_string(),
            duckduckgo: DuckDuckGoConfig::default(),
            google: GoogleSearchConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuckDuckGoConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Credentials and endpoint for Google Programmable Search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSearchConfig {
    pub api_key_env: String,
    pub engine_id_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for GoogleSearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GOOGLE_API_KEY".to_string(),
            engine_id_env: "GOOGLE_CSE_ID".to_string(),
            api_key: None,
            engine_id: None,
            base_url: None,
        }
    }
}

impl GoogleSearchConfig {
    /// Resolve `(api_key, engine_id)`.
    pub fn resolve_credentials(&self) -> Result<(String, String), ConfigError> {
        let key = resolve_secret(self.api_key.as_deref(), &self.api_key_env)?;
        let cx = resolve_secret(self.engine_id.as_deref(), &self.engine_id_env)?;
        Ok((key, cx))
    }
}

impl ScoutConfig {
    /// Names of the credentials the configured pipeline needs but cannot find.
    ///
    /// The front end checks this before starting an audit; the core itself
    /// never prompts for credentials.
    pub fn missing_credentials(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.llm.resolve_api_key().is_err() {
            missing.push(self.llm.api_key_env.clone());
        }
        if self.search.backend == SearchBackendKind::Google {
            let google = &self.search.google;
            if resolve_secret(google.api_key.as_deref(), &google.api_key_env).is_err() {
                missing.push(google.api_key_env.clone());
            }
            if resolve_secret(google.engine_id.as_deref(), &google.engine_id_env).is_err() {
                missing.push(google.engine_id_env.clone());
            }
        }
        missing
    }

    /// Check values a layered merge cannot validate on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.provider != "gemini" {
            return Err(ConfigError::Invalid {
                message: format!("unsupported llm provider '{}'", self.llm.provider),
            });
        }
        if self.llm.models.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                message: "llm.models must name at least one model".to_string(),
            });
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid {
                message: "search.max_results must be at least 1".to_string(),
            });
        }
        for (key, secs) in [
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("llm.connect_timeout_secs", self.llm.connect_timeout_secs),
            ("search.timeout_secs", self.search.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    message: format!("{key} must be at least 1 second"),
                });
            }
        }
        Ok(())
    }

    /// A copy safe to print: inline secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some("********".to_string());
            }
        };
        mask(&mut copy.llm.api_key);
        mask(&mut copy.search.google.api_key);
        mask(&mut copy.search.google.engine_id);
        copy
    }
}

fn resolve_secret(inline: Option<&str>, env_var: &str) -> Result<String, ConfigError> {
    if let Some(value) = inline.filter(|v| !v.trim().is_empty()) {
        return Ok(value.to_string());
    }
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::EnvVarMissing {
            var: env_var.to_string(),
        }),
    }
}

/// Path of the user-level config file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "shadowscout", "shadow-scout")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_CONFIG_DIR).join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `SCOUT_`)
/// 2. Workspace-local config (`.shadow-scout/config.toml`)
/// 3. User config (`~/.config/shadow-scout/config.toml`)
/// 4. Built-in defaults
pub fn load_config(workspace: Option<&Path>) -> Result<ScoutConfig, ConfigError> {
    load_config_from(user_config_path().as_deref(), workspace)
}

/// Same as [`load_config`] with an explicit user config location.
pub fn load_config_from(
    user_config: Option<&Path>,
    workspace: Option<&Path>,
) -> Result<ScoutConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(ScoutConfig::default()));

    if let Some(path) = user_config
        && path.exists()
    {
        figment = figment.merge(Toml::file(path));
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // SCOUT_LLM__TIMEOUT_SECS, SCOUT_SEARCH__BACKEND, etc.
    figment = figment.merge(Env::prefixed("SCOUT_").split("__"));

    let config: ScoutConfig = figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Write the default configuration to `<workspace>/.shadow-scout/config.toml`.
///
/// Refuses to overwrite an existing file.
pub fn init_workspace_config(workspace: &Path) -> Result<PathBuf, ConfigError> {
    let path = workspace_config_path(workspace);
    if path.exists() {
        return Err(ConfigError::Invalid {
            message: format!("{} already exists", path.display()),
        });
    }
    let body = toml::to_string_pretty(&ScoutConfig::default()).map_err(|e| {
        ConfigError::ParseError {
            message: e.to_string(),
        }
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Invalid {
            message: format!("cannot create {}: {}", parent.display(), e),
        })?;
    }
    std::fs::write(&path, body).map_err(|e| ConfigError::Invalid {
        message: format!("cannot write {}: {}", path.display(), e),
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoutConfig::default();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(
            config.llm.models,
            vec!["gemini-3-flash-preview", "gemini-2.5-flash"]
        );
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.search.backend, SearchBackendKind::DuckDuckGo);
        assert_eq!(config.search.max_results, 10);
        assert!(config.search.fixtures);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(
            "Google".parse::<SearchBackendKind>().unwrap(),
            SearchBackendKind::Google
        );
        assert_eq!(
            "ddg".parse::<SearchBackendKind>().unwrap(),
            SearchBackendKind::DuckDuckGo
        );
        assert!("bing".parse::<SearchBackendKind>().is_err());
        assert_eq!(SearchBackendKind::DuckDuckGo.to_string(), "duckduckgo");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = ScoutConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: ScoutConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.llm.models, config.llm.models);
        assert_eq!(deserialized.search.backend, config.search.backend);
        assert_eq!(deserialized.search.timeout_secs, 15);
    }

    #[test]
    fn test_load_config_from_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let scout_dir = dir.path().join(WORKSPACE_CONFIG_DIR);
        std::fs::create_dir_all(&scout_dir).unwrap();
        std::fs::write(
            scout_dir.join("config.toml"),
            r#"
[llm]
models = ["gemini-2.5-pro"]
timeout_secs = 30

[search]
backend = "google"
max_results = 5
fixtures = false
"#,
        )
        .unwrap();

        let config = load_config_from(None, Some(dir.path())).unwrap();
        assert_eq!(config.llm.models, vec!["gemini-2.5-pro"]);
        assert_eq!(config.llm.timeout_secs, 30);
        // Untouched keys keep their defaults.
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.search.backend, SearchBackendKind::Google);
        assert_eq!(config.search.max_results, 5);
        assert!(!config.search.fixtures);
    }

    #[test]
    fn test_workspace_overrides_user_config() {
        let user_dir = tempfile::tempdir().unwrap();
        let user_file = user_dir.path().join("config.toml");
        std::fs::write(&user_file, "[search]\nmax_results = 3\ntimeout_secs = 9\n").unwrap();

        let ws = tempfile::tempdir().unwrap();
        let scout_dir = ws.path().join(WORKSPACE_CONFIG_DIR);
        std::fs::create_dir_all(&scout_dir).unwrap();
        std::fs::write(scout_dir.join("config.toml"), "[search]\nmax_results = 7\n").unwrap();

        let config = load_config_from(Some(&user_file), Some(ws.path())).unwrap();
        assert_eq!(config.search.max_results, 7);
        assert_eq!(config.search.timeout_secs, 9);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let ws = tempfile::tempdir().unwrap();
        let scout_dir = ws.path().join(WORKSPACE_CONFIG_DIR);
        std::fs::create_dir_all(&scout_dir).unwrap();
        std::fs::write(scout_dir.join("config.toml"), "[llm]\nprovider = \"openai\"\n").unwrap();

        let err = load_config_from(None, Some(ws.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        for body in [
            "[llm]\ntimeout_secs = 0\n",
            "[search]\ntimeout_secs = 0\n",
        ] {
            std::fs::write(scout_dir.join("config.toml"), body).unwrap();
            match load_config_from(None, Some(ws.path())).unwrap_err() {
                ConfigError::Invalid { message } => assert!(message.contains("timeout_secs")),
                other => panic!("expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_load_config_parse_error() {
        let ws = tempfile::tempdir().unwrap();
        let scout_dir = ws.path().join(WORKSPACE_CONFIG_DIR);
        std::fs::create_dir_all(&scout_dir).unwrap();
        std::fs::write(scout_dir.join("config.toml"), "[search]\nbackend = \"bing\"\n").unwrap();

        let err = load_config_from(None, Some(ws.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_resolve_api_key_inline_wins() {
        let config = LlmConfig {
            api_key: Some("inline-key".into()),
            api_key_env: "SHADOW_TEST_UNSET_KEY_VAR".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "inline-key");
    }

    #[test]
    fn test_resolve_api_key_from_env() {
        // SAFETY: test-only env var manipulation with a unique name
        unsafe { std::env::set_var("SHADOW_TEST_GEMINI_KEY_UNIT", "env-key") };
        let config = LlmConfig {
            api_key_env: "SHADOW_TEST_GEMINI_KEY_UNIT".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "env-key");
    }

    #[test]
    fn test_missing_credentials_lists_google_when_selected() {
        let mut config = ScoutConfig::default();
        config.llm.api_key = Some("present".into());
        config.search.google.api_key_env = "SHADOW_TEST_MISSING_GOOGLE_KEY".into();
        config.search.google.engine_id_env = "SHADOW_TEST_MISSING_GOOGLE_CX".into();
        assert!(config.missing_credentials().is_empty());

        config.search.backend = SearchBackendKind::Google;
        assert_eq!(
            config.missing_credentials(),
            vec![
                "SHADOW_TEST_MISSING_GOOGLE_KEY".to_string(),
                "SHADOW_TEST_MISSING_GOOGLE_CX".to_string()
            ]
        );

        config.search.google.api_key = Some("k".into());
        config.search.google.engine_id = Some("cx".into());
        assert!(config.missing_credentials().is_empty());
        assert_eq!(
            config.search.google.resolve_credentials().unwrap(),
            ("k".to_string(), "cx".to_string())
        );
    }

    #[test]
    fn test_redacted_masks_inline_secrets() {
        let mut config = ScoutConfig::default();
        config.llm.api_key = Some("secret".into());
        let shown = config.redacted();
        assert_eq!(shown.llm.api_key.as_deref(), Some("********"));
        assert!(shown.search.google.api_key.is_none());
    }

    #[test]
    fn test_init_workspace_config() {
        let ws = tempfile::tempdir().unwrap();
        let path = init_workspace_config(ws.path()).unwrap();
        assert!(path.exists());
        let loaded = load_config_from(None, Some(ws.path())).unwrap();
        assert_eq!(loaded.llm.models, ScoutConfig::default().llm.models);

        // A second init must not clobber the file.
        assert!(init_workspace_config(ws.path()).is_err());
    }
}
