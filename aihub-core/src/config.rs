use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::provider::{DEFAULT_MODEL, Provider};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RegistryCfg {
    /// Base URL of the hosted prompt registry.
    pub base_url: String,
    /// Name of the environment variable that contains the API key.
    pub api_key_env: String,
    /// Identifiers fetched by a batch pull.
    #[serde(default)]
    pub prompts: Vec<String>,
}

/// Initial record for the in-memory provider store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DefaultsCfg {
    pub provider: Provider,
    pub model: String,
}

impl Default for DefaultsCfg {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpCfg {
    /// TCP connect timeout in milliseconds (default 5000ms)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Total request timeout in milliseconds (default 60000ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Optional per-host idle connection pool cap (None = reqwest default)
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            pool_max_idle_per_host: None,
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}
fn default_request_timeout_ms() -> u64 {
    60_000
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub registry: RegistryCfg,
    /// Provider store seed. Missing in older configs → defaults.
    #[serde(default)]
    pub defaults: DefaultsCfg,
    /// HTTP client configuration (timeouts, pooling). Missing in older configs → defaults.
    #[serde(default)]
    pub http: HttpCfg,
}

impl Config {
    /// Load a Config from a file path (JSON or TOML by extension). If the
    /// extension is missing or unrecognized, try JSON first, then TOML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::error::CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(crate::error::AiHubError::from)?;
        let s =
            std::str::from_utf8(&bytes).map_err(|e| crate::error::AiHubError::Other(e.into()))?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::AiHubError::Other(e.into()))?,
            Some("toml") => toml::from_str::<Self>(s)
                .map_err(|e| crate::error::AiHubError::Other(e.into()))?,
            _ => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::AiHubError::Other(e.into()))
                .or_else(|_| {
                    toml::from_str::<Self>(s)
                        .map_err(|e| crate::error::AiHubError::Other(e.into()))
                })?,
        };
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_from_json() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("aihub.json");
        let json = r#"{
          "registry": {
            "base_url": "https://hub.example.com",
            "api_key_env": "PROMPT_REGISTRY_API_KEY",
            "prompts": ["chat-system", "chat-title", "chat-summary"]
          },
          "defaults": {
            "provider": "anthropic",
            "model": "claude-3-haiku"
          }
        }"#;
        fs::write(&file, json).unwrap();
        let cfg = Config::from_path(&file).unwrap();
        assert_eq!(cfg.registry.base_url, "https://hub.example.com");
        assert_eq!(cfg.registry.prompts.len(), 3);
        assert_eq!(cfg.defaults.provider, Provider::Anthropic);
        assert_eq!(cfg.defaults.model, "claude-3-haiku");
        assert_eq!(cfg.http.connect_timeout_ms, 5_000);
        assert_eq!(cfg.http.request_timeout_ms, 60_000);
        assert_eq!(cfg.http.pool_max_idle_per_host, None);
    }

    #[test]
    fn missing_defaults_section_uses_store_defaults() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("aihub.json");
        let json = r#"{
          "registry": {
            "base_url": "https://hub.example.com",
            "api_key_env": "PROMPT_REGISTRY_API_KEY"
          }
        }"#;
        fs::write(&file, json).unwrap();
        let cfg = Config::from_path(&file).unwrap();
        assert_eq!(cfg.registry.prompts, Vec::<String>::new());
        assert_eq!(cfg.defaults.provider, Provider::OpenAi);
        assert_eq!(cfg.defaults.model, DEFAULT_MODEL);
    }

    #[test]
    fn missing_file_returns_io_error() {
        let missing = std::path::PathBuf::from("/definitely/not/here/aihub-missing.json");
        let err = Config::from_path(&missing).unwrap_err();
        // Should map to our typed Io error
        match err {
            crate::error::AiHubError::Io(_) => {}
            other => panic!("expected Io error, got: {:?}", other),
        }
    }

    #[test]
    fn bad_utf8_returns_other_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.bin");
        // Write invalid UTF-8 bytes
        let bytes = vec![0xff, 0xfe, 0xfd, 0x00, 0x80];
        fs::write(&file, bytes).unwrap();
        let err = Config::from_path(&file).unwrap_err();
        match err {
            crate::error::AiHubError::Other(_) => {}
            other => panic!("expected Other(utf8) error, got: {:?}", other),
        }
    }

    #[test]
    fn bad_json_returns_other_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.json");
        // Intentionally malformed JSON
        let json = r#"{ "registry": { "base_url": 123 }"#; // missing closing }
        fs::write(&file, json).unwrap();
        let err = Config::from_path(&file).unwrap_err();
        match err {
            crate::error::AiHubError::Other(_) => {}
            other => panic!("expected Other(json parse) error, got: {:?}", other),
        }
    }

    #[test]
    fn load_from_toml() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("aihub.toml");
        let toml = r#"
[registry]
base_url = "https://hub.example.com"
api_key_env = "PROMPT_REGISTRY_API_KEY"
prompts = ["chat-system", "chat-title"]

[defaults]
provider = "openrouter"
model = "mixtral-8x7b"

[http]
connect_timeout_ms = 1000
"#;
        fs::write(&file, toml).unwrap();
        let cfg = Config::from_path(&file).unwrap();
        assert_eq!(cfg.registry.prompts, vec!["chat-system", "chat-title"]);
        assert_eq!(cfg.defaults.provider, Provider::OpenRouter);
        assert_eq!(cfg.http.connect_timeout_ms, 1_000);
        assert_eq!(cfg.http.request_timeout_ms, 60_000);
        assert_eq!(cfg.http.pool_max_idle_per_host, None);
    }

    #[test]
    fn unknown_extension_falls_back_to_json_then_toml() {
        let dir = tempdir().unwrap();
        // First try with a .conf that is valid JSON
        let json_path = dir.path().join("aihub.conf");
        let json = r#"{"registry":{"base_url":"http://localhost:3000","api_key_env":"K","prompts":[]}}"#;
        fs::write(&json_path, json).unwrap();
        let cfg_json_first = Config::from_path(&json_path).unwrap();
        assert_eq!(cfg_json_first.registry.base_url, "http://localhost:3000");
        assert_eq!(cfg_json_first.http.connect_timeout_ms, 5_000);

        // Now write TOML to a different .conf and ensure TOML fallback works when JSON fails
        let toml_path = dir.path().join("aihub2.conf");
        let toml = r#"
[registry]
base_url = "http://localhost:3000"
api_key_env = "K"
prompts = []
"#;
        fs::write(&toml_path, toml).unwrap();
        let cfg_toml_fallback = Config::from_path(&toml_path).unwrap();
        assert_eq!(cfg_toml_fallback.registry.api_key_env, "K");
        assert_eq!(cfg_toml_fallback.defaults.provider, Provider::OpenAi);
    }
}
