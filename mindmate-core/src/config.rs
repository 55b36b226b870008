use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_SYSTEM_PROMPT: &str = concat!(
    "Ti si MindMate — AI mentalni wellness asistent na srpskom. ",
    "Empatičan, jasan i praktičan (CBT/ACT/mindfulness). ",
    "Nema dijagnostike/preskripcije. Rizik → 112 i stručna pomoć. ",
    "Daj mikro-korake (5–10min) i traži kratke update-e."
);

/// Legacy flat environment variables, mapped onto config keys. These win over
/// both the TOML file and `MINDMATE__*` variables.
const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("MINDMATE_DB", "store.path"),
    ("CHAT_PROVIDER", "chat.provider"),
    ("OLLAMA_HOST", "ollama.host"),
    ("OLLAMA_MODEL", "ollama.model"),
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_MODEL", "openai.model"),
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MindMateConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot document path.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "mindmate_db.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    /// `ollama` / `local` or `openai` / `hosted`.
    pub provider: String,
    pub request_timeout_seconds: u64,
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            request_timeout_seconds: 120,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl MindMateConfig {
    /// Load from an optional TOML file plus the process environment.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(path, std::env::vars().collect())
    }

    /// Same as [`MindMateConfig::load`] but reads environment values from
    /// `vars` instead of the process environment.
    pub fn load_with_env(path: &str, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("MINDMATE")
                    .separator("__")
                    .source(Some(vars.clone())),
            );

        for (var, key) in LEGACY_ENV_OVERRIDES {
            builder = builder.set_override_option(*key, vars.get(*var).cloned())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Model name of the selected provider, for display.
    pub fn active_model(&self) -> &str {
        match crate::chat::ProviderKind::from_name(&self.chat.provider) {
            crate::chat::ProviderKind::Local => &self.ollama.model,
            crate::chat::ProviderKind::Hosted => &self.openai.model,
        }
    }
}
