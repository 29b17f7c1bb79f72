use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Intent label that launches the item-creation dialog.
pub const DEFAULT_CREATE_INTENT: &str = "Create_New";
/// Classifier results scoring below this are treated as "no intent".
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;
pub const DEFAULT_CHANNEL: &str = "console";

/// Top-level config (devbot.toml + DEVBOT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevbotConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Logical channel name stamped on conversation data and outbound messages.
    #[serde(default = "default_channel")]
    pub name: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: default_channel(),
        }
    }
}

/// Settings for the intent classifier and the dispatcher's use of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_create_intent")]
    pub create_intent: String,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Verbs the keyword classifier treats as "create something".
    #[serde(default = "default_create_verbs")]
    pub create_verbs: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            create_intent: default_create_intent(),
            min_confidence: default_min_confidence(),
            create_verbs: default_create_verbs(),
        }
    }
}

/// Identity used by the console host when none is passed on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_user")]
    pub default_user: String,
    pub default_conversation: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            default_conversation: None,
        }
    }
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.devbot/devbot.db", home)
}
fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}
fn default_create_intent() -> String {
    DEFAULT_CREATE_INTENT.to_string()
}
fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}
fn default_create_verbs() -> Vec<String> {
    ["create", "new", "add", "open", "file", "log", "raise"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "local-user".to_string())
}

impl DevbotConfig {
    /// Load config from a TOML file with DEVBOT_* env var overrides.
    ///
    /// Env keys separate section and field with a double underscore, so
    /// field names keep their single underscores:
    /// `DEVBOT_CLASSIFIER__MIN_CONFIDENCE=0.8` sets `classifier.min_confidence`.
    ///
    /// A missing file is not an error; defaults fill every section.
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.devbot/devbot.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        debug!(path = %path, "loading config");

        Self::figment(&path)
            .merge(Env::prefixed("DEVBOT_").split("__"))
            .extract()
            .map_err(|e| crate::error::DevbotError::Config(e.to_string()))
    }

    /// Defaults overlaid with the TOML file, without env overrides.
    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(DevbotConfig::default())).merge(Toml::file(path))
    }

    /// Validate cross-field constraints figment can't express.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(0.0..=1.0).contains(&self.classifier.min_confidence) {
            return Err(crate::error::DevbotError::Config(format!(
                "classifier.min_confidence must be within 0..=1, got {}",
                self.classifier.min_confidence
            )));
        }
        if self.classifier.create_intent.trim().is_empty() {
            return Err(crate::error::DevbotError::Config(
                "classifier.create_intent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.devbot/devbot.toml", home)
}
