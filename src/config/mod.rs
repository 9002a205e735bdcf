use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub storage: StorageConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound on stored characters (keys + values), like a browser origin quota.
    pub quota_chars: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub page_size: usize,
    pub mirror_debounce_ms: u64,
    pub view_window_ms: i64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            page_size: 3,
            mirror_debounce_ms: 300,
            view_window_ms: 86_400_000,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("storage.url", "sqlite://dongmun.db")?
            .set_default("storage.max_connections", 5)?
            .set_default("storage.quota_chars", 5_242_880)?
            .set_default("content.page_size", 3)?
            .set_default("content.mirror_debounce_ms", 300)?
            .set_default("content.view_window_ms", 86_400_000)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with DONGMUN__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("DONGMUN").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                url: "sqlite://dongmun.db".to_string(),
                max_connections: 5,
                quota_chars: Some(5_242_880),
            },
            content: ContentConfig::default(),
        }
    }
}
