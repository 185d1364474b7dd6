use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime configuration, constructed once at startup and passed by
/// reference into the request gate and the enricher.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Key callers must present in the `x-api-key` header. When unset,
    /// every HTTP request is rejected with a configuration error; the
    /// CLI mode does not require it.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Gemini settings for step-ingredient matching
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Request timeout in seconds for outbound fetches
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User-Agent sent when fetching recipe pages; some sites block
    /// clients that do not look like a browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Configuration for the Gemini step-ingredient matcher
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key; its absence disables enrichment, not the endpoint
    pub api_key: Option<String>,
    /// Base URL for the API endpoint (for proxies and tests)
    pub base_url: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_gemini_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    2000
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with EXTRACTOR prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: EXTRACTOR__GEMINI__API_KEY.
    /// The bare EXTRACTOR_API_KEY and GEMINI_API_KEY variables are also
    /// honored, matching the names the original deployment used.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: EXTRACTOR__GEMINI__MODEL
            .add_source(
                Environment::with_prefix("EXTRACTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        if config.api_key.is_none() {
            config.api_key = std::env::var("EXTRACTOR_API_KEY").ok();
        }
        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        Ok(config)
    }
}
