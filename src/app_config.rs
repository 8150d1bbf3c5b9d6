use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// Contents of `conf.json`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Reference language code (directory name of the source locale)
    pub source_language: String,

    /// Human-readable source language name used in prompts (derived from the code when empty)
    #[serde(default)]
    pub source_language_name: String,

    /// Target language code for `translate`
    pub target_language: String,

    /// Human-readable target language name used in prompts (derived from the code when empty)
    #[serde(default)]
    pub target_language_name: String,

    /// Locale, bundle and types file locations
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub log_level: LogLevel,
}

/// Which backend answers prompts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    #[default]
    OpenAI,
    Anthropic,
    Ollama,
}

impl TranslationProvider {
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    /// Identifier used in `conf.json` and on the command line
    pub fn to_lowercase_string(&self) -> String {
        self.display_name().to_lowercase()
    }

    /// Fallback source of the API key; Ollama needs none
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!("Unknown provider '{}', expected openai, anthropic or ollama", other)),
        }
    }
}

impl TranslationProvider {
    fn default_model(&self) -> String {
        match self {
            Self::OpenAI => "gpt-4o",
            Self::Anthropic => "claude-3-5-sonnet-latest",
            Self::Ollama => "llama3.1",
        }
        .to_string()
    }

    fn default_endpoint(&self) -> String {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Ollama => "http://localhost:11434",
        }
        .to_string()
    }

    /// Requests per minute; Anthropic's standard tier allows 50
    fn default_rate_limit(&self) -> Option<u32> {
        match self {
            Self::OpenAI => Some(60),
            Self::Anthropic => Some(45),
            Self::Ollama => None,
        }
    }

    fn default_timeout_secs(&self) -> u64 {
        match self {
            Self::Ollama => 120,
            _ => default_timeout_secs(),
        }
    }
}

/// One entry of `translation.available_providers`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Lowercase provider name, matched against `translation.provider`
    #[serde(rename = "type")]
    pub provider_type: String,

    #[serde(default)]
    pub model: String,

    /// Empty means the provider's environment variable
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub endpoint: String,

    /// Batches in flight at once
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Requests per minute
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    pub fn new(provider: TranslationProvider) -> Self {
        Self {
            provider_type: provider.to_lowercase_string(),
            model: provider.default_model(),
            api_key: String::new(),
            endpoint: provider.default_endpoint(),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: provider.default_timeout_secs(),
            rate_limit: provider.default_rate_limit(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathsConfig {
    /// Holds one `<code>/index.ts` per language
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Receives one bundle per language
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Generated `TranslationKeys` enum
    #[serde(default = "default_types_file")]
    pub types_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            types_file: default_types_file(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Active backend
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Per-provider settings; the active one is looked up by `type`
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Prompt and retry settings shared by every provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Records per batch prompt
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Sampling temperature, 0.0 to 2.0
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token budget for a batch request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Token budget for a single-string retry request
    #[serde(default = "default_retry_max_tokens")]
    pub retry_max_tokens: u32,

    /// Transport-level attempts after the first one
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// First backoff delay, doubled on each attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retry_max_tokens: default_retry_max_tokens(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BuildConfig {
    /// External bundler command; `{entry}`, `{outdir}` and `{language}` are substituted
    #[serde(default)]
    pub bundler_command: Option<String>,

    /// Number of missing keys listed per language before truncating
    #[serde(default = "default_max_missing_keys_shown")]
    pub max_missing_keys_shown: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            bundler_command: None,
            max_missing_keys_shown: default_max_missing_keys_shown(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("languages")
}

fn default_types_file() -> PathBuf {
    PathBuf::from("src/types.ts")
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    50
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_retry_max_tokens() -> u32 {
    1500
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_missing_keys_shown() -> usize {
    20
}

impl Config {
    /// Load the config file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("No config at {:?}, writing defaults", path);
            let config = Config::default();
            let json = serde_json::to_string_pretty(&config).context("Failed to serialize default config")?;
            std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            return Ok(config);
        }

        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("Invalid config in {:?}", path))
    }

    /// Validate settings shared by every command
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("source_language must not be empty"));
        }
        if self.translation.common.batch_size == 0 {
            return Err(anyhow!("translation.common.batch_size must be greater than 0"));
        }
        let temperature = self.translation.common.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(anyhow!(
                "translation.common.temperature must be between 0.0 and 2.0, got {}",
                temperature
            ));
        }
        Ok(())
    }

    /// Validate what `translate` additionally needs: language names and credentials
    pub fn validate_for_translation(&self) -> Result<()> {
        self.validate()?;

        if self.target_language.trim().is_empty() {
            return Err(anyhow!("target_language must not be empty"));
        }
        self.source_name()?;
        self.target_name()?;

        let endpoint = self.translation.get_endpoint();
        let with_scheme = if endpoint.contains("://") {
            endpoint.clone()
        } else {
            format!("http://{}", endpoint)
        };
        Url::parse(&with_scheme)
            .with_context(|| format!("Invalid endpoint for {} provider: {}", self.translation.provider, endpoint))?;

        if let Some(env_var) = self.translation.provider.api_key_env_var() {
            if self.translation.get_api_key().is_empty() {
                return Err(anyhow!(
                    "Translation API key is required for {} provider (config api_key or {})",
                    self.translation.provider.display_name(),
                    env_var
                ));
            }
        }

        Ok(())
    }

    /// Source language name for prompts
    pub fn source_name(&self) -> Result<String> {
        crate::language_utils::resolve_language_name(
            &self.source_language,
            Some(&self.source_language_name),
        )
    }

    /// Target language name for prompts
    pub fn target_name(&self) -> Result<String> {
        crate::language_utils::resolve_language_name(
            &self.target_language,
            Some(&self.target_language_name),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            source_language_name: String::new(),
            target_language: "fr".to_string(),
            target_language_name: String::new(),
            paths: PathsConfig::default(),
            translation: TranslationConfig::default(),
            build: BuildConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    pub fn get_provider_config(&self, provider: &TranslationProvider) -> Option<&ProviderConfig> {
        let name = provider.to_lowercase_string();
        self.available_providers.iter().find(|p| p.provider_type == name)
    }

    /// Mutable access to the active provider's configuration, inserting defaults if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers
                    .push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Max concurrent batch requests for the active provider
    pub fn concurrent_requests(&self) -> usize {
        self.get_active_provider_config()
            .map(|p| p.concurrent_requests)
            .unwrap_or_else(default_concurrent_requests)
            .max(1)
    }

    /// Configured model, or the provider default when blank
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Configured key, or the provider's environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(key) = self
            .get_active_provider_config()
            .map(|p| p.api_key.clone())
            .filter(|key| !key.is_empty())
        {
            return key;
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .unwrap_or_default()
    }

    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or_else(|| self.provider.default_endpoint())
    }

    /// Request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// An explicit provider entry wins, even with no limit set
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_provider_config() {
            Some(provider_config) => provider_config.rate_limit,
            None => self.provider.default_rate_limit(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
