/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::str::FromStr;

use crate::common;
use langpack::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};

#[test]
fn test_default_config_shouldUseDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.common.batch_size, 50);
    assert_eq!(config.translation.common.max_tokens, 2000);
    assert_eq!(config.translation.common.retry_max_tokens, 1500);
    assert!((config.translation.common.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.translation.get_model(), "gpt-4o");
    assert_eq!(config.translation.concurrent_requests(), 1);
    assert_eq!(config.build.max_missing_keys_shown, 20);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = Config::default();
    config.translation.common.batch_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withOutOfRangeTemperature_shouldFail() {
    let mut config = Config::default();
    config.translation.common.temperature = 2.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_for_translation_withUnknownCodeAndNoName_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.target_language = "ptbr".to_string();
    assert!(config.validate_for_translation().is_err());

    config.target_language_name = "Brazilian Portuguese".to_string();
    assert!(config.validate_for_translation().is_ok());
    assert_eq!(config.target_name().unwrap(), "Brazilian Portuguese");
}

#[test]
fn test_validate_for_translation_withExplicitApiKey_shouldPass() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate_for_translation().is_ok());
    assert_eq!(config.translation.get_api_key(), "sk-test");
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefault() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.source_language, created.source_language);
    assert_eq!(loaded.translation.available_providers.len(), 3);

    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
  "source_language": "en",
  "target_language": "de",
  "translation": { "provider": "anthropic", "common": { "batch_size": 10 } },
  "build": { "bundler_command": "esbuild {entry} --outdir={outdir}" }
}"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.target_language, "de");
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.translation.common.batch_size, 10);
    assert_eq!(config.translation.common.retry_max_tokens, 1500);
    assert_eq!(config.translation.get_model(), "claude-3-5-sonnet-latest");
    assert_eq!(config.paths.types_file, std::path::Path::new("src/types.ts"));
    assert_eq!(config.build.bundler_command.as_deref(), Some("esbuild {entry} --outdir={outdir}"));

    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_provider_from_str_shouldBeCaseInsensitive() {
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("ollama").unwrap(), TranslationProvider::Ollama);
    assert!(TranslationProvider::from_str("lmstudio").is_err());
}

#[test]
fn test_provider_config_new_shouldSetProviderDefaults() {
    let ollama = ProviderConfig::new(TranslationProvider::Ollama);
    assert_eq!(ollama.provider_type, "ollama");
    assert_eq!(ollama.rate_limit, None);
    assert_eq!(ollama.timeout_secs, 120);

    let anthropic = ProviderConfig::new(TranslationProvider::Anthropic);
    assert_eq!(anthropic.rate_limit, Some(45));
}

#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldInsertDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::Ollama;

    config.translation.active_provider_config_mut().model = "qwen2.5".to_string();
    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "qwen2.5");
}
