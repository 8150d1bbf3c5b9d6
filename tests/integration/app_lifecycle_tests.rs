/*!
 * Controller commands over a temporary locale directory
 */

use anyhow::Result;

use crate::common::{self, EN_LOCALE};
use langpack::app_controller::{Controller, TranslateOptions, TranslateOutcome};
use langpack::build::LanguageStatus;
use langpack::file_utils::FileManager;
use langpack::providers::mock::MockProvider;
use langpack::translation::PipelineOptions;

const FR_LOCALE: &str = r#"const fr = {
  switchAccount: "Changer de compte",
  greeting: "Bonjour %{name}",
  ok: "OK",
};

export default fr as Translations;
"#;

const BROKEN_LOCALE: &str = "const de = {\n  switchAccount: \"Konto wechseln\"\n  ok: \"OK\"\n};\n";

fn echo_with_prefix(prompt: &str) -> String {
    MockProvider::echo(prompt)
        .lines()
        .map(|line| match line.split_once('\t') {
            Some((id, text)) => format!("{}\t[fr] {}", id, text),
            None => format!("[fr] {}", line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_translate_with_shouldWriteTargetFileAndRespectForce() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;
    let provider = MockProvider::scripted(echo_with_prefix);

    let outcome = controller
        .translate_with(&provider, PipelineOptions::default(), &TranslateOptions::default())
        .await?;
    let output = temp_dir.path().join("src/fr/index.ts");
    assert_eq!(
        outcome,
        TranslateOutcome::Written {
            path: output.clone(),
            unresolved: 0
        }
    );

    let content = FileManager::read_to_string(&output)?;
    assert!(content.contains("const fr = {"));
    assert!(content.contains("switchAccount: \"[fr] Switch account\","));
    assert!(content.contains("export default fr as Translations;"));

    let second = controller
        .translate_with(&provider, PipelineOptions::default(), &TranslateOptions::default())
        .await?;
    assert_eq!(second, TranslateOutcome::Skipped(output.clone()));
    assert_eq!(provider.request_count(), 1);

    let forced = TranslateOptions {
        force: true,
        ..TranslateOptions::default()
    };
    controller.translate_with(&provider, PipelineOptions::default(), &forced).await?;
    assert_eq!(provider.request_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_translate_with_strictAndUnresolved_shouldFailAfterWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;
    let provider = MockProvider::working();
    let output = temp_dir.path().join("out/fr.ts");
    let options = TranslateOptions {
        output: Some(output.clone()),
        strict: true,
        ..TranslateOptions::default()
    };

    let result = controller.translate_with(&provider, PipelineOptions::default(), &options).await;

    assert!(result.is_err());
    assert!(output.exists());

    Ok(())
}

#[test]
fn test_run_check_shouldReportEachLanguage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    common::create_locale(temp_dir.path(), "fr", FR_LOCALE)?;
    common::create_locale(temp_dir.path(), "de", BROKEN_LOCALE)?;
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;

    let summary = controller.run_check()?;
    let statuses: Vec<(&str, LanguageStatus)> = summary
        .reports
        .iter()
        .map(|report| (report.code.as_str(), report.status))
        .collect();

    assert_eq!(
        statuses,
        vec![
            ("de", LanguageStatus::Failed),
            ("en", LanguageStatus::Ok),
            ("fr", LanguageStatus::MissingKeys),
        ]
    );
    assert_eq!(summary.reports[2].keys.missing, vec!["menu.open".to_string()]);
    assert!(!temp_dir.path().join("languages").exists());

    Ok(())
}

#[tokio::test]
async fn test_run_build_withoutBundler_shouldWriteJsonBundles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    common::create_locale(temp_dir.path(), "fr", FR_LOCALE)?;
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;

    let summary = controller.run_build().await?;

    assert!(!summary.should_fail(false));
    assert!(summary.should_fail(true));

    let bundle = FileManager::read_to_string(temp_dir.path().join("languages/en/index.json"))?;
    let json: serde_json::Value = serde_json::from_str(&bundle)?;
    assert_eq!(json["menu"]["open"], "Open");
    assert_eq!(json["greeting"], "Hello %{name}");
    assert!(temp_dir.path().join("languages/fr/index.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_run_build_withBrokenLanguage_shouldFailButBuildOthers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    common::create_locale(temp_dir.path(), "de", BROKEN_LOCALE)?;
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;

    let summary = controller.run_build().await?;

    assert!(summary.should_fail(false));
    assert!(summary.reports[0].error.is_some());
    assert!(temp_dir.path().join("languages/en/index.json").exists());
    assert!(!temp_dir.path().join("languages/de").exists());

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_build_withBundlerCommand_shouldRunItPerLanguage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    let mut config = common::config_for(temp_dir.path());
    config.build.bundler_command = Some("mkdir -p '{outdir}' && cp '{entry}' '{outdir}/{language}.ts'".to_string());
    let controller = Controller::with_config(config)?;

    let summary = controller.run_build().await?;

    assert_eq!(summary.reports[0].status, LanguageStatus::Ok);
    assert_eq!(
        FileManager::read_to_string(temp_dir.path().join("languages/en/en.ts"))?,
        EN_LOCALE
    );

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_build_withFailingBundler_shouldMarkLanguageFailed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    let mut config = common::config_for(temp_dir.path());
    config.build.bundler_command = Some("echo 'cannot bundle {language}' >&2; exit 3".to_string());
    let controller = Controller::with_config(config)?;

    let summary = controller.run_build().await?;

    assert_eq!(summary.reports[0].status, LanguageStatus::Failed);
    assert!(summary.reports[0].error.as_deref().unwrap_or_default().contains("cannot bundle en"));
    assert!(summary.should_fail(false));

    Ok(())
}

#[test]
fn test_run_keys_shouldWriteConfiguredTypesFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;

    assert_eq!(controller.run_keys()?, 4);
    let types = FileManager::read_to_string(temp_dir.path().join("src/types.ts"))?;
    assert!(types.contains("Greeting = \"greeting\""));

    Ok(())
}

#[test]
fn test_run_keys_withoutReference_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;
    assert!(controller.run_keys().is_err());
    Ok(())
}

#[test]
fn test_list_languages_shouldReturnSortedDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for code in ["fr", "en", "pt-BR"] {
        common::create_locale(temp_dir.path(), code, EN_LOCALE)?;
    }
    let controller = Controller::with_config(common::config_for(temp_dir.path()))?;

    assert_eq!(controller.list_languages(), vec!["en", "fr", "pt-BR"]);

    Ok(())
}
