/*!
 * End-to-end translation pipeline tests against the mock provider
 */

use langpack::errors::{ExtractionError, TranslationError};
use langpack::providers::mock::MockProvider;
use langpack::translation::{PipelineOptions, TranslationPipeline};

use crate::common;

const SIMPLE: &str = "const en = {\n  hello: \"Hello\",\n};\n\nexport default en as Translations;\n";

fn translate_text(text: &str) -> String {
    match text {
        "Hello" => "Bonjour",
        "Hello %{name}" => "Bonjour %{name}",
        "Switch account" => "Changer de compte",
        "Open" => "Ouvrir",
        "Save" => "Enregistrer",
        "Cancel" => "Annuler",
        "Delete" => "Supprimer",
        "Settings" => "Paramètres",
        other => other,
    }
    .to_string()
}

/// Translates every echoed line through a small dictionary, keeping ids
fn french(prompt: &str) -> String {
    MockProvider::echo(prompt)
        .lines()
        .map(|line| match line.split_once('\t') {
            Some((id, text)) => format!("{}\t{}", id, translate_text(text)),
            None => translate_text(line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Answers only the last line of every prompt
fn last_line_only(prompt: &str) -> String {
    french(prompt).lines().last().unwrap_or_default().to_string()
}

/// Drops the placeholder in the batch pass, keeps it when asked strictly
fn drops_placeholder_once(prompt: &str) -> String {
    if prompt.contains("MUST contain") {
        "Bonjour %{name}".to_string()
    } else {
        "0\tBonjour".to_string()
    }
}

/// Empty payload for the batch pass, a real answer for single retries
fn empty_batch_payload(prompt: &str) -> String {
    if prompt.contains("EXACTLY ONE line") {
        "Bonjour".to_string()
    } else {
        "0\t".to_string()
    }
}

fn pipeline(provider: &MockProvider, options: PipelineOptions) -> TranslationPipeline<'_, MockProvider> {
    TranslationPipeline::new(provider, "English", "French", options)
}

#[tokio::test]
async fn test_translate_withSimpleFile_shouldTranslateAndRename() {
    common::init_logging();
    let provider = MockProvider::scripted(french);

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(SIMPLE, "en", "fr")
        .await
        .unwrap();

    assert_eq!(
        translated.content,
        "const fr = {\n  hello: \"Bonjour\",\n};\n\nexport default fr as Translations;\n"
    );
    assert_eq!(translated.report.records, 1);
    assert_eq!(translated.report.unresolved_count(), 0);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withShortUnchangedString_shouldNotRetry() {
    let provider = MockProvider::scripted(french);
    let source = "const en = {\n  ok: \"OK\",\n  hello: \"Hello\",\n};\n\nexport default en as Translations;\n";

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(source, "en", "fr")
        .await
        .unwrap();

    assert!(translated.content.contains("ok: \"OK\","));
    assert!(translated.content.contains("hello: \"Bonjour\","));
    assert!(translated.report.flagged.is_empty());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withDroppedPlaceholder_shouldFixItInRetry() {
    let provider = MockProvider::scripted(drops_placeholder_once);
    let source = "const en = {\n  greeting: \"Hello %{name}\",\n};\n\nexport default en as Translations;\n";

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(source, "en", "fr")
        .await
        .unwrap();

    assert!(translated.content.contains("greeting: \"Bonjour %{name}\","));
    assert!(translated.report.flagged.contains(&0));
    assert!(translated.report.retry.fixed.contains(&0));
    assert_eq!(translated.report.unresolved_count(), 0);
    assert_eq!(provider.request_count(), 2);
    assert!(provider.prompts()[1].contains("%{name}"));
}

#[tokio::test]
async fn test_translate_withFailingProvider_shouldKeepOriginals() {
    let provider = MockProvider::failing();
    let source = "const en = {\n  hello: 'Hello',\n  ok: \"OK\",\n};\n\nexport default en as Translations;\n";

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(source, "en", "fr")
        .await
        .unwrap();

    assert_eq!(translated.content, source.replace("const en", "const fr").replace("default en", "default fr"));
    assert_eq!(translated.report.failed_batches, 1);
    assert_eq!(translated.report.retry.failed_requests, 1);
    assert_eq!(translated.report.retry.unresolved.iter().copied().collect::<Vec<_>>(), vec![0]);
}

#[tokio::test]
async fn test_translate_withoutStringLiterals_shouldFailExtraction() {
    let provider = MockProvider::working();

    let result = pipeline(&provider, PipelineOptions::default())
        .translate("const en = { count: 3 };\n", "en", "fr")
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::Extraction(ExtractionError::NoStrings(_)))
    ));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withConcurrentBatches_shouldKeepSourceOrder() {
    let provider = MockProvider::slow(20).with_responder(french);
    let source = "const en = {\n  save: \"Save\",\n  cancel: \"Cancel\",\n  remove: \"Delete\",\n  open: \"Open\",\n  hello: \"Hello\",\n};\n";
    let options = PipelineOptions {
        batch_size: 2,
        concurrent_requests: 3,
        ..PipelineOptions::default()
    };

    let translated = pipeline(&provider, options).translate(source, "en", "fr").await.unwrap();

    assert_eq!(
        translated.content,
        "const fr = {\n  save: \"Enregistrer\",\n  cancel: \"Annuler\",\n  remove: \"Supprimer\",\n  open: \"Ouvrir\",\n  hello: \"Bonjour\",\n};\n"
    );
    assert_eq!(translated.report.batches, 3);
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withMissingResponseLine_shouldRetryTheGap() {
    let provider = MockProvider::scripted(last_line_only);
    let source = "const en = {\n  save: \"Save\",\n  cancel: \"Cancel\",\n};\n";

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(source, "en", "fr")
        .await
        .unwrap();

    assert!(translated.content.contains("save: \"Enregistrer\","));
    assert!(translated.content.contains("cancel: \"Annuler\","));
    assert_eq!(translated.report.flagged.iter().copied().collect::<Vec<_>>(), vec![0]);
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_translate_withEmptyBatchPayload_shouldRetryTheRecord() {
    let provider = MockProvider::scripted(empty_batch_payload);

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(SIMPLE, "en", "fr")
        .await
        .unwrap();

    assert!(translated.content.contains("hello: \"Bonjour\","));
    assert!(translated.report.flagged.contains(&0));
    assert!(translated.report.retry.fixed.contains(&0));
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_translate_withNewlinesAndApostrophes_shouldEscapeForDelimiter() {
    let provider = MockProvider::scripted(|_| "0\tL'heure\\nsuivante".to_string());
    let source = "const en = {\n  next: \"Next\\nhour\",\n};\n";

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(source, "en", "fr")
        .await
        .unwrap();

    assert_eq!(translated.content, "const fr = {\n  next: \"L’heure\\nsuivante\",\n};\n");
}

#[tokio::test]
async fn test_translate_withIdentityResponses_shouldReproduceSource() {
    let provider = MockProvider::working();

    let translated = pipeline(&provider, PipelineOptions::default())
        .translate(common::EN_LOCALE, "en", "en")
        .await
        .unwrap();

    assert_eq!(translated.content, common::EN_LOCALE);
}
