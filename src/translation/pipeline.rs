/*!
 * End-to-end translation of one locale file.
 *
 * extract -> batch translate -> consistency check -> retry -> splice -> rename
 *
 * Every stage passes an explicit id-keyed map to the next. Provider failures
 * degrade to untranslated text; only extraction can fail the run.
 */

use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::app_config::TranslationConfig;
use crate::errors::{ExtractionError, TranslationError};
use crate::locale::{Emitter, Splicer, StringExtractor};

use super::batch::{BatchItem, BatchTranslator};
use super::consistency::ConsistencyChecker;
use super::core::PromptCompleter;
use super::prompts::PromptBuilder;
use super::retry::{RetryEngine, RetryReport};

/// Tuning for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub batch_size: usize,
    pub max_tokens: u32,
    pub retry_max_tokens: u32,
    pub concurrent_requests: usize,
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&TranslationConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            batch_size: config.common.batch_size,
            max_tokens: config.common.max_tokens,
            retry_max_tokens: config.common.retry_max_tokens,
            concurrent_requests: config.concurrent_requests(),
            show_progress: false,
        }
    }
}

/// What happened during a run
#[derive(Debug, Default, Clone)]
pub struct PipelineReport {
    pub records: usize,
    pub batches: usize,
    pub failed_batches: usize,
    /// Ids sent to the retry pass
    pub flagged: BTreeSet<usize>,
    pub retry: RetryReport,
}

impl PipelineReport {
    /// Records still failing a check after the retry pass
    pub fn unresolved_count(&self) -> usize {
        self.retry.unresolved.len()
    }
}

/// Output text plus the run report
#[derive(Debug, Clone)]
pub struct TranslatedFile {
    pub content: String,
    pub report: PipelineReport,
}

/// Translates locale files through a `PromptCompleter`
pub struct TranslationPipeline<'a, C: PromptCompleter + ?Sized> {
    completer: &'a C,
    prompts: PromptBuilder,
    options: PipelineOptions,
}

impl<'a, C: PromptCompleter + ?Sized> TranslationPipeline<'a, C> {
    /// `source_name` and `target_name` are the language names used in prompts
    pub fn new(completer: &'a C, source_name: &str, target_name: &str, options: PipelineOptions) -> Self {
        Self {
            completer,
            prompts: PromptBuilder::new(source_name, target_name),
            options,
        }
    }

    /// Translate `source`, renaming the `from_identifier` binding to `to_identifier`
    pub async fn translate(
        &self,
        source: &str,
        from_identifier: &str,
        to_identifier: &str,
    ) -> Result<TranslatedFile, TranslationError> {
        let records = StringExtractor::extract(source)?;
        if records.is_empty() && !source.trim().is_empty() {
            return Err(ExtractionError::NoStrings(from_identifier.to_string()).into());
        }
        info!("Found {} strings to translate", records.len());

        let originals: BTreeMap<usize, String> = records
            .iter()
            .map(|record| (record.id, record.value.clone()))
            .collect();
        let items: Vec<BatchItem> = records
            .iter()
            .map(|record| BatchItem::new(record.id, record.value.clone()))
            .collect();

        let outcome = BatchTranslator::new(
            self.completer,
            self.prompts.clone(),
            self.options.batch_size,
            self.options.max_tokens,
        )
        .with_concurrency(self.options.concurrent_requests)
        .with_progress(self.options.show_progress)
        .translate(&items)
        .await;

        if outcome.failed_batches > 0 {
            warn!(
                "{} of {} batches failed; their strings stay untranslated unless the retry pass fixes them",
                outcome.failed_batches, outcome.batches
            );
        }

        let mut translations = outcome.translations;
        let mut flagged = outcome.flagged;
        flagged.extend(ConsistencyChecker::retry_set(&originals, &translations));

        let retry = if flagged.is_empty() {
            RetryReport::default()
        } else {
            info!("Retrying {} flagged strings one by one", flagged.len());
            RetryEngine::new(self.completer, &self.prompts, self.options.retry_max_tokens)
                .run(&flagged, &originals, &mut translations)
                .await
        };

        let spliced = Splicer::splice(source, &records, &translations);
        let content = Emitter::rename_identifier(&spliced, from_identifier, to_identifier);

        Ok(TranslatedFile {
            content,
            report: PipelineReport {
                records: records.len(),
                batches: outcome.batches,
                failed_batches: outcome.failed_batches,
                flagged,
                retry,
            },
        })
    }
}
