/*!
 * Batch translation processing.
 *
 * Records are grouped into fixed-size batches, each sent as one tagged
 * prompt. Batches may run concurrently; results are merged by record id so
 * completion order never matters.
 */

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Instant;

use super::core::PromptCompleter;
use super::formatting::{decode_newlines, force_curly_quotes};
use super::placeholders::placeholders_match;
use super::prompts::PromptBuilder;

static TAGGED_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\t(.*)$").expect("Invalid tagged line regex"));

/// One string to translate
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub id: usize,
    pub text: String,
}

impl BatchItem {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Merged result of every batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Translation per id; originals where a batch failed or an id was missing
    pub translations: BTreeMap<usize, String>,
    /// Ids whose translation changed the placeholder set
    pub flagged: BTreeSet<usize>,
    /// Number of batches whose provider call failed
    pub failed_batches: usize,
    /// Total number of batches sent
    pub batches: usize,
}

/// Result of a single batch
struct BatchResult {
    translations: Vec<(usize, String)>,
    flagged: Vec<usize>,
    failed: bool,
}

/// Batch translator for locale strings
pub struct BatchTranslator<'a, C: PromptCompleter + ?Sized> {
    completer: &'a C,
    prompts: PromptBuilder,
    batch_size: usize,
    max_tokens: u32,
    max_concurrent_requests: usize,
    show_progress: bool,
}

impl<'a, C: PromptCompleter + ?Sized> BatchTranslator<'a, C> {
    /// Create a new batch translator
    pub fn new(completer: &'a C, prompts: PromptBuilder, batch_size: usize, max_tokens: u32) -> Self {
        Self {
            completer,
            prompts,
            batch_size: batch_size.max(1),
            max_tokens,
            max_concurrent_requests: 1,
            show_progress: false,
        }
    }

    /// Allow up to `requests` batches in flight at once
    pub fn with_concurrency(mut self, requests: usize) -> Self {
        self.max_concurrent_requests = requests.max(1);
        self
    }

    /// Show a progress bar on stderr while batches run
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Translate all items, batch by batch
    pub async fn translate(&self, items: &[BatchItem]) -> BatchOutcome {
        let batches: Vec<&[BatchItem]> = items.chunks(self.batch_size).collect();
        let total_batches = batches.len();
        let progress_bar = self.progress_bar(total_batches as u64);

        let results = stream::iter(batches.into_iter().enumerate())
            .map(|(batch_index, batch)| {
                let progress_bar = progress_bar.clone();
                async move {
                    let start_time = Instant::now();
                    let result = self.translate_batch(batch, batch_index, total_batches).await;
                    debug!(
                        "Batch {}/{} finished in {:?}",
                        batch_index + 1,
                        total_batches,
                        start_time.elapsed()
                    );
                    if let Some(progress_bar) = &progress_bar {
                        progress_bar.inc(1);
                    }
                    (batch_index, result)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        if let Some(progress_bar) = &progress_bar {
            progress_bar.finish_and_clear();
        }

        let mut sorted_results = results;
        sorted_results.sort_by_key(|(index, _)| *index);

        let mut outcome = BatchOutcome {
            batches: total_batches,
            ..BatchOutcome::default()
        };
        for (_, result) in sorted_results {
            outcome.translations.extend(result.translations);
            outcome.flagged.extend(result.flagged);
            if result.failed {
                outcome.failed_batches += 1;
            }
        }
        outcome
    }

    async fn translate_batch(&self, batch: &[BatchItem], batch_index: usize, total_batches: usize) -> BatchResult {
        let pairs: Vec<(usize, &str)> = batch.iter().map(|item| (item.id, item.text.as_str())).collect();
        let prompt = self.prompts.batch_prompt(&pairs);

        let response = match self.completer.complete_prompt(&prompt, self.max_tokens).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Batch {}/{} failed, keeping {} original strings: {}",
                    batch_index + 1,
                    total_batches,
                    batch.len(),
                    e
                );
                return BatchResult {
                    translations: batch.iter().map(|item| (item.id, item.text.clone())).collect(),
                    flagged: Vec::new(),
                    failed: true,
                };
            }
        };

        let parsed = parse_batch_response(&response, batch);
        if parsed.len() < batch.len() {
            warn!(
                "Batch {}/{}: expected {} lines but got {}. Keeping originals for the missing ones.",
                batch_index + 1,
                total_batches,
                batch.len(),
                parsed.len()
            );
        }

        let mut translations = Vec::with_capacity(batch.len());
        let mut flagged = Vec::new();
        for item in batch {
            let translated = match parsed.get(&item.id) {
                Some(translated) => translated.clone(),
                None => item.text.clone(),
            };
            if !placeholders_match(&item.text, &translated) {
                debug!("Placeholder mismatch for {}: {:?} -> {:?}", item.id, item.text, translated);
                flagged.push(item.id);
            }
            translations.push((item.id, translated));
        }

        BatchResult {
            translations,
            flagged,
            failed: false,
        }
    }

    fn progress_bar(&self, total: u64) -> Option<ProgressBar> {
        if !self.show_progress || total == 0 {
            return None;
        }
        let progress_bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=> "));
        Some(progress_bar)
    }
}

/// Map a provider response back to the ids of `batch`.
///
/// Lines of the form `<id>\t<text>` are matched by id; unknown ids and
/// repeated ids are ignored. When the response has no tagged lines at all but
/// exactly one line per item, lines are taken positionally.
pub fn parse_batch_response(response: &str, batch: &[BatchItem]) -> BTreeMap<usize, String> {
    let expected: HashSet<usize> = batch.iter().map(|item| item.id).collect();
    let mut parsed = BTreeMap::new();
    let mut tagged_lines = 0;

    for line in response.lines() {
        let Some(captures) = TAGGED_LINE_REGEX.captures(line) else {
            continue;
        };
        tagged_lines += 1;
        let Ok(id) = captures[1].parse::<usize>() else {
            continue;
        };
        if !expected.contains(&id) {
            debug!("Ignoring unknown id {} in response", id);
            continue;
        }
        let text = normalize_payload(&captures[2]);
        if text.is_empty() {
            debug!("Ignoring empty payload for id {}", id);
            continue;
        }
        parsed.entry(id).or_insert(text);
    }

    if tagged_lines == 0 {
        let lines: Vec<&str> = response
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if !lines.is_empty() && lines.len() == batch.len() {
            warn!("Response has no ids; mapping {} lines by position", lines.len());
            for (item, line) in batch.iter().zip(lines) {
                parsed.insert(item.id, normalize_payload(line));
            }
        }
    }

    parsed
}

/// Decode `\n`, trim, and force curly quotes
pub fn normalize_payload(payload: &str) -> String {
    force_curly_quotes(decode_newlines(payload.trim()).trim())
}
