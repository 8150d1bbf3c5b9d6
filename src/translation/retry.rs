/*!
 * Single-string retry pass for flagged translations.
 */

use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

use super::batch::normalize_payload;
use super::consistency::ConsistencyChecker;
use super::core::PromptCompleter;
use super::prompts::PromptBuilder;

/// Outcome of the retry pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RetryReport {
    /// Retries that came back clean
    pub fixed: BTreeSet<usize>,
    /// Ids still failing a check after the pass (including failed requests)
    pub unresolved: BTreeSet<usize>,
    /// Requests that errored or returned nothing
    pub failed_requests: usize,
}

/// Re-requests flagged records one at a time with a stricter prompt
pub struct RetryEngine<'a, C: PromptCompleter + ?Sized> {
    completer: &'a C,
    prompts: &'a PromptBuilder,
    max_tokens: u32,
}

impl<'a, C: PromptCompleter + ?Sized> RetryEngine<'a, C> {
    pub fn new(completer: &'a C, prompts: &'a PromptBuilder, max_tokens: u32) -> Self {
        Self {
            completer,
            prompts,
            max_tokens,
        }
    }

    /// Retry every id in `flagged` in ascending order, updating `translations` in place
    pub async fn run(
        &self,
        flagged: &BTreeSet<usize>,
        originals: &BTreeMap<usize, String>,
        translations: &mut BTreeMap<usize, String>,
    ) -> RetryReport {
        let mut report = RetryReport::default();

        for id in flagged {
            let Some(original) = originals.get(id) else {
                continue;
            };

            let prompt = self.prompts.retry_prompt(original);
            match self.completer.complete_prompt(&prompt, self.max_tokens).await {
                Ok(response) => match parse_retry_response(&response, *id) {
                    Some(retried) => {
                        translations.insert(*id, retried);
                    }
                    None => {
                        warn!("Retry for {} returned nothing, keeping the previous value", id);
                        report.failed_requests += 1;
                    }
                },
                Err(e) => {
                    warn!("Retry error for {:?}: {}", original, e);
                    report.failed_requests += 1;
                }
            }

            let current = translations.get(id).unwrap_or(original);
            let issues = ConsistencyChecker::issues(original, current);
            if issues.is_empty() {
                info!("Retry worked for: {:?}", original);
                report.fixed.insert(*id);
            } else {
                let reasons: Vec<String> = issues.iter().map(ToString::to_string).collect();
                warn!(
                    "Still failing after retry ({}): {:?} -> {:?}",
                    reasons.join(", "),
                    original,
                    current
                );
                report.unresolved.insert(*id);
            }
        }

        report
    }
}

/// First non-empty line of the response, with an echoed `<id>\t` prefix removed
pub fn parse_retry_response(response: &str, id: usize) -> Option<String> {
    let line = response.lines().map(str::trim).find(|line| !line.is_empty())?;

    let prefix = format!("{}\t", id);
    let payload = line.strip_prefix(&prefix).unwrap_or(line);
    if payload != line {
        debug!("Stripped echoed id from retry response for {}", id);
    }

    let normalized = normalize_payload(payload);
    (!normalized.is_empty()).then_some(normalized)
}
