/*!
 * Key checks and bundling for every language directory.
 *
 * The reference language's leaf paths are the canonical key set. Every
 * language is parsed with the locale table parser and compared against it,
 * then bundled either through a configured external command or as a nested
 * JSON file.
 */

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use tokio::process::Command;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::locale::TranslationTable;

/// Environment variable naming the CI job summary file
pub const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// File written by the built-in bundler
pub const JSON_BUNDLE_FILE: &str = "index.json";

const BUNDLER_TIMEOUT: Duration = Duration::from_secs(300);

/// Result of building one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageStatus {
    Ok,
    MissingKeys,
    Failed,
}

impl LanguageStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            LanguageStatus::Ok => "✅",
            LanguageStatus::MissingKeys => "⚠️",
            LanguageStatus::Failed => "❌",
        }
    }
}

impl fmt::Display for LanguageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageStatus::Ok => write!(f, "ok"),
            LanguageStatus::MissingKeys => write!(f, "missing keys"),
            LanguageStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Key comparison against the canonical set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    /// Canonical keys the language lacks, in canonical order
    pub missing: Vec<String>,
    /// Keys the language has that the canonical set does not, in source order
    pub extra: Vec<String>,
}

impl KeyDiff {
    pub fn compare(canonical: &[String], own: &[String]) -> Self {
        let own_set: HashSet<&str> = own.iter().map(String::as_str).collect();
        let canonical_set: HashSet<&str> = canonical.iter().map(String::as_str).collect();

        Self {
            missing: canonical
                .iter()
                .filter(|key| !own_set.contains(key.as_str()))
                .cloned()
                .collect(),
            extra: own
                .iter()
                .filter(|key| !canonical_set.contains(key.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Per-language outcome of a check or build
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageReport {
    pub code: String,
    pub status: LanguageStatus,
    pub keys: KeyDiff,
    pub error: Option<String>,
}

impl LanguageReport {
    fn failed(code: &str, error: String) -> Self {
        Self {
            code: code.to_string(),
            status: LanguageStatus::Failed,
            keys: KeyDiff::default(),
            error: Some(error),
        }
    }
}

/// Reports for every language, in directory order
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub reports: Vec<LanguageReport>,
}

impl BuildSummary {
    /// Whether the run should exit non-zero
    pub fn should_fail(&self, deny_missing: bool) -> bool {
        self.reports.iter().any(|report| match report.status {
            LanguageStatus::Failed => true,
            LanguageStatus::MissingKeys => deny_missing,
            LanguageStatus::Ok => false,
        })
    }

    /// Rows of (language, status symbol, missing key count)
    fn rows(&self) -> Vec<(String, &'static str, String)> {
        self.reports
            .iter()
            .map(|report| {
                let missing = match report.status {
                    LanguageStatus::Failed => "-".to_string(),
                    _ => report.keys.missing.len().to_string(),
                };
                (report.code.clone(), report.status.symbol(), missing)
            })
            .collect()
    }

    /// Plain-text table for the terminal
    pub fn render_table(&self) -> String {
        let rows = self.rows();
        let width = rows
            .iter()
            .map(|(code, _, _)| code.chars().count())
            .chain(std::iter::once("Language".len()))
            .max()
            .unwrap_or(0);

        let mut out = format!("{:<width$} | Status | Missing keys\n", "Language", width = width);
        out.push_str(&format!("{}-+--------+-------------\n", "-".repeat(width)));
        for (code, status, missing) in rows {
            out.push_str(&format!("{:<width$} | {:<6} | {}\n", code, status, missing, width = width));
        }
        out
    }

    /// Markdown table for CI job summaries
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Build summary\n\n| Language | Status | Missing keys |\n| --- | --- | --- |\n");
        for (code, status, missing) in self.rows() {
            out.push_str(&format!("| {} | {} | {} |\n", code, status, missing));
        }
        out
    }
}

/// Checks and bundles the languages under the configured source directory
pub struct Builder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    reference_language: String,
    bundler_command: Option<String>,
    max_missing_keys_shown: usize,
}

impl Builder {
    pub fn new(config: &Config) -> Self {
        Self {
            source_dir: config.paths.source_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            reference_language: config.source_language.clone(),
            bundler_command: config
                .build
                .bundler_command
                .clone()
                .filter(|command| !command.trim().is_empty()),
            max_missing_keys_shown: config.build.max_missing_keys_shown,
        }
    }

    /// Language codes with a directory under the source directory
    pub fn languages(&self) -> Vec<String> {
        FileManager::list_subdirectories(&self.source_dir)
    }

    fn parse_language(&self, code: &str) -> Result<TranslationTable> {
        let path = FileManager::locale_entry_path(&self.source_dir, code);
        let source = FileManager::read_to_string(&path)?;
        TranslationTable::parse(&source).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Leaf paths of the reference language
    pub fn canonical_keys(&self) -> Result<Vec<String>> {
        let table = self.parse_language(&self.reference_language).with_context(|| {
            format!("Reference language '{}' could not be loaded", self.reference_language)
        })?;
        Ok(table.leaf_paths())
    }

    /// Parse one language and compare its keys
    pub fn check_language(&self, code: &str, canonical: &[String]) -> (LanguageReport, Option<TranslationTable>) {
        match self.parse_language(code) {
            Ok(table) => {
                let keys = KeyDiff::compare(canonical, &table.leaf_paths());
                let status = if keys.is_complete() {
                    LanguageStatus::Ok
                } else {
                    LanguageStatus::MissingKeys
                };
                let report = LanguageReport {
                    code: code.to_string(),
                    status,
                    keys,
                    error: None,
                };
                (report, Some(table))
            }
            Err(e) => {
                error!("Error parsing {}: {:#}", code, e);
                (LanguageReport::failed(code, format!("{:#}", e)), None)
            }
        }
    }

    /// Compare every language against the reference without writing anything
    pub fn check_all(&self) -> Result<BuildSummary> {
        let canonical = self.canonical_keys()?;
        let reports = self
            .languages()
            .iter()
            .map(|code| self.check_language(code, &canonical).0)
            .collect();
        Ok(BuildSummary { reports })
    }

    /// Check and bundle every language
    pub async fn build_all(&self) -> Result<BuildSummary> {
        let languages = self.languages();
        info!("Language folders found in {:?}: {}", self.source_dir, languages.join(", "));

        let canonical = self.canonical_keys()?;
        let mut summary = BuildSummary::default();

        for code in &languages {
            let (mut report, table) = self.check_language(code, &canonical);

            if let Some(table) = table {
                match self.bundle(code, &table).await {
                    Ok(()) => self.log_status(&report),
                    Err(e) => {
                        error!("Error building {}: {:#}", code, e);
                        report.status = LanguageStatus::Failed;
                        report.error = Some(format!("{:#}", e));
                    }
                }
            }

            summary.reports.push(report);
        }

        Ok(summary)
    }

    fn log_status(&self, report: &LanguageReport) {
        match report.status {
            LanguageStatus::Ok => info!("Built {} successfully.", report.code),
            LanguageStatus::MissingKeys => {
                warn!("Built {} with missing keys.", report.code);
                self.log_missing_keys(&report.code, &report.keys.missing);
            }
            LanguageStatus::Failed => {}
        }
        if !report.keys.extra.is_empty() {
            debug!("{} has {} keys unknown to the reference", report.code, report.keys.extra.len());
        }
    }

    /// Log the first `max_missing_keys_shown` missing keys of a language
    pub fn log_missing_keys(&self, code: &str, missing: &[String]) {
        info!("Missing {} keys in {}:", missing.len(), code);
        let shown = missing.len().min(self.max_missing_keys_shown);
        info!("{}", missing[..shown].join(", "));
        if missing.len() > shown {
            info!("and {} more...", missing.len() - shown);
        }
    }

    async fn bundle(&self, code: &str, table: &TranslationTable) -> Result<()> {
        let outdir = self.output_dir.join(code);
        match &self.bundler_command {
            Some(template) => {
                let entry = FileManager::locale_entry_path(&self.source_dir, code);
                let command = expand_bundler_command(template, &entry, &outdir, code);
                run_shell(&command).await
            }
            None => {
                let json = serde_json::to_string_pretty(&table.to_json())
                    .context("Failed to serialize locale table")?;
                FileManager::write_atomic(outdir.join(JSON_BUNDLE_FILE), &format!("{}\n", json))
            }
        }
    }
}

/// Substitute `{entry}`, `{outdir}` and `{language}` in a bundler command
pub fn expand_bundler_command(template: &str, entry: &Path, outdir: &Path, language: &str) -> String {
    template
        .replace("{entry}", &entry.to_string_lossy())
        .replace("{outdir}", &outdir.to_string_lossy())
        .replace("{language}", language)
}

async fn run_shell(command: &str) -> Result<()> {
    run_shell_with_timeout(command, BUNDLER_TIMEOUT).await
}

async fn run_shell_with_timeout(command: &str, timeout: Duration) -> Result<()> {
    debug!("Running bundler: {}", command);

    let mut process = if cfg!(windows) {
        let mut process = Command::new("cmd");
        process.args(["/C", command]);
        process
    } else {
        let mut process = Command::new("sh");
        process.args(["-c", command]);
        process
    };
    // The child dies with the future when the timeout branch wins
    process.kill_on_drop(true);

    let output = tokio::select! {
        result = process.output() => {
            result.map_err(|e| anyhow!("Failed to execute bundler command: {}", e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("Bundler command timed out after {:?}", timeout));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(anyhow!(
            "Bundler exited with {}: {}",
            output.status,
            message.trim()
        ));
    }

    Ok(())
}

/// Append the Markdown summary to `$GITHUB_STEP_SUMMARY` when it is set
pub fn write_step_summary(summary: &BuildSummary) -> Result<()> {
    match env::var(STEP_SUMMARY_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            FileManager::append_with_timestamp(&path, &summary.to_markdown())?;
            debug!("Build summary appended to {}", path);
            Ok(())
        }
        _ => Ok(()),
    }
}
