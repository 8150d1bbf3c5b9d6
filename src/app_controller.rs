use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::Config;
use crate::build::{BuildSummary, Builder, LanguageStatus, write_step_summary};
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::keys;
use crate::language_utils;
use crate::locale::{Emitter, TranslationTable};
use crate::translation::{PipelineOptions, PromptCompleter, TranslatedFile, TranslationPipeline, TranslationService};

// @module: Application controller for locale commands

/// Options for one `translate` run
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Overwrite an existing output file
    pub force: bool,
    /// Output path instead of `<source_dir>/<target>/index.ts`
    pub output: Option<PathBuf>,
    /// Fail after writing when strings are still unresolved
    pub strict: bool,
}

/// What a `translate` run did
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateOutcome {
    /// Output already existed and `force` was not set
    Skipped(PathBuf),
    /// Output written; `unresolved` strings still fail a check
    Written { path: PathBuf, unresolved: usize },
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Locale file of the source language
    pub fn source_file(&self) -> PathBuf {
        FileManager::locale_entry_path(&self.config.paths.source_dir, &self.config.source_language)
    }

    /// Where the translated file goes
    pub fn output_file(&self, output: Option<&Path>) -> PathBuf {
        match output {
            Some(path) => path.to_path_buf(),
            None => FileManager::locale_entry_path(&self.config.paths.source_dir, &self.config.target_language),
        }
    }

    /// Translate the source locale file with the configured provider
    pub async fn run_translate(&self, options: &TranslateOptions) -> Result<TranslateOutcome> {
        self.config.validate_for_translation()?;

        let output_path = self.output_file(options.output.as_deref());
        if Self::keep_existing(&output_path, options.force) {
            return Ok(TranslateOutcome::Skipped(output_path));
        }

        let service = TranslationService::new(self.config.translation.clone())?;
        if let Err(e) = service.test_connection().await {
            warn!("Provider connection check failed: {}", e);
        }

        let mut pipeline_options = PipelineOptions::from_config(&self.config.translation);
        pipeline_options.show_progress = true;

        let outcome = self.translate_with(&service, pipeline_options, options).await;
        info!("{}", service.usage().summary());
        outcome
    }

    /// Translate with any completer, writing the output file
    pub async fn translate_with<C: PromptCompleter + ?Sized>(
        &self,
        completer: &C,
        pipeline_options: PipelineOptions,
        options: &TranslateOptions,
    ) -> Result<TranslateOutcome> {
        let start_time = Instant::now();
        let source_path = self.source_file();
        let output_path = self.output_file(options.output.as_deref());

        if Self::keep_existing(&output_path, options.force) {
            return Ok(TranslateOutcome::Skipped(output_path));
        }
        if language_utils::language_codes_match(&self.config.source_language, &self.config.target_language) {
            warn!(
                "Source and target language look the same ({} / {})",
                self.config.source_language, self.config.target_language
            );
        }

        let source = FileManager::read_to_string(&source_path)?;
        let from_identifier = self.source_identifier(&source);
        let to_identifier = Emitter::identifier_for(&self.config.target_language);
        let source_name = self.config.source_name()?;
        let target_name = self.config.target_name()?;

        info!(
            "Translating {:?} from {} to {}",
            source_path, source_name, target_name
        );

        let pipeline = TranslationPipeline::new(completer, &source_name, &target_name, pipeline_options);
        let TranslatedFile { content, report } = pipeline
            .translate(&source, &from_identifier, &to_identifier)
            .await
            .with_context(|| format!("Failed to translate {:?}", source_path))?;

        Emitter::write(&output_path, &content)?;

        info!(
            "Wrote {:?}: {} strings, {} batches ({} failed), {} retried, {} fixed in {:.1}s",
            output_path,
            report.records,
            report.batches,
            report.failed_batches,
            report.flagged.len(),
            report.retry.fixed.len(),
            start_time.elapsed().as_secs_f64()
        );

        let unresolved = report.unresolved_count();
        if unresolved > 0 {
            warn!("{} strings still need a manual look", unresolved);
            if options.strict {
                return Err(TranslationError::Unresolved(unresolved).into());
            }
        }

        Ok(TranslateOutcome::Written {
            path: output_path,
            unresolved,
        })
    }

    fn keep_existing(output_path: &Path, force: bool) -> bool {
        let exists = output_path.exists();
        if exists && !force {
            warn!("Skipping, {:?} already exists (use -f to force overwrite)", output_path);
        }
        exists && !force
    }

    fn source_identifier(&self, source: &str) -> String {
        match TranslationTable::parse(source) {
            Ok(table) => table
                .identifier
                .unwrap_or_else(|| Emitter::identifier_for(&self.config.source_language)),
            Err(e) => {
                debug!("Could not parse source table for its identifier: {}", e);
                Emitter::identifier_for(&self.config.source_language)
            }
        }
    }

    /// Check and bundle every language; returns the summary
    pub async fn run_build(&self) -> Result<BuildSummary> {
        let builder = Builder::new(&self.config);
        let summary = builder.build_all().await?;

        for line in summary.render_table().lines() {
            info!("{}", line);
        }
        if let Err(e) = write_step_summary(&summary) {
            error!("Failed to write job summary: {:#}", e);
        }

        Ok(summary)
    }

    /// Report missing keys per language without writing anything
    pub fn run_check(&self) -> Result<BuildSummary> {
        let builder = Builder::new(&self.config);
        let summary = builder.check_all()?;

        let mut incomplete = 0;
        for report in &summary.reports {
            match report.status {
                LanguageStatus::Ok => debug!("{} is complete", report.code),
                LanguageStatus::MissingKeys => {
                    incomplete += 1;
                    builder.log_missing_keys(&report.code, &report.keys.missing);
                }
                LanguageStatus::Failed => {
                    warn!(
                        "{} could not be checked: {}",
                        report.code,
                        report.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }

        if incomplete == 0 {
            info!("All {} languages have every key", summary.reports.len());
        }
        Ok(summary)
    }

    /// Regenerate the types file from the reference language
    pub fn run_keys(&self) -> Result<usize> {
        let source_path = self.source_file();
        if !FileManager::file_exists(&source_path) {
            return Err(anyhow!("Reference locale file does not exist: {:?}", source_path));
        }
        keys::write_types_file(&source_path, &self.config.paths.types_file)
    }

    /// Language directories under the source directory
    pub fn list_languages(&self) -> Vec<String> {
        let languages = FileManager::list_subdirectories(&self.config.paths.source_dir);
        for code in &languages {
            if !language_utils::is_known_locale_code(code) {
                debug!("Directory '{}' is not a known ISO 639 language code", code);
            }
        }
        languages
    }
}
