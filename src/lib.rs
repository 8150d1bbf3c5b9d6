/*!
 * # langpack
 *
 * Tooling for a repository of per-language TypeScript locale modules
 * (`src/<code>/index.ts`, each a single `const <code> = { ... }` object).
 *
 * The `translate` command asks an LLM (OpenAI, Anthropic or a local Ollama)
 * for a new language and writes a file that differs from the reference only
 * inside string literals. Strings that lose a `%{placeholder}` or come back
 * untranslated get a second, one-string-at-a-time attempt.
 *
 * The remaining commands need no network: `check` lists missing keys per
 * language, `build` bundles every language and `keys` regenerates the
 * `TranslationKeys` enum.
 *
 * Entry points are [`Controller`] for whole commands and
 * [`TranslationPipeline`] for translating a source string with any
 * [`translation::PromptCompleter`].
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod build;
pub mod errors;
pub mod file_utils;
pub mod keys;
pub mod language_utils;
pub mod locale;
pub mod providers;
pub mod translation;

pub use app_config::Config;
pub use app_controller::{Controller, TranslateOptions, TranslateOutcome};
pub use errors::{ExtractionError, LocaleError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use locale::{StringExtractor, StringRecord, TranslationTable};
pub use translation::{TranslationPipeline, TranslationService};
