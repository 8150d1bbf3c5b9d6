/*!
 * AI translation of locale files.
 *
 * - `core`: completion service over the configured provider
 * - `prompts`: batch and retry prompt templates
 * - `placeholders`: placeholder token sets
 * - `formatting`: newline encoding and quote normalization
 * - `batch`: tagged batch requests and response parsing
 * - `consistency`: checks that pick strings for retry
 * - `retry`: single-string retry pass
 * - `pipeline`: the whole run for one file
 */

pub use self::batch::{BatchItem, BatchOutcome, BatchTranslator};
pub use self::consistency::{ConsistencyChecker, Issue};
pub use self::core::{PromptCompleter, TokenUsageStats, TranslationService};
pub use self::pipeline::{PipelineOptions, PipelineReport, TranslatedFile, TranslationPipeline};
pub use self::prompts::{PromptBuilder, PromptTemplate};
pub use self::retry::{RetryEngine, RetryReport};

pub mod batch;
pub mod consistency;
pub mod core;
pub mod formatting;
pub mod pipeline;
pub mod placeholders;
pub mod prompts;
pub mod retry;
