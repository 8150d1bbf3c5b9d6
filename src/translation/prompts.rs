/*!
 * Prompt templates for locale string translation.
 *
 * Batch prompts list one record per line as `<id>\t<text>` and ask for the
 * same shape back. Retry prompts carry a single string and enumerate its
 * placeholders explicitly.
 */

use crate::translation::formatting::encode_newlines;
use crate::translation::placeholders::placeholder_set;

/// Prompt template with `{source_language}` and `{target_language}` variables
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Instructions for a tagged batch
    pub const BATCH_TRANSLATOR: &'static str = r#"Translate the following {count} strings from {source_language} to {target_language}.
Each input line has the form <id><TAB><text>. Return exactly one line per input line, in the same <id><TAB><translation> format, keeping every id unchanged.
Preserve placeholders such as %{provider}, {name} and $variable exactly as written.
A literal \n inside a string is a line break: keep it as \n in the same position.
If a string contains curly quotes (“ ” or ‘ ’), use curly quotes in the translation as well.
Always translate phrases like "2 days from now", "1 week from now" or "6 months from now" to the target language, keeping the numbers the same.
Do not translate code comments like // or /* comments */.
Do not translate company names, brand names, prices, or technical abbreviations such as 'API' 'h1' or 'h2'.
Return ONLY the translated lines. Do not add quotes, keys or explanations."#;

    /// Instructions for a single-string retry
    pub const RETRY_TRANSLATOR: &'static str = r#"Translate this string from {source_language} to {target_language}.
Return EXACTLY ONE line containing only the translated string, with no quotes, id, or commentary.
A literal \n inside the string is a line break: keep it as \n in the same position.
If the string contains curly quotes (“ ” or ‘ ’), use curly quotes in the translation as well.
Do not translate company names, brand names, prices, or technical abbreviations such as 'API'."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// Builds the prompts sent to the completion service
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    source_language: String,
    target_language: String,
}

impl PromptBuilder {
    /// `source_language` and `target_language` are human-readable names
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }

    /// Tagged prompt for a batch of `(id, text)` pairs
    pub fn batch_prompt(&self, items: &[(usize, &str)]) -> String {
        let instructions = PromptTemplate::new(PromptTemplate::BATCH_TRANSLATOR)
            .render(&self.source_language, &self.target_language)
            .replace("{count}", &items.len().to_string());

        let mut prompt = instructions;
        prompt.push_str("\n\n");
        for (id, text) in items {
            prompt.push_str(&format!("{}\t{}\n", id, encode_newlines(text)));
        }
        prompt.trim_end().to_string()
    }

    /// Strict single-string prompt listing the placeholders to reproduce
    pub fn retry_prompt(&self, text: &str) -> String {
        let mut prompt = PromptTemplate::new(PromptTemplate::RETRY_TRANSLATOR)
            .render(&self.source_language, &self.target_language);

        let placeholders = placeholder_set(text);
        if placeholders.is_empty() {
            prompt.push_str("\nThe string contains no placeholders.");
        } else {
            prompt.push_str(&format!(
                "\nThe translation MUST contain each of these placeholders exactly as written: {}",
                placeholders.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }

        prompt.push_str("\n\n");
        prompt.push_str(&encode_newlines(text));
        prompt
    }
}
