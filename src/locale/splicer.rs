/*!
 * Rebuilds a locale file with translated values.
 *
 * Everything outside the recorded value spans is copied byte-for-byte, so
 * comments, formatting, trailing commas and nesting survive untouched.
 */

use std::collections::BTreeMap;

use log::warn;

use super::extractor::StringRecord;
use super::parser::QuoteStyle;
use crate::translation::formatting::force_curly_quotes;

/// Splices translated values back into the source text
pub struct Splicer;

impl Splicer {
    /// Produce the output text for `source` with `translations` keyed by record id
    pub fn splice(
        source: &str,
        records: &[StringRecord],
        translations: &BTreeMap<usize, String>,
    ) -> String {
        let mut ordered: Vec<&StringRecord> = records.iter().collect();
        ordered.sort_by_key(|record| record.start);

        let mut output = String::with_capacity(source.len() + source.len() / 4);
        let mut cursor = 0;

        for record in ordered {
            if !Self::span_is_valid(source, record, cursor) {
                warn!(
                    "Record {} ('{}') does not match the source text, keeping it unchanged",
                    record.id, record.key
                );
                continue;
            }

            output.push_str(&source[cursor..record.value_start]);
            output.push_str(&Self::render_value(record, translations.get(&record.id)));
            cursor = record.value_end;
        }

        output.push_str(&source[cursor..]);
        output
    }

    /// The recorded value must sit between two matching delimiters after the cursor
    fn span_is_valid(source: &str, record: &StringRecord, cursor: usize) -> bool {
        let delimiter = record.quote.delimiter() as u8;
        let bytes = source.as_bytes();
        record.value_start >= cursor.max(1)
            && record.value_end < bytes.len()
            && record.value_start <= record.value_end
            && bytes[record.value_start - 1] == delimiter
            && bytes[record.value_end] == delimiter
            && source.get(record.value_start..record.value_end) == Some(record.value.as_str())
    }

    /// Text to place between the delimiters of `record`
    pub fn render_value(record: &StringRecord, translation: Option<&String>) -> String {
        let Some(translation) = translation else {
            return record.value.clone();
        };
        if *translation == record.value {
            return record.value.clone();
        }

        let trimmed = translation.trim();
        if trimmed.is_empty() {
            return record.value.clone();
        }

        escape_for_delimiter(&force_curly_quotes(trimmed), record.quote)
    }
}

/// Make text safe to sit inside a literal with the given delimiter
pub fn escape_for_delimiter(text: &str, quote: QuoteStyle) -> String {
    let delimiter = quote.delimiter();
    let multiline = quote == QuoteStyle::Backtick;
    let mut output = String::with_capacity(text.len());
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            output.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                output.push(c);
                escaped = true;
            }
            '\n' if !multiline => output.push_str("\\n"),
            '\r' if !multiline => output.push_str("\\r"),
            _ if c == delimiter => {
                output.push('\\');
                output.push(c);
            }
            _ => output.push(c),
        }
    }

    // A dangling backslash would escape the closing delimiter
    if escaped {
        output.push('\\');
    }
    output
}
