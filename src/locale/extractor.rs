/*!
 * Extraction of `key: "value"` string records from a locale source file.
 */

use log::debug;
use swc_common::Spanned;
use swc_ecma_ast::{Expr, KeyValueProp, Lit};
use swc_ecma_visit::{Visit, VisitWith};

use super::parser::QuoteStyle;
use super::parser::{ParsedLocale, parse_locale};
use crate::errors::LocaleError;

/// One key/value string literal found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRecord {
    /// Position in extraction order (0-based)
    pub id: usize,
    /// Flat key text (brackets and key quotes stripped)
    pub key: String,
    /// Delimiter style of the value literal
    pub quote: QuoteStyle,
    /// Raw value content, escapes preserved
    pub value: String,
    /// Byte offset where the `key: value` construct starts
    pub start: usize,
    /// Byte offset just past the closing value delimiter
    pub end: usize,
    /// Byte offset of the first value character
    pub value_start: usize,
    /// Byte offset just past the last value character
    pub value_end: usize,
}

/// Extracts string records from locale source text
pub struct StringExtractor;

impl StringExtractor {
    /// Extract every `key: <string>` property in source order
    pub fn extract(source: &str) -> Result<Vec<StringRecord>, LocaleError> {
        let parsed = parse_locale(source)?;
        let mut collector = RecordCollector {
            parsed: &parsed,
            records: Vec::new(),
        };
        parsed.module.visit_with(&mut collector);
        Ok(collector.records)
    }

    /// Keys may hold word characters, dots, hyphens and plus signs
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '+'))
    }
}

struct RecordCollector<'p, 'a> {
    parsed: &'p ParsedLocale<'a>,
    records: Vec<StringRecord>,
}

impl RecordCollector<'_, '_> {
    fn collect(&mut self, prop: &KeyValueProp) {
        let value_span = match &*prop.value {
            Expr::Lit(Lit::Str(literal)) => literal.span,
            Expr::Tpl(template) if template.exprs.is_empty() => template.span,
            Expr::Tpl(template) => {
                let (line, column) = self.parsed.line_col(template.span.lo);
                debug!("Skipping interpolated template at {}:{}", line, column);
                return;
            }
            _ => return,
        };

        let Some(key) = self.parsed.key_text(&prop.key) else {
            return;
        };
        let key_span = prop.key.span();
        if !StringExtractor::is_valid_key(&key) {
            let (line, column) = self.parsed.line_col(key_span.lo);
            debug!("Skipping unsupported key {:?} at {}:{}", key, line, column);
            return;
        }

        let literal = self.parsed.slice(value_span);
        let Some(quote) = literal.chars().next().and_then(QuoteStyle::from_char) else {
            return;
        };
        let inner = self.parsed.inner_range(value_span);

        self.records.push(StringRecord {
            id: self.records.len(),
            key,
            quote,
            value: self.parsed.source()[inner.clone()].to_string(),
            start: self.parsed.offset(key_span.lo),
            end: self.parsed.offset(value_span.hi),
            value_start: inner.start,
            value_end: inner.end,
        });
    }
}

impl Visit for RecordCollector<'_, '_> {
    fn visit_key_value_prop(&mut self, prop: &KeyValueProp) {
        self.collect(prop);
        prop.visit_children_with(self);
    }
}
