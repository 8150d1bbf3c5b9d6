/*!
 * Structured view of a locale file.
 *
 * Reads the single object literal of a locale module into an ordered tree
 * so key sets can be compared and bundles written without evaluating the
 * module.
 */

use std::collections::HashSet;

use serde_json::{Map, Value};
use swc_common::Spanned;
use swc_ecma_ast::{Expr, Lit, ObjectLit, Prop, PropOrSpread, Tpl, UnaryOp};

use super::parser::{ParsedLocale, object_of, parse_locale};
use crate::errors::LocaleError;

/// Value stored under a key
#[derive(Debug, Clone, PartialEq)]
pub enum TableValue {
    /// String or template literal, escapes resolved
    Text(String),
    /// Number, boolean, identifier or other bare literal
    Literal(String),
    /// Nested object literal
    Object(Vec<TableEntry>),
}

/// One property of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub key: String,
    pub value: TableValue,
}

/// Parsed locale file
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTable {
    /// Name bound by `const <name> = {`, `None` for `export default {`
    pub identifier: Option<String>,
    /// Top-level entries in source order
    pub entries: Vec<TableEntry>,
}

impl TranslationTable {
    /// Parse a locale module
    pub fn parse(source: &str) -> Result<Self, LocaleError> {
        let parsed = parse_locale(source)?;
        let Some((identifier, object)) = parsed.root_object() else {
            return Err(parsed.error_at_start("expected `const <name> = {` or `export default {`"));
        };
        let entries = read_object(&parsed, object)?;
        Ok(Self { identifier, entries })
    }

    /// Dotted paths of every leaf, in source order, without duplicates
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.leaves()
            .into_iter()
            .map(|(path, _)| path)
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }

    /// Every leaf with its dotted path, in source order
    pub fn leaves(&self) -> Vec<(String, &TableValue)> {
        let mut out = Vec::new();
        collect_leaves(&self.entries, "", &mut out);
        out
    }

    /// Nested JSON object in source key order
    pub fn to_json(&self) -> Value {
        entries_to_json(&self.entries)
    }
}

fn read_object(parsed: &ParsedLocale<'_>, object: &ObjectLit) -> Result<Vec<TableEntry>, LocaleError> {
    let mut entries = Vec::with_capacity(object.props.len());
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            return Err(parsed.error_at(prop.span().lo, "spread entries are not supported"));
        };
        let Prop::KeyValue(pair) = &**prop else {
            return Err(parsed.error_at(prop.span().lo, "expected a `key: value` entry"));
        };
        let Some(key) = parsed.key_text(&pair.key) else {
            return Err(parsed.error_at(pair.key.span().lo, "unsupported key"));
        };
        let value = read_value(parsed, &pair.value)?;
        entries.push(TableEntry { key, value });
    }
    Ok(entries)
}

fn read_value(parsed: &ParsedLocale<'_>, expr: &Expr) -> Result<TableValue, LocaleError> {
    if let Some(object) = object_of(expr) {
        return Ok(TableValue::Object(read_object(parsed, object)?));
    }
    let value = match expr {
        Expr::Lit(Lit::Str(literal)) => TableValue::Text(parsed.string_value(literal)),
        Expr::Tpl(template) if template.exprs.is_empty() => TableValue::Text(template_text(parsed, template)),
        Expr::Lit(Lit::Num(_) | Lit::Bool(_) | Lit::Null(_)) => TableValue::Literal(parsed.slice(expr.span()).to_string()),
        Expr::Ident(ident) => TableValue::Literal(ident.sym.to_string()),
        Expr::Unary(unary) if unary.op == UnaryOp::Minus && matches!(&*unary.arg, Expr::Lit(Lit::Num(_))) => {
            TableValue::Literal(parsed.slice(unary.span).to_string())
        }
        _ => return Err(parsed.error_at(expr.span().lo, "unsupported value")),
    };
    Ok(value)
}

/// Cooked text of a template without substitutions
fn template_text(parsed: &ParsedLocale<'_>, template: &Tpl) -> String {
    template
        .quasis
        .first()
        .and_then(|quasi| quasi.cooked.as_ref())
        .and_then(|cooked| cooked.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| parsed.source()[parsed.inner_range(template.span)].to_string())
}

fn collect_leaves<'a>(entries: &'a [TableEntry], prefix: &str, out: &mut Vec<(String, &'a TableValue)>) {
    for entry in entries {
        let path = format!("{}{}", prefix, entry.key);
        match &entry.value {
            TableValue::Object(children) => collect_leaves(children, &format!("{}.", path), out),
            value => out.push((path, value)),
        }
    }
}

fn entries_to_json(entries: &[TableEntry]) -> Value {
    let mut map = Map::new();
    for entry in entries {
        let value = match &entry.value {
            TableValue::Text(text) => Value::String(text.clone()),
            TableValue::Literal(text) => literal_to_json(text),
            TableValue::Object(children) => entries_to_json(children),
        };
        map.insert(entry.key.clone(), value);
    }
    Value::Object(map)
}

fn literal_to_json(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" | "undefined" => Value::Null,
        _ => serde_json::from_str::<serde_json::Number>(text)
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(text.to_string())),
    }
}
