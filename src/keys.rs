/*!
 * Generates the `TranslationKeys` enum and `Translations` type from the
 * reference language table.
 */

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::file_utils::FileManager;
use crate::locale::TranslationTable;

static SEPARATOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_-].").expect("Invalid separator regex"));

static TRAILING_UNDERSCORES_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_+$").expect("Invalid trailing underscore regex"));

/// Enum member name for a dotted key path
///
/// Each segment is camel-cased on `_`/`-`, capitalized and has `+` spelled
/// out as `Plus`. The last segment's trailing underscores are preserved.
pub fn enum_member_name(path: &str) -> String {
    let last_segment = path.rsplit('.').next().unwrap_or(path);
    let trailing = TRAILING_UNDERSCORES_REGEX
        .find(last_segment)
        .map(|m| m.as_str())
        .unwrap_or("");

    let joined: String = path
        .split('.')
        .map(|segment| {
            let camel = SEPARATOR_REGEX.replace_all(segment, |caps: &Captures| {
                caps[0].chars().skip(1).flat_map(char::to_uppercase).collect::<String>()
            });
            capitalize_first(&camel).replace('+', "Plus")
        })
        .collect();

    let mut name = TRAILING_UNDERSCORES_REGEX.replace(&joined, "").into_owned();
    name.push_str(trailing);
    name
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Name = "path"` lines for every leaf of the table
pub fn generate_enum_lines(table: &TranslationTable) -> Vec<String> {
    table
        .leaf_paths()
        .iter()
        .map(|path| format!("{} = \"{}\"", enum_member_name(path), path))
        .collect()
}

/// Full content of the types file
pub fn types_file_content(lines: &[String]) -> String {
    format!(
        "export enum TranslationKeys {{\n  {}\n}}\n\nexport type Translations = Record<TranslationKeys, string>;",
        lines.join(",\n  ")
    )
}

/// Parse `reference_file`, write the types file and return the number of keys written
pub fn write_types_file(reference_file: &Path, types_file: &Path) -> Result<usize> {
    let source = FileManager::read_to_string(reference_file)?;
    let table = TranslationTable::parse(&source)
        .with_context(|| format!("Failed to parse reference locale file: {:?}", reference_file))?;

    let lines = generate_enum_lines(&table);
    FileManager::write_atomic(types_file, &types_file_content(&lines))?;

    if lines.is_empty() {
        info!("Existing keys cleared from types.ts.");
    } else {
        info!("Enum keys have been written to types.ts");
    }
    Ok(lines.len())
}
