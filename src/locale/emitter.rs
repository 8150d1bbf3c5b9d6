/*!
 * Writes a translated locale file under the target language's identifier.
 */

use std::path::Path;

use anyhow::Result;
use log::debug;
use regex::{Captures, NoExpand, Regex};

use crate::file_utils::FileManager;

/// Renames the locale binding and persists the result
pub struct Emitter;

impl Emitter {
    /// Turn a language code into a usable identifier (`pt-BR` -> `ptBR`)
    pub fn identifier_for(code: &str) -> String {
        let mut identifier: String = code
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
            .collect();
        if identifier.is_empty() || identifier.starts_with(|c: char| c.is_ascii_digit()) {
            identifier.insert(0, '_');
        }
        identifier
    }

    /// Rewrite `const <from> = {` and `export default <from> as Translations;`
    pub fn rename_identifier(content: &str, from: &str, to: &str) -> String {
        let from = regex::escape(from);

        let declaration = Regex::new(&format!(r"const\s+{}\s*(:[^=]*)?=\s*\{{", from))
            .map(|re| {
                re.replacen(content, 1, |caps: &Captures| {
                    // keep a `: Translations` annotation as written
                    let annotation = caps.get(1).map_or(" ", |m| m.as_str());
                    format!("const {}{}= {{", to, annotation)
                })
                .into_owned()
            });
        let renamed = match declaration {
            Ok(renamed) => renamed,
            Err(e) => {
                debug!("Skipping declaration rename: {}", e);
                content.to_string()
            }
        };

        match Regex::new(&format!(r"export\s+default\s+{}\s+as\s+Translations\s*;", from)) {
            Ok(re) => {
                let replacement = format!("export default {} as Translations;", to);
                re.replacen(&renamed, 1, NoExpand(&replacement)).into_owned()
            }
            Err(e) => {
                debug!("Skipping export rename: {}", e);
                renamed
            }
        }
    }

    /// Write the output file, creating parent directories
    pub fn write(path: &Path, content: &str) -> Result<()> {
        FileManager::write_atomic(path, content)
    }
}
