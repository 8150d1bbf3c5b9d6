/*!
 * Locale file handling.
 *
 * Locale files are TypeScript modules of the form
 * `const <code> = { ... }; export default <code> as Translations;`.
 *
 * - `parser`: swc TypeScript parse with byte-offset helpers
 * - `extractor`: `key: "value"` records with byte spans
 * - `table`: ordered key tree for key checks and bundles
 * - `splicer`: byte-exact rebuild with replaced values
 * - `emitter`: identifier rename and output writing
 */

pub use self::emitter::Emitter;
pub use self::extractor::{StringExtractor, StringRecord};
pub use self::parser::QuoteStyle;
pub use self::splicer::Splicer;
pub use self::table::{TableEntry, TableValue, TranslationTable};

pub mod emitter;
pub mod extractor;
pub mod parser;
pub mod splicer;
pub mod table;
