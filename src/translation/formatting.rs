/*!
 * Text normalization applied around provider calls.
 *
 * Values travel to the provider one per line, so embedded newlines are
 * encoded as the two characters `\n`. Straight quotes coming back are turned
 * into curly quotes so they can never clash with a literal's delimiter.
 */

/// Curly closing double quote used in place of `"`
pub const CURLY_DOUBLE: char = '\u{201D}';

/// Curly apostrophe used in place of `'`
pub const CURLY_SINGLE: char = '\u{2019}';

/// Replace every straight quote with its curly counterpart
pub fn force_curly_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '"' => CURLY_DOUBLE,
            '\'' => CURLY_SINGLE,
            other => other,
        })
        .collect()
}

/// Encode real line breaks as `\n` so a value fits on one line
pub fn encode_newlines(text: &str) -> String {
    text.replace("\r\n", "\\n").replace('\n', "\\n")
}

/// Turn `\n` sequences back into real line breaks
pub fn decode_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
