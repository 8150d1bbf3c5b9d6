use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for locale codes
///
/// Locale directories are named by codes such as `en`, `fr`, `pt-BR` or
/// `zh_Hant`. The primary subtag is an ISO 639-1 or ISO 639-2 code and is
/// used to derive a human-readable name for translation prompts.

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Split a locale code into its primary language subtag and an optional region/script
pub fn split_locale_code(code: &str) -> (String, Option<String>) {
    let code = code.trim();
    match code.find(['-', '_']) {
        Some(index) => {
            let region = &code[index + 1..];
            (
                code[..index].to_lowercase(),
                (!region.is_empty()).then(|| region.to_string()),
            )
        }
        None => (code.to_lowercase(), None),
    }
}

/// Normalize a primary language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&normalized_code).is_some() {
                return Ok(normalized_code);
            }
            if let Some((_, terminology)) = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized_code)
            {
                return Ok(terminology.to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Whether a locale code has a recognizable primary language subtag
pub fn is_known_locale_code(code: &str) -> bool {
    let (primary, _) = split_locale_code(code);
    normalize_to_part2t(&primary).is_ok()
}

/// Check if two locale codes name the same primary language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let (primary1, _) = split_locale_code(code1);
    let (primary2, _) = split_locale_code(code2);
    match (normalize_to_part2t(&primary1), normalize_to_part2t(&primary2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a locale code (`pt-BR` -> `Portuguese (BR)`)
pub fn get_language_name(code: &str) -> Result<String> {
    let (primary, region) = split_locale_code(code);
    let normalized = normalize_to_part2t(&primary)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(match region {
        Some(region) => format!("{} ({})", lang.to_name(), region),
        None => lang.to_name().to_string(),
    })
}

/// Use an explicit name when configured, otherwise derive it from the code
pub fn resolve_language_name(code: &str, explicit: Option<&str>) -> Result<String> {
    match explicit.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => get_language_name(code).map_err(|e| {
            anyhow!(
                "No language name for '{}': set it in the config file ({})",
                code,
                e
            )
        }),
    }
}
