/*!
 * Tests for language code utilities
 */

use langpack::language_utils::{
    get_language_name, is_known_locale_code, language_codes_match, normalize_to_part2t,
    resolve_language_name, split_locale_code,
};

#[test]
fn test_split_locale_code_shouldSeparateRegion() {
    assert_eq!(split_locale_code("pt-BR"), ("pt".to_string(), Some("BR".to_string())));
    assert_eq!(split_locale_code("zh_Hant"), ("zh".to_string(), Some("Hant".to_string())));
    assert_eq!(split_locale_code("EN"), ("en".to_string(), None));
}

#[test]
fn test_normalize_to_part2t_withValidCodes_shouldReturnThreeLetterCode() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("GER").unwrap(), "deu");
}

#[test]
fn test_normalize_to_part2t_withInvalidCode_shouldFail() {
    assert!(normalize_to_part2t("xx").is_err());
    assert!(normalize_to_part2t("english").is_err());
}

#[test]
fn test_language_codes_match_shouldCompareByPrimaryLanguage() {
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("pt-BR", "pt"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("xx", "xx"));
}

#[test]
fn test_is_known_locale_code_shouldAcceptRegionalCodes() {
    assert!(is_known_locale_code("pt-BR"));
    assert!(is_known_locale_code("de"));
    assert!(!is_known_locale_code("ptbr"));
}

#[test]
fn test_get_language_name_shouldIncludeRegion() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("pt-BR").unwrap(), "Portuguese (BR)");
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_resolve_language_name_shouldPreferExplicitName() {
    assert_eq!(
        resolve_language_name("ptbr", Some("Brazilian Portuguese")).unwrap(),
        "Brazilian Portuguese"
    );
    assert_eq!(resolve_language_name("de", Some("  ")).unwrap(), "German");
    assert!(resolve_language_name("ptbr", None).is_err());
}
