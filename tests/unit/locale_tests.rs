/*!
 * Tests for locale file reading and rewriting through the public API
 */

use std::collections::BTreeMap;

use crate::common::EN_LOCALE;
use langpack::locale::{Emitter, Splicer, StringExtractor, TranslationTable};

#[test]
fn test_extract_referenceLocale_shouldFindEveryStringInOrder() {
    let records = StringExtractor::extract(EN_LOCALE).unwrap();
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    let values: Vec<&str> = records.iter().map(|r| r.value.as_str()).collect();

    assert_eq!(keys, vec!["switchAccount", "greeting", "ok", "open"]);
    assert_eq!(values, vec!["Switch account", "Hello %{name}", "OK", "Open"]);
    assert!(records.windows(2).all(|pair| pair[0].end <= pair[1].start));
}

#[test]
fn test_splice_withOriginalValues_shouldReproduceFileExactly() {
    let records = StringExtractor::extract(EN_LOCALE).unwrap();
    let identity: BTreeMap<usize, String> = records.iter().map(|r| (r.id, r.value.clone())).collect();

    assert_eq!(Splicer::splice(EN_LOCALE, &records, &identity), EN_LOCALE);
    assert_eq!(Splicer::splice(EN_LOCALE, &records, &BTreeMap::new()), EN_LOCALE);
}

#[test]
fn test_splice_thenRename_shouldOnlyTouchValuesAndIdentifier() {
    let records = StringExtractor::extract(EN_LOCALE).unwrap();
    let mut translations = BTreeMap::new();
    translations.insert(0, "Changer de compte".to_string());
    translations.insert(3, "Ouvrir l'menu".to_string());

    let spliced = Splicer::splice(EN_LOCALE, &records, &translations);
    let output = Emitter::rename_identifier(&spliced, "en", "fr");

    assert!(output.contains("const fr = {"));
    assert!(output.contains("export default fr as Translations;"));
    assert!(output.contains("  // Account\n"));
    assert!(output.contains(r#"switchAccount: "Changer de compte","#));
    assert!(output.contains("open: 'Ouvrir l’menu',"));
    assert!(output.contains(r#"greeting: "Hello %{name}","#));
}

#[test]
fn test_table_andExtractor_shouldAgreeOnStringLeaves() {
    let table = TranslationTable::parse(EN_LOCALE).unwrap();
    assert_eq!(table.identifier.as_deref(), Some("en"));
    assert_eq!(table.leaf_paths(), vec!["switchAccount", "greeting", "ok", "menu.open"]);
    assert_eq!(table.leaf_paths().len(), StringExtractor::extract(EN_LOCALE).unwrap().len());
}

#[test]
fn test_table_withSatisfiesExport_shouldParse() {
    let source = "const ptBR = {\n  all: \"Todos\",\n} satisfies Translations;\n\nexport default ptBR;\n";
    let table = TranslationTable::parse(source).unwrap();
    assert_eq!(table.identifier.as_deref(), Some("ptBR"));
    assert_eq!(table.to_json()["all"], "Todos");
}
