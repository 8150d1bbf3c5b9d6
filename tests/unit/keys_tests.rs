/*!
 * Tests for TranslationKeys enum generation
 */

use anyhow::Result;

use crate::common::{self, EN_LOCALE};
use langpack::file_utils::FileManager;
use langpack::keys::{enum_member_name, write_types_file};

#[test]
fn test_enum_member_name_withNestedPath_shouldJoinSegments() {
    assert_eq!(enum_member_name("settings.dark-mode"), "SettingsDarkMode");
    assert_eq!(enum_member_name("plan.pro+"), "PlanProPlus");
    assert_eq!(enum_member_name("menu.close_"), "MenuClose_");
}

#[test]
fn test_write_types_file_shouldWriteEnumForEveryLeaf() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let reference = common::create_locale(temp_dir.path(), "en", EN_LOCALE)?;
    let types_file = temp_dir.path().join("src/types.ts");

    let count = write_types_file(&reference, &types_file)?;
    assert_eq!(count, 4);

    let content = FileManager::read_to_string(&types_file)?;
    assert!(content.starts_with("export enum TranslationKeys {\n  SwitchAccount = \"switchAccount\",\n"));
    assert!(content.contains("  MenuOpen = \"menu.open\"\n}"));
    assert!(content.ends_with("export type Translations = Record<TranslationKeys, string>;"));

    Ok(())
}

#[test]
fn test_write_types_file_withEmptyTable_shouldClearKeys() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let reference = common::create_locale(temp_dir.path(), "en", "const en = {};\nexport default en as Translations;\n")?;
    let types_file = temp_dir.path().join("types.ts");

    assert_eq!(write_types_file(&reference, &types_file)?, 0);
    assert!(FileManager::read_to_string(&types_file)?.contains("export enum TranslationKeys {\n  \n}"));

    Ok(())
}

#[test]
fn test_write_types_file_withBrokenReference_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let reference = common::create_locale(temp_dir.path(), "en", "const en = {\n  a: \"A\"\n  b: \"B\"\n};")?;
    assert!(write_types_file(&reference, &temp_dir.path().join("types.ts")).is_err());
    Ok(())
}
