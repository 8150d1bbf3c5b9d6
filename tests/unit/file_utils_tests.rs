/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::common;
use langpack::file_utils::FileManager;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

/// Test that dir_exists returns false for non-existent directories
#[test]
fn test_dir_exists_withNonExistentDir_shouldReturnFalse() {
    assert!(!FileManager::dir_exists("./non_existent_directory_12345"));
}

#[test]
fn test_locale_entry_path_shouldPointAtIndexFile() {
    assert_eq!(
        FileManager::locale_entry_path("src", "pt-BR"),
        Path::new("src/pt-BR/index.ts")
    );
}

/// Directory discovery lists immediate subdirectories only, sorted, without hidden ones
#[test]
fn test_list_subdirectories_shouldSortAndSkipHiddenAndFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for name in ["fr", "en", ".git", "de/nested"] {
        fs::create_dir_all(temp_dir.path().join(name))?;
    }
    common::create_test_file(temp_dir.path(), "types.ts", "export {}")?;

    let names = FileManager::list_subdirectories(temp_dir.path());
    assert_eq!(names, vec!["de", "en", "fr"]);

    Ok(())
}

#[test]
fn test_list_subdirectories_withMissingRoot_shouldReturnEmpty() {
    assert!(FileManager::list_subdirectories("./no_such_locale_dir_98765").is_empty());
}

#[test]
fn test_write_atomic_shouldCreateParentsAndReplaceContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("src/fr/index.ts");

    FileManager::write_atomic(&target, "first")?;
    FileManager::write_atomic(&target, "second")?;

    assert_eq!(FileManager::read_to_string(&target)?, "second");
    let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())?.collect();
    assert_eq!(leftovers.len(), 1);

    Ok(())
}

#[test]
fn test_append_with_timestamp_shouldKeepPreviousContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let summary = temp_dir.path().join("summary.md");

    FileManager::append_with_timestamp(&summary, "first table")?;
    FileManager::append_with_timestamp(&summary, "second table")?;

    let content = FileManager::read_to_string(&summary)?;
    assert!(content.contains("first table"));
    assert!(content.contains("second table"));
    assert_eq!(content.matches("<!-- generated").count(), 2);

    Ok(())
}
