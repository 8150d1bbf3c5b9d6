use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, warn};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// File name of a language's locale module inside its directory
pub const LOCALE_ENTRY_FILE: &str = "index.ts";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @returns: <root>/<code>/index.ts
    pub fn locale_entry_path<P: AsRef<Path>>(root: P, code: &str) -> PathBuf {
        root.as_ref().join(code).join(LOCALE_ENTRY_FILE)
    }

    /// Immediate subdirectory names of `root`, sorted, hidden ones skipped.
    ///
    /// A missing or unreadable root yields an empty list.
    pub fn list_subdirectories<P: AsRef<Path>>(root: P) -> Vec<String> {
        let root = root.as_ref();
        if !root.is_dir() {
            warn!("Locale directory {:?} does not exist", root);
            return Vec::new();
        }

        let mut names: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Failed to read directory entry in {:?}: {}", root, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| !name.starts_with('.'))
            .collect();

        names.sort();
        names
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write through a temp file in the target directory, then rename over the target
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temp file in {:?}", parent))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temp file for {:?}", path))?;
        temp.flush()?;
        temp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move output into place: {:?}", path))?;

        debug!("Wrote {} bytes to {:?}", content.len(), path);
        Ok(())
    }

    /// Append content to a file with a timestamp line, creating it if needed
    pub fn append_with_timestamp<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open file for append: {:?}", path.as_ref()))?;

        writeln!(file, "<!-- generated {} -->", timestamp)
            .and_then(|_| writeln!(file, "{}", content))
            .with_context(|| format!("Failed to append to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
