//! Server-side fixture directory: listing and filename checks.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A file available for loading from the fixture directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureFile {
    pub name: String,
    /// Human-readable size, e.g. `"64.3 KB"`.
    pub size: String,
}

/// Render a byte count with one decimal place, starting at KB.
///
/// Sizes below one mebibyte are always expressed in KB so small fixtures
/// read as `"0.1 KB"` rather than a raw byte count.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.1} KB", b / KB)
    }
}

/// List the regular files directly inside `dir`, sorted by name.
///
/// Subdirectories are skipped. A missing or unreadable directory yields an
/// empty listing.
pub fn list_fixture_files(dir: &Path) -> Vec<FixtureFile> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Fixture directory not readable");
            return Vec::new();
        }
    };

    let mut files: Vec<FixtureFile> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let meta = entry.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            Some(FixtureFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: format_size(meta.len()),
            })
        })
        .collect();

    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

/// Reduce an uploaded filename to a bare name safe to join onto the
/// fixture directory.
///
/// Browsers may send full client paths; only the last component is kept.
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

/// Resolve a picked filename against the directory listing.
///
/// Only names that currently appear in the listing resolve, which rules out
/// path traversal and stale selections.
pub fn resolve_picked(dir: &Path, name: &str) -> Option<PathBuf> {
    list_fixture_files(dir)
        .into_iter()
        .find(|f| f.name == name)
        .map(|f| dir.join(f.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_round_to_one_decimal() {
        assert_eq!(format_size(65_843), "64.3 KB");
        assert_eq!(format_size(100), "0.1 KB");
        assert_eq!(format_size(0), "0.0 KB");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn listing_skips_directories_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page_dump.json"), vec![b' '; 100]).unwrap();
        std::fs::write(dir.path().join("big_file.json"), vec![b' '; 65_843]).unwrap();
        std::fs::create_dir(dir.path().join("garbage")).unwrap();
        std::fs::write(dir.path().join("garbage").join("garbage.json"), b"nope").unwrap();

        let files = list_fixture_files(dir.path());
        assert_eq!(
            files,
            vec![
                FixtureFile {
                    name: "big_file.json".into(),
                    size: "64.3 KB".into()
                },
                FixtureFile {
                    name: "page_dump.json".into(),
                    size: "0.1 KB".into()
                },
            ]
        );
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_fixture_files(&dir.path().join("does-not-exist")).is_empty());
    }

    #[test]
    fn uploaded_names_lose_their_path() {
        assert_eq!(sanitize_filename("empty.json").as_deref(), Some("empty.json"));
        assert_eq!(sanitize_filename("C:\\Users\\me\\dump.json").as_deref(), Some("dump.json"));
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("dir/.."), None);
        assert_eq!(sanitize_filename(""), None);
    }

    #[test]
    fn picked_names_must_be_listed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page_dump.json"), b"[]").unwrap();

        assert_eq!(
            resolve_picked(dir.path(), "page_dump.json"),
            Some(dir.path().join("page_dump.json"))
        );
        assert_eq!(resolve_picked(dir.path(), "../page_dump.json"), None);
        assert_eq!(resolve_picked(dir.path(), "other.json"), None);
    }
}
