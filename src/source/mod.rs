//! Source file discovery and loading
//!
//! - [`discovery`]: directory walk with extension and directory filters
//! - [`loader`]: bounded, lossy file reading
//! - [`language`]: extension to language label mapping

pub mod discovery;
pub mod language;
pub mod loader;

pub use discovery::{DiscoveredFiles, DiscoveryConfig, SourceDiscovery};
pub use language::language_from_filename;
pub use loader::ContentLoader;

use std::path::Path;

/// A discovered file with its (truncated) content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the scan root, `/`-separated
    pub path: String,
    /// Final path component, sent to backends as the file name
    pub file_name: String,
    pub language: &'static str,
    pub content: String,
}

impl SourceFile {
    /// Loads `absolute` through `loader`; `None` when the content is blank
    pub fn load(root: &Path, absolute: &Path, loader: &ContentLoader) -> Option<Self> {
        let content = loader.load(absolute);
        if content.trim().is_empty() {
            return None;
        }

        let file_name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Some(Self {
            path: relative_key(root, absolute),
            language: language_from_filename(&file_name),
            file_name,
            content,
        })
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Response key for `absolute`: relative to `root`, always `/`-separated
pub fn relative_key(root: &Path, absolute: &Path) -> String {
    let relative = absolute.strip_prefix(root).unwrap_or(absolute);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_source_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        let path = dir.path().join("pkg/mod.py");
        fs::write(&path, "a = 1\nb = 2\n").unwrap();

        let file = SourceFile::load(dir.path(), &path, &ContentLoader::default()).unwrap();
        assert_eq!(file.path, "pkg/mod.py");
        assert_eq!(file.file_name, "mod.py");
        assert_eq!(file.language, "python");
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_blank_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.py");
        fs::write(&path, "  \n\t\n").unwrap();

        assert!(SourceFile::load(dir.path(), &path, &ContentLoader::default()).is_none());
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(
            relative_key(Path::new("/repo"), Path::new("/repo/src/lib.rs")),
            "src/lib.rs"
        );
    }
}
