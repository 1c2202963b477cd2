use crate::error::AnalysisError;
use ignore::{Walk, WalkBuilder};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_INCLUDE_EXTS: &[&str] = &[
    ".py", ".js", ".ts", ".java", ".go", ".rs", ".cpp", ".c", ".cs", ".kt", ".swift",
];

pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    ".venv",
    "venv",
    "dist",
    "build",
    "__pycache__",
];

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Path suffixes to keep; empty keeps every file
    pub include_exts: Vec<String>,
    /// Path components that exclude an entry and everything below it
    pub exclude_dirs: Vec<String>,
    /// Honour .gitignore / .ignore files found in the tree
    pub respect_gitignore: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include_exts: DEFAULT_INCLUDE_EXTS.iter().map(|s| s.to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            respect_gitignore: false,
        }
    }
}

/// Finds candidate source files below a root directory
pub struct SourceDiscovery {
    root: PathBuf,
    config: DiscoveryConfig,
}

impl SourceDiscovery {
    /// Validates and canonicalizes `root`; nothing is traversed yet
    pub fn new(root: impl AsRef<Path>, config: DiscoveryConfig) -> Result<Self, AnalysisError> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(AnalysisError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(AnalysisError::NotADirectory(root.to_path_buf()));
        }

        let root = root
            .canonicalize()
            .map_err(|source| AnalysisError::Canonicalize {
                path: root.to_path_buf(),
                source,
            })?;

        debug!(root = %root.display(), "SourceDiscovery initialized");

        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Starts a fresh traversal
    ///
    /// Excluded directories are pruned, so nothing below them is read.
    pub fn files(&self) -> DiscoveredFiles {
        let exclude: Arc<Vec<String>> = Arc::new(self.config.exclude_dirs.clone());

        let walk = WalkBuilder::new(&self.root)
            .standard_filters(self.config.respect_gitignore)
            .hidden(false)
            .follow_links(false)
            .sort_by_file_name(|a: &OsStr, b: &OsStr| a.cmp(b))
            .filter_entry(move |entry| {
                entry.depth() == 0 || !is_excluded_name(entry.file_name(), &exclude)
            })
            .build();

        DiscoveredFiles {
            root: self.root.clone(),
            walk,
            include_exts: self.config.include_exts.clone(),
            exclude_dirs: self.config.exclude_dirs.clone(),
        }
    }
}

/// Lazy sequence of files produced by [`SourceDiscovery::files`]
pub struct DiscoveredFiles {
    root: PathBuf,
    walk: Walk,
    include_exts: Vec<String>,
    exclude_dirs: Vec<String>,
}

impl DiscoveredFiles {
    fn accepts(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if is_excluded(relative, &self.exclude_dirs) {
            return false;
        }
        matches_extension(path, &self.include_exts)
    }
}

impl Iterator for DiscoveredFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            if self.accepts(entry.path()) {
                return Some(entry.into_path());
            }
        }
    }
}

/// True when any component of `relative` is an excluded directory name
pub fn is_excluded(relative: &Path, exclude_dirs: &[String]) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => is_excluded_name(name, exclude_dirs),
        _ => false,
    })
}

fn is_excluded_name(name: &OsStr, exclude_dirs: &[String]) -> bool {
    exclude_dirs.iter().any(|dir| OsStr::new(dir) == name)
}

/// True when the allow-list is empty or the path ends with one of its suffixes
pub fn matches_extension(path: &Path, include_exts: &[String]) -> bool {
    if include_exts.is_empty() {
        return true;
    }
    let path = path.to_string_lossy();
    include_exts.iter().any(|ext| path.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }

    fn relative_names(discovery: &SourceDiscovery) -> Vec<String> {
        discovery
            .files()
            .map(|p| {
                p.strip_prefix(discovery.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_missing_root() {
        let err = SourceDiscovery::new("/definitely/not/here", DiscoveryConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AnalysisError::RootNotFound(_)));
    }

    #[test]
    fn test_root_is_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.py");
        let err = SourceDiscovery::new(dir.path().join("a.py"), DiscoveryConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AnalysisError::NotADirectory(_)));
    }

    #[test]
    fn test_extension_filter() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "b.png");
        touch(dir.path(), "src/c.rs");

        let discovery = SourceDiscovery::new(dir.path(), DiscoveryConfig::default()).unwrap();
        assert_eq!(relative_names(&discovery), vec!["a.py", "src/c.rs"]);
    }

    #[test]
    fn test_empty_allow_list_keeps_everything() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "b.png");

        let config = DiscoveryConfig {
            include_exts: vec![],
            ..DiscoveryConfig::default()
        };
        let discovery = SourceDiscovery::new(dir.path(), config).unwrap();
        assert_eq!(relative_names(&discovery), vec!["a.py", "b.png"]);
    }

    #[test]
    fn test_excluded_directories_are_pruned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "keep.py");
        touch(dir.path(), "node_modules/pkg/index.js");
        touch(dir.path(), "src/build/gen.py");
        touch(dir.path(), ".git/hooks/pre-commit.py");
        touch(dir.path(), ".hidden/ok.py");

        let discovery = SourceDiscovery::new(dir.path(), DiscoveryConfig::default()).unwrap();
        assert_eq!(relative_names(&discovery), vec![".hidden/ok.py", "keep.py"]);
    }

    #[test]
    fn test_gitignore_ignored_by_default() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "skipped.py\n").unwrap();
        touch(dir.path(), "skipped.py");

        let discovery = SourceDiscovery::new(dir.path(), DiscoveryConfig::default()).unwrap();
        assert_eq!(relative_names(&discovery), vec!["skipped.py"]);

        let config = DiscoveryConfig {
            respect_gitignore: true,
            ..DiscoveryConfig::default()
        };
        let discovery = SourceDiscovery::new(dir.path(), config).unwrap();
        assert!(relative_names(&discovery).is_empty());
    }

    #[test]
    fn test_is_excluded_checks_every_component() {
        let exclude = vec!["dist".to_string()];
        assert!(is_excluded(Path::new("web/dist/app.js"), &exclude));
        assert!(!is_excluded(Path::new("web/distribution/app.js"), &exclude));
    }

    #[test]
    fn test_matches_extension_is_suffix_based() {
        let include = vec![".ts".to_string()];
        assert!(matches_extension(Path::new("a/index.d.ts"), &include));
        assert!(!matches_extension(Path::new("a/index.tsx"), &include));
    }
}
