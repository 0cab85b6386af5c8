//! Directory-walk source collector.
//!
//! Walks a root with the `ignore` crate (honouring `.gitignore` when
//! configured), keeps files with a markup or style extension, drops paths
//! matching an exclude glob and groups the rest into scored units.

use a11y_lint_core::{
    CollectError, Collected, ContentType, ScanConfig, SourceCollector, SourceFile, UnitBy,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Collects markup and style files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryCollector {
    root: PathBuf,
    exclude: Vec<String>,
    respect_gitignore: bool,
    unit_by: UnitBy,
}

impl DirectoryCollector {
    /// Creates a collector for `root` with the `[scan]` settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, scan: &ScanConfig) -> Self {
        Self {
            root: root.into(),
            exclude: scan.exclude.clone(),
            respect_gitignore: scan.respect_gitignore,
            unit_by: scan.unit_by,
        }
    }

    /// Adds exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    fn patterns(&self) -> Result<Vec<glob::Pattern>, CollectError> {
        self.exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p)
                    .map_err(|e| CollectError::Other(format!("invalid exclude pattern '{p}': {e}")))
            })
            .collect()
    }

    /// Path relative to the root, with `/` separators.
    fn relative(&self, path: &Path) -> PathBuf {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        if rel.as_os_str().is_empty() {
            // The root itself is a file.
            return path.file_name().map_or_else(|| path.to_path_buf(), PathBuf::from);
        }
        PathBuf::from(rel.to_string_lossy().replace('\\', "/"))
    }

    fn unit_of(&self, rel: &Path) -> String {
        match self.unit_by {
            UnitBy::File => rel.to_string_lossy().into_owned(),
            UnitBy::Directory => match rel.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_string_lossy().into_owned(),
                _ => ".".to_string(),
            },
        }
    }
}

impl SourceCollector for DirectoryCollector {
    fn collect(&self) -> Result<Vec<Collected>, CollectError> {
        std::fs::metadata(&self.root).map_err(|source| CollectError::Io {
            path: self.root.clone(),
            source,
        })?;
        let patterns = self.patterns()?;

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .filter_entry(|e| e.file_name() != ".git");

        let mut collected = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Some(content_type) = ContentType::from_path(path) else {
                continue;
            };

            let rel = self.relative(path);
            if patterns.iter().any(|p| p.matches_path(&rel)) {
                debug!("Excluding: {}", rel.display());
                continue;
            }

            let unit_id = self.unit_of(&rel);
            collected.push(match std::fs::read_to_string(path) {
                Ok(content) => Collected::File(SourceFile::new(rel, content, content_type, unit_id)),
                Err(e) => Collected::Unreadable {
                    path: rel,
                    unit_id,
                    reason: e.to_string(),
                },
            });
        }

        collected.sort_by(|a, b| collected_path(a).cmp(collected_path(b)));
        debug!("Collected {} file(s) under {}", collected.len(), self.root.display());
        Ok(collected)
    }
}

fn collected_path(entry: &Collected) -> &Path {
    match entry {
        Collected::File(file) => &file.path,
        Collected::Unreadable { path, .. } => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn summary(collected: &[Collected]) -> Vec<(String, String)> {
        collected
            .iter()
            .map(|c| match c {
                Collected::File(f) => (f.path.display().to_string(), f.unit_id.clone()),
                Collected::Unreadable { path, unit_id, .. } => {
                    (format!("!{}", path.display()), unit_id.clone())
                }
            })
            .collect()
    }

    #[test]
    fn groups_files_by_directory() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "index.html", b"<html lang=\"en\"></html>");
        write(tmp.path(), "card/card.vue", b"<template></template>");
        write(tmp.path(), "card/card.scss", b".card {}");
        write(tmp.path(), "card/README.md", b"# Card");

        let collected = DirectoryCollector::new(tmp.path(), &ScanConfig::default())
            .collect()
            .unwrap();
        assert_eq!(
            summary(&collected),
            [
                ("card/card.scss".to_string(), "card".to_string()),
                ("card/card.vue".to_string(), "card".to_string()),
                ("index.html".to_string(), ".".to_string()),
            ]
        );
        let Collected::File(style) = &collected[0] else {
            panic!("expected a file");
        };
        assert_eq!(style.content_type, ContentType::Style);
    }

    #[test]
    fn unit_per_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pages/home.html", b"");
        let scan = ScanConfig {
            unit_by: UnitBy::File,
            ..ScanConfig::default()
        };
        let collected = DirectoryCollector::new(tmp.path(), &scan).collect().unwrap();
        assert_eq!(
            summary(&collected),
            [("pages/home.html".to_string(), "pages/home.html".to_string())]
        );
    }

    #[test]
    fn applies_default_and_extra_excludes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "node_modules/lib/button.css", b"");
        write(tmp.path(), "legacy/old.html", b"");
        write(tmp.path(), "app/app.html", b"");

        let collected = DirectoryCollector::new(tmp.path(), &ScanConfig::default())
            .excludes(["legacy/**"])
            .collect()
            .unwrap();
        assert_eq!(
            summary(&collected),
            [("app/app.html".to_string(), "app".to_string())]
        );
    }

    #[test]
    fn unreadable_files_are_reported() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/broken.css", &[0xff, 0xfe, 0x00, 0xc3]);

        let collected = DirectoryCollector::new(tmp.path(), &ScanConfig::default())
            .collect()
            .unwrap();
        assert_eq!(
            summary(&collected),
            [("!app/broken.css".to_string(), "app".to_string())]
        );
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result =
            DirectoryCollector::new(tmp.path().join("missing"), &ScanConfig::default()).collect();
        assert!(matches!(result, Err(CollectError::Io { .. })));
    }

    #[test]
    fn invalid_pattern_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = DirectoryCollector::new(tmp.path(), &ScanConfig::default())
            .excludes(["[unclosed"])
            .collect();
        assert!(matches!(result, Err(CollectError::Other(_))));
    }
}
