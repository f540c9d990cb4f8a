use crate::source::FilenameSource;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::PathBuf;

/// Filename source backed by a repository walk: gitignore-aware, skips
/// hidden files and the usual vendor directories, yields sorted
/// repo-relative paths with `/` separators.
pub struct RepoWalkSource {
    root: PathBuf,
}

impl RepoWalkSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl FilenameSource for RepoWalkSource {
    fn fetch(&mut self) -> Result<Vec<String>> {
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("Invalid path: {}", self.root.display()))?;

        let walker = WalkBuilder::new(&root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                // Skip common non-source directories
                !matches!(
                    name.as_ref(),
                    ".git" | "node_modules" | "target" | "__pycache__" | ".venv" | "venv"
                )
            })
            .build();

        let mut filenames: Vec<String> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let rel = entry.path().strip_prefix(&root).ok()?;
                let text = rel.to_string_lossy();
                if std::path::MAIN_SEPARATOR == '/' {
                    Some(text.into_owned())
                } else {
                    Some(text.replace(std::path::MAIN_SEPARATOR, "/"))
                }
            })
            .collect();

        filenames.sort_unstable();
        Ok(filenames)
    }
}
