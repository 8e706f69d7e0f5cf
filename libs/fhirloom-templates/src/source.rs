//! Filesystem-backed template tiers: a primary resource folder and an
//! optional override folder layered above it. Reading a tier records the
//! file's mtime so the loader's cache (`cache.rs`) can detect edits without
//! restarting the process.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Default)]
pub struct TemplateSource {
    pub primary: Option<PathBuf>,
    pub overrides: Option<PathBuf>,
}

impl TemplateSource {
    pub fn new(primary: Option<PathBuf>, overrides: Option<PathBuf>) -> Self {
        Self { primary, overrides }
    }

    pub fn read_primary(&self, relative_path: &str) -> Option<(String, SystemTime)> {
        self.primary
            .as_deref()
            .and_then(|dir| read_yaml(dir, relative_path))
    }

    pub fn read_override(&self, relative_path: &str) -> Option<(String, SystemTime)> {
        self.overrides
            .as_deref()
            .and_then(|dir| read_yaml(dir, relative_path))
    }
}

fn read_yaml(dir: &Path, relative_path: &str) -> Option<(String, SystemTime)> {
    let path = dir.join(format!("{relative_path}.yml"));
    let metadata = fs::metadata(&path).ok()?;
    let mtime = metadata.modified().ok()?;
    let contents = fs::read_to_string(&path).ok()?;
    Some((contents, mtime))
}
