// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use autowix::GuidMap;
use autowix::cli::Paths;
use autowix::guid::persistence;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory holding one template and its sibling files.
///
/// Keep the value alive for the duration of the test to prevent cleanup.
pub struct Workspace {
    pub dir: TempDir,
    pub paths: Paths,
}

impl Workspace {
    /// Create a workspace with `product.wxt` containing `template`.
    pub fn new(template: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::derive(&dir.path().join("product.wxt")).unwrap();
        fs::write(&paths.input, template).unwrap();
        Self { dir, paths }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the workspace, creating parent directories.
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_persistence(&self, contents: &str) {
        fs::write(&self.paths.persistence, contents).unwrap();
    }

    pub fn output(&self) -> String {
        fs::read_to_string(&self.paths.output).unwrap()
    }

    pub fn persistence_text(&self) -> String {
        fs::read_to_string(&self.paths.persistence).unwrap()
    }

    pub fn persisted(&self) -> GuidMap {
        persistence::load(&self.paths.persistence).unwrap()
    }
}
