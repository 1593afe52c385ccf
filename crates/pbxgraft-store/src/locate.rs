//! Discovery of `*.xcodeproj/project.pbxproj` under a directory.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{StoreError, StoreResult};

/// How deep below the root to look (`root/ios/App.xcodeproj` is depth 2).
pub const MAX_DEPTH: usize = 4;

const SKIP_DIRS: &[&str] = &["Pods", "build", "DerivedData", "node_modules", ".git"];

fn skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|n| SKIP_DIRS.contains(&n))
}

/// Every project descriptor under `root`, sorted by path.
pub fn find_projects(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root)
        .max_depth(MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !skipped(e));

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() || entry.path().extension().map_or(true, |e| e != "xcodeproj") {
            continue;
        }
        let descriptor = entry.path().join("project.pbxproj");
        if descriptor.is_file() {
            tracing::debug!(path = %descriptor.display(), "found project");
            found.push(descriptor);
        }
        walker.skip_current_dir();
    }
    found
}

/// The single project descriptor under `root`.
pub fn locate_project(root: &Path) -> StoreResult<PathBuf> {
    if !root.is_dir() {
        return Err(StoreError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut found = find_projects(root);
    match found.len() {
        0 => Err(StoreError::ProjectNotFound(root.to_path_buf())),
        1 => Ok(found.remove(0)),
        _ => Err(StoreError::AmbiguousProject {
            root: root.to_path_buf(),
            candidates: found,
        }),
    }
}
