//! Error types for pbxgraft-store.

use std::path::PathBuf;

use pbxgraft_core::GraftError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] GraftError),

    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not valid UTF-8")]
    Encoding(PathBuf),

    #[error("no *.xcodeproj/project.pbxproj found under {0}")]
    ProjectNotFound(PathBuf),

    #[error("several projects found under {root}; pick one with --project: {}", list(.candidates))]
    AmbiguousProject {
        root: PathBuf,
        candidates: Vec<PathBuf>,
    },

    /// The confirmation collaborator said no. Nothing was written.
    #[error("change declined, project left untouched")]
    Declined,
}

fn list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The core error, if this wraps one.
    pub fn as_core(&self) -> Option<&GraftError> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}
