//! Error types for pbxgraft-core.
//!
//! There is no `AlreadyExists` variant: an existing target is an outcome of
//! `add_target`, not a failure. See `crate::compose::AddOutcome`.

use thiserror::Error;

use crate::model::ObjectId;

pub type GraftResult<T> = Result<T, GraftError>;

#[derive(Debug, Error)]
pub enum GraftError {
    /// A reference introduced by a composition does not resolve to any node.
    #[error("broken reference: {from} -> {key} does not resolve to any object")]
    BrokenReference { key: ObjectId, from: String },

    /// The document cannot be read into the expected graph shape.
    #[error("malformed document at {context}: {message}")]
    MalformedDocument { context: String, message: String },

    /// The identifier source kept producing keys that are already taken.
    #[error("identifier space exhausted after {attempts} colliding draws")]
    IdSpaceExhausted { attempts: usize },

    #[error("host target not found: {0}")]
    HostTargetMissing(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl GraftError {
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn broken_reference(key: ObjectId, from: impl Into<String>) -> Self {
        Self::BrokenReference {
            key,
            from: from.into(),
        }
    }

    pub fn is_broken_reference(&self) -> bool {
        matches!(self, Self::BrokenReference { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }

    /// The dangling key, if this is a `BrokenReference`.
    pub fn dangling_key(&self) -> Option<&ObjectId> {
        match self {
            Self::BrokenReference { key, .. } => Some(key),
            _ => None,
        }
    }
}
