//! pbxgraft-core
//!
//! Core primitives for editing Xcode project descriptors (`project.pbxproj`):
//! - OpenStep plist codec with Xcode-style layout and comments
//! - Typed object graph with reference discovery and validation
//! - Collision-checked object identifier generation
//! - Target composition with an all-or-nothing commit

pub mod compose;
pub mod config;
pub mod errors;
pub mod ident;
pub mod model;
pub mod plist;

pub use crate::errors::{GraftError, GraftResult};

/// Object version written into descriptors created from scratch.
pub const DEFAULT_OBJECT_VERSION: &str = "56";

/// Convenience re-exports.
pub mod prelude {
    pub use crate::compose::{add_target, AddOutcome, Composer, CreatedTarget, Plan, ProductType, TargetSpec};
    pub use crate::config::ComposerConfig;
    pub use crate::ident::{IdGenerator, IdSource, RandomIds, SeededIds};
    pub use crate::model::validate::{dangling_references, DanglingReference};
    pub use crate::model::{NodeKind, Object, ObjectId, ProjectGraph};
    pub use crate::plist::{Dict, Value};
    pub use crate::{GraftError, GraftResult};
}
