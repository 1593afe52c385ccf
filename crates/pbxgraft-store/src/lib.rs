//! pbxgraft-store
//!
//! Persistence for project descriptors:
//! - whole-document read and atomic replace (temporary file + rename)
//! - optional timestamped backups
//! - discovery of `*.xcodeproj/project.pbxproj` under a directory
//! - the `Project` session that runs an edit end to end

pub mod digest;
pub mod error;
pub mod fs;
pub mod locate;
pub mod project;

pub use crate::digest::digest;
pub use crate::error::{StoreError, StoreResult};
pub use crate::fs::{DocumentStore, FsDocumentStore};
pub use crate::locate::{find_projects, locate_project};
pub use crate::project::{AssumeYes, Confirm, Preview, Project, Report};
