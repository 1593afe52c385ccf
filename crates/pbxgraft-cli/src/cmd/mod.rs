use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use pbxgraft_core::GraftError;
use pbxgraft_store::{locate_project, FsDocumentStore, Project, StoreError};

use crate::args::{Cli, Command, ProjectArgs};

mod add_target;
mod check;
mod doctor;
mod targets;

/// Exit status for failures that are not more specific.
pub const EXIT_FAILURE: u8 = 1;
/// A reference does not resolve.
pub const EXIT_BROKEN_REFERENCE: u8 = 3;
/// The operator declined the write.
pub const EXIT_DECLINED: u8 = 4;

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::AddTarget(args) => add_target::run(&args),
        Command::Targets { project } => targets::run(&project),
        Command::Check { project } => check::run(&project),
        Command::Doctor { project } => doctor::run(&project),
    }
}

/// Exit status and an optional hint for a failed command.
pub fn classify(err: &anyhow::Error) -> (u8, Option<&'static str>) {
    let core = err
        .downcast_ref::<StoreError>()
        .and_then(StoreError::as_core)
        .or_else(|| err.downcast_ref::<GraftError>());

    if let Some(StoreError::Declined) = err.downcast_ref::<StoreError>() {
        return (EXIT_DECLINED, Some("pass --yes to skip the confirmation"));
    }
    if let Some(StoreError::AmbiguousProject { .. }) = err.downcast_ref::<StoreError>() {
        return (EXIT_FAILURE, Some("choose one with --project <path>"));
    }
    match core {
        Some(GraftError::BrokenReference { .. }) => (EXIT_BROKEN_REFERENCE, None),
        Some(GraftError::MalformedDocument { .. }) => (
            EXIT_FAILURE,
            Some("the project file could not be read; fix it in Xcode or restore it from version control"),
        ),
        Some(GraftError::HostTargetMissing(_)) => (EXIT_FAILURE, Some("list existing targets with `pbxgraft targets`")),
        _ => (EXIT_FAILURE, None),
    }
}

/// The descriptor path the project arguments point at.
pub fn resolve_descriptor(args: &ProjectArgs) -> Result<PathBuf> {
    match &args.project {
        Some(p) if p.extension().is_some_and(|e| e == "xcodeproj") => Ok(p.join("project.pbxproj")),
        Some(p) => Ok(p.clone()),
        None => Ok(locate_project(&args.root)?),
    }
}

/// Directory that `SOURCE_ROOT` paths are relative to.
pub fn source_root(descriptor: &Path) -> PathBuf {
    descriptor
        .parent()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn open(args: &ProjectArgs, backup: bool) -> Result<Project<FsDocumentStore>> {
    let descriptor = resolve_descriptor(args)?;
    tracing::debug!(path = %descriptor.display(), "opening project");
    let store = FsDocumentStore::new(&descriptor).with_backup(backup);
    Project::open(store).with_context(|| format!("failed to open {}", descriptor.display()))
}
