use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use pbxgraft_core::compose::ProductType;

#[derive(Parser, Debug, Clone)]
#[command(name = "pbxgraft", version, about = "Add targets to Xcode projects without opening Xcode")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the project descriptor lives.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to a project.pbxproj or to its .xcodeproj bundle.
    #[arg(long, conflicts_with = "root")]
    pub project: Option<PathBuf>,

    /// Directory searched for exactly one *.xcodeproj.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct AddTargetArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Target name. Adding a name that already exists is a no-op.
    #[arg(long)]
    pub name: Option<String>,

    /// app-extension, application, framework or static-library.
    #[arg(long)]
    pub product_type: Option<ProductType>,

    /// PRODUCT_BUNDLE_IDENTIFIER of the new target.
    #[arg(long)]
    pub bundle_id: Option<String>,

    /// Source file, relative to the project directory. Repeat in compile order.
    #[arg(long = "source", value_name = "PATH")]
    pub sources: Vec<String>,

    /// Entitlements file, relative to the project directory.
    #[arg(long)]
    pub entitlements: Option<String>,

    /// Info.plist of the new target. Generated by Xcode when omitted.
    #[arg(long)]
    pub info_plist: Option<String>,

    /// System framework to link (e.g. ReplayKit). Repeatable.
    #[arg(long = "framework", value_name = "NAME")]
    pub frameworks: Vec<String>,

    /// Existing target that should embed the new extension.
    #[arg(long)]
    pub host_target: Option<String>,

    /// Extra build setting for both configurations. Repeatable.
    #[arg(long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// JSON target spec; flags given alongside override its fields.
    #[arg(long, value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// JSON composer configuration.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// IPHONEOS_DEPLOYMENT_TARGET of the new target.
    #[arg(long)]
    pub deployment_target: Option<String>,

    /// SWIFT_VERSION of the new target.
    #[arg(long)]
    pub swift_version: Option<String>,

    /// Seed for reproducible object identifiers.
    #[arg(long, hide = true)]
    pub seed: Option<u64>,

    /// Write without asking for confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Compute the change and report it without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Keep a timestamped copy of the descriptor before writing.
    #[arg(long)]
    pub backup: bool,

    /// Fail unless every referenced source, entitlements and Info.plist file exists.
    #[arg(long)]
    pub check_files: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a target to a project.
    AddTarget(AddTargetArgs),

    /// List the targets of a project.
    Targets {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Report references that do not resolve to any object.
    Check {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Run environment and project checks.
    Doctor {
        #[command(flatten)]
        project: ProjectArgs,
    },
}
