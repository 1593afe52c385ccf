use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use pbxgraft_core::compose::{AddOutcome, TargetSpec};
use pbxgraft_core::config::ComposerConfig;
use pbxgraft_core::ident::IdGenerator;
use pbxgraft_store::{AssumeYes, Report};
use serde::Serialize;

use crate::args::AddTargetArgs;
use crate::cmd;
use crate::guidance;
use crate::output;
use crate::prompt::StdinConfirm;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddTargetOut {
    #[serde(flatten)]
    report: Report,
    dry_run: bool,
    guidance: Vec<String>,
}

pub fn run(args: &AddTargetArgs) -> Result<ExitCode> {
    let spec = build_spec(args)?;
    spec.validate()?;
    let cfg = build_config(args)?;

    let mut project = cmd::open(&args.project, args.backup && !args.dry_run)?;
    let descriptor = project.store().path().to_path_buf();

    if args.check_files {
        check_files(&spec, &cmd::source_root(&descriptor))?;
    }

    let mut ids = match args.seed {
        Some(seed) => IdGenerator::seeded(seed),
        None => IdGenerator::random(),
    }
    .with_max_attempts(cfg.id_attempts);

    let report = if args.dry_run {
        let (result, text) = project.preview_add(&spec, &cfg, &mut ids)?;
        Report {
            result,
            document: descriptor.display().to_string(),
            digest_before: project.digest().to_string(),
            digest_after: pbxgraft_store::digest(text.as_bytes()),
            written: false,
            backup: None,
        }
    } else if args.yes {
        project.add_target(&spec, &cfg, &mut ids, &mut AssumeYes)?
    } else {
        project.add_target(&spec, &cfg, &mut ids, &mut StdinConfirm)?
    };

    let steps = match &report.result {
        AddOutcome::Created(created) => guidance::after_created(&spec, created),
        AddOutcome::AlreadyExists { name, .. } => guidance::after_existing(name),
    };

    if output::is_json() {
        output::print(&AddTargetOut {
            report,
            dry_run: args.dry_run,
            guidance: steps,
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    match &report.result {
        AddOutcome::Created(created) if args.dry_run => output::note(&format!(
            "dry run: would add target {} ({} new objects) to {}",
            created.name, created.node_count, report.document
        )),
        AddOutcome::Created(created) => output::success(&format!(
            "target {} ({}) with {} new objects in {}",
            created.name, created.target, created.node_count, report.document
        )),
        AddOutcome::AlreadyExists { name, target } => {
            output::note(&format!("target {name} already exists ({target}), nothing to do"))
        }
    }
    if let Some(backup) = &report.backup {
        output::line(&format!("backup: {backup}"));
    }
    if !steps.is_empty() {
        output::line("");
        output::line("Next steps:");
        for (i, step) in steps.iter().enumerate() {
            output::line(&format!("  {}. {step}", i + 1));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn build_spec(args: &AddTargetArgs) -> Result<TargetSpec> {
    let mut spec = match &args.spec {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read target spec {}", path.display()))?;
            TargetSpec::from_json(&text)?
        }
        None => {
            let name = args
                .name
                .clone()
                .ok_or_else(|| anyhow!("--name is required unless --spec is given"))?;
            let bundle_id = args
                .bundle_id
                .clone()
                .ok_or_else(|| anyhow!("--bundle-id is required unless --spec is given"))?;
            let entitlements = args
                .entitlements
                .clone()
                .ok_or_else(|| anyhow!("--entitlements is required unless --spec is given"))?;
            TargetSpec::new(name, args.product_type.unwrap_or_default(), bundle_id, Vec::<String>::new(), entitlements)
        }
    };

    if let Some(name) = &args.name {
        spec.name = name.clone();
    }
    if let Some(product_type) = args.product_type {
        spec.product_type = product_type;
    }
    if let Some(bundle_id) = &args.bundle_id {
        spec.bundle_id = bundle_id.clone();
    }
    if let Some(entitlements) = &args.entitlements {
        spec.entitlements = entitlements.clone();
    }
    if !args.sources.is_empty() {
        spec.sources = args.sources.clone();
    }
    if let Some(info_plist) = &args.info_plist {
        spec.info_plist = Some(info_plist.clone());
    }
    spec.frameworks.extend(args.frameworks.iter().cloned());
    if let Some(host) = &args.host_target {
        spec.host_target = Some(host.clone());
    }
    for setting in &args.settings {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| anyhow!("--setting expects KEY=VALUE, got {setting:?}"))?;
        spec.settings.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(spec)
}

fn build_config(args: &AddTargetArgs) -> Result<ComposerConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ComposerConfig::default(),
    };
    if let Some(v) = &args.deployment_target {
        cfg.deployment_target = v.clone();
    }
    if let Some(v) = &args.swift_version {
        cfg.swift_version = v.clone();
    }
    pbxgraft_core::config::validate_config(&cfg)?;
    Ok(cfg)
}

/// Referenced assets must exist before the descriptor is touched.
fn check_files(spec: &TargetSpec, root: &Path) -> Result<()> {
    let missing: Vec<String> = spec
        .sources
        .iter()
        .chain(std::iter::once(&spec.entitlements))
        .chain(spec.info_plist.iter())
        .filter(|p| !root.join(p).is_file())
        .cloned()
        .collect();

    if missing.is_empty() {
        tracing::debug!(root = %root.display(), "all referenced files exist");
        return Ok(());
    }
    bail!(
        "referenced files not found under {}: {}",
        root.display(),
        missing.join(", ")
    )
}
