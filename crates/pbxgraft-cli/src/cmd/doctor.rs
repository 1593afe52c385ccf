use std::process::ExitCode;

use anyhow::Result;
use pbxgraft_core::model::serialize::MARKER;
use pbxgraft_core::model::ProjectGraph;
use serde::Serialize;

use crate::args::ProjectArgs;
use crate::cmd;
use crate::output;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub required: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

fn check(name: &str, ok: bool, required: bool, detail: impl Into<String>) -> Check {
    Check {
        name: name.to_string(),
        ok,
        required,
        detail: detail.into(),
    }
}

pub fn run(args: &ProjectArgs) -> Result<ExitCode> {
    let mut checks = Vec::new();

    checks.push(check(
        "xcodebuild",
        which_ok("xcodebuild"),
        false,
        "optional (needed to build the project, not to edit it)",
    ));

    match cmd::resolve_descriptor(args) {
        Ok(path) => {
            checks.push(check("project", path.is_file(), true, path.display().to_string()));
            project_checks(&path, &mut checks);
        }
        Err(e) => checks.push(check("project", false, true, format!("{e:#}"))),
    }

    let ok = checks.iter().all(|c| c.ok || !c.required);
    let out = DoctorOut { ok, checks };

    if output::is_json() {
        output::print(&out)?;
    } else {
        for c in &out.checks {
            let status = match (c.ok, c.required) {
                (true, _) => "ok",
                (false, true) => "FAIL",
                (false, false) => "skip",
            };
            output::line(&format!("{status:>4}  {:<12} {}", c.name, c.detail));
        }
    }

    Ok(if out.ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn project_checks(path: &std::path::Path, checks: &mut Vec<Check>) {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            checks.push(check("readable", false, true, e.to_string()));
            return;
        }
    };
    checks.push(check("readable", true, true, format!("{} bytes", text.len())));
    checks.push(check(
        "marker",
        text.starts_with(MARKER),
        false,
        format!("first line should be {MARKER}"),
    ));

    match ProjectGraph::parse(&text) {
        Ok(graph) => {
            checks.push(check(
                "parse",
                true,
                true,
                format!("{} objects, {} targets", graph.len(), graph.targets().count()),
            ));
            checks.push(check(
                "root",
                graph.project().is_some(),
                true,
                "rootObject must point at a PBXProject",
            ));
            let dangling = pbxgraft_core::model::validate::dangling_references(&graph);
            checks.push(check(
                "references",
                dangling.is_empty(),
                true,
                format!("{} dangling", dangling.len()),
            ));
        }
        Err(e) => checks.push(check("parse", false, true, e.to_string())),
    }

    let writable = path
        .parent()
        .and_then(|dir| std::fs::metadata(dir).ok())
        .is_some_and(|m| !m.permissions().readonly());
    checks.push(check("writable", writable, true, "project directory accepts the replacement file"));
}

fn which_ok(cmd: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|p| p.join(cmd).is_file()))
        .unwrap_or(false)
}
