use std::process::ExitCode;

use anyhow::Result;
use pbxgraft_core::model::validate::DanglingReference;
use serde::Serialize;

use crate::args::ProjectArgs;
use crate::cmd::{self, EXIT_BROKEN_REFERENCE};
use crate::output;

#[derive(Debug, Serialize)]
pub struct CheckOut {
    pub ok: bool,
    pub document: String,
    pub objects: usize,
    pub dangling: Vec<DanglingReference>,
}

pub fn run(args: &ProjectArgs) -> Result<ExitCode> {
    let project = cmd::open(args, false)?;
    let dangling = project.dangling_references();
    let out = CheckOut {
        ok: dangling.is_empty(),
        document: project.store().path().display().to_string(),
        objects: project.graph().len(),
        dangling,
    };

    if output::is_json() {
        output::print(&out)?;
    } else if out.ok {
        output::line(&format!("{}: {} objects, all references resolve", out.document, out.objects));
    } else {
        for d in &out.dangling {
            output::warn(&format!("{}.{} -> {} does not resolve", d.from, d.field, d.key));
        }
        output::line(&format!("{} dangling reference(s) in {}", out.dangling.len(), out.document));
    }

    Ok(if out.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_BROKEN_REFERENCE)
    })
}
