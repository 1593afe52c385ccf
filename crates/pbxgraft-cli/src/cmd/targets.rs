use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use crate::args::ProjectArgs;
use crate::cmd;
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOut {
    pub name: String,
    pub id: String,
    pub isa: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

pub fn run(args: &ProjectArgs) -> Result<ExitCode> {
    let project = cmd::open(args, false)?;
    let mut targets: Vec<TargetOut> = project
        .graph()
        .targets()
        .map(|(id, obj)| TargetOut {
            name: obj.name().unwrap_or("").to_string(),
            id: id.to_string(),
            isa: obj.isa.clone(),
            product_type: obj.get_str("productType").map(str::to_string),
        })
        .collect();
    targets.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    if output::is_json() {
        output::print(&targets)?;
        return Ok(ExitCode::SUCCESS);
    }

    if targets.is_empty() {
        output::note("no targets");
    }
    let width = targets.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for t in &targets {
        let kind = t.product_type.as_deref().unwrap_or(&t.isa);
        output::line(&format!("{:<width$}  {}  {kind}", t.name, t.id));
    }
    Ok(ExitCode::SUCCESS)
}
