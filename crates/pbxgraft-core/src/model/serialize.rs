//! Serialization of a `ProjectGraph` back to `project.pbxproj` text.
//!
//! Output mirrors what Xcode writes so a rewritten file diffs cleanly:
//! the `// !$*UTF8*$!` marker, objects grouped into `/* Begin <isa> section */`
//! blocks (isa order, then id order), build files and file references on a
//! single line, and identifiers followed by a `/* name */` comment.

use std::collections::{BTreeMap, HashMap};

use crate::plist::write::{comment, write_dict, write_value};
use crate::plist::{quote, Annotate, Style};

use super::{NodeKind, Object, ObjectId, ProjectGraph};

pub const MARKER: &str = "// !$*UTF8*$!";

const INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Identifier -> comment text, computed once per serialization.
struct Names {
    names: HashMap<String, String>,
}

impl Annotate for Names {
    fn annotate(&self, value: &str) -> Option<String> {
        self.names.get(value).cloned()
    }
}

fn file_label(obj: &Object) -> Option<String> {
    obj.name()
        .or_else(|| obj.get_str("path").map(|p| p.rsplit('/').next().unwrap_or(p)))
        .map(str::to_string)
}

fn phase_label(obj: &Object) -> Option<String> {
    obj.name()
        .map(str::to_string)
        .or_else(|| obj.kind().default_phase_name().map(str::to_string))
}

impl Names {
    fn build(graph: &ProjectGraph, project_name: Option<&str>) -> Self {
        let mut names = HashMap::new();

        // Owners of configuration lists and phases containing each build file.
        let mut list_owner: HashMap<ObjectId, String> = HashMap::new();
        let mut file_phase: HashMap<ObjectId, String> = HashMap::new();
        for (id, obj) in &graph.objects {
            let kind = obj.kind();
            if let Some(list) = obj.ref_field("buildConfigurationList") {
                let owner = match kind {
                    NodeKind::Project => match project_name {
                        Some(n) => format!("PBXProject \"{n}\""),
                        None => "PBXProject".to_string(),
                    },
                    _ => format!("{} \"{}\"", obj.isa, obj.name().unwrap_or(id.as_str())),
                };
                list_owner.insert(list, owner);
            }
            if kind.is_build_phase() {
                let label = phase_label(obj).unwrap_or_else(|| obj.isa.clone());
                for file in obj.ref_list("files") {
                    file_phase.insert(file, label.clone());
                }
            }
        }

        for (id, obj) in &graph.objects {
            let label = match obj.kind() {
                NodeKind::Project => Some("Project object".to_string()),
                NodeKind::BuildFile => {
                    let file = obj
                        .ref_field("fileRef")
                        .or_else(|| obj.ref_field("productRef"))
                        .and_then(|f| graph.get(&f))
                        .and_then(|o| file_label(o).or_else(|| o.get_str("productName").map(str::to_string)));
                    match (file, file_phase.get(id)) {
                        (Some(f), Some(p)) => Some(format!("{f} in {p}")),
                        (Some(f), None) => Some(f),
                        (None, Some(p)) => Some(format!("(null) in {p}")),
                        (None, None) => None,
                    }
                }
                NodeKind::ConfigurationList => Some(match list_owner.get(id) {
                    Some(owner) => format!("Build configuration list for {owner}"),
                    None => "Build configuration list".to_string(),
                }),
                NodeKind::ContainerItemProxy | NodeKind::TargetDependency => Some(obj.isa.clone()),
                kind if kind.is_build_phase() => phase_label(obj),
                _ => file_label(obj),
            };
            if let Some(label) = label {
                names.insert(id.as_str().to_string(), label);
            }
        }
        Self { names }
    }
}

/// Serialize a graph to descriptor text. `project_name` is the `.xcodeproj`
/// stem, used in the comment of the project's configuration list.
pub fn to_pbxproj(graph: &ProjectGraph, project_name: Option<&str>) -> String {
    let names = Names::build(graph, project_name);
    let mut out = String::new();
    out.push_str(MARKER);
    out.push_str("\n{\n");

    let mut keys: Vec<&str> = graph.meta.keys().map(String::as_str).collect();
    keys.push("objects");
    if graph.root_object.is_some() {
        keys.push("rootObject");
    }
    keys.sort_unstable();

    for key in keys {
        match key {
            "objects" => write_objects(&mut out, graph, &names),
            "rootObject" => {
                if let Some(root) = &graph.root_object {
                    out.push_str("\trootObject = ");
                    write_value(&mut out, &root.into(), 1, Style::Multiline, &names);
                    out.push_str(";\n");
                }
            }
            other => {
                out.push('\t');
                out.push_str(&quote(other));
                out.push_str(" = ");
                write_value(&mut out, &graph.meta[other], 1, Style::Multiline, &names);
                out.push_str(";\n");
            }
        }
    }
    out.push_str("}\n");
    out
}

fn write_objects(out: &mut String, graph: &ProjectGraph, names: &Names) {
    let mut sections: BTreeMap<&str, Vec<(&ObjectId, &Object)>> = BTreeMap::new();
    for (id, obj) in &graph.objects {
        sections.entry(obj.isa.as_str()).or_default().push((id, obj));
    }

    out.push_str("\tobjects = {\n");
    for (isa, objects) in sections {
        let style = if INLINE_ISAS.contains(&isa) {
            Style::Inline
        } else {
            Style::Multiline
        };
        out.push_str(&format!("\n/* Begin {isa} section */\n"));
        for (id, obj) in objects {
            out.push_str("\t\t");
            out.push_str(&quote(id.as_str()));
            if let Some(label) = names.annotate(id.as_str()) {
                out.push(' ');
                out.push_str(&comment(&label));
            }
            out.push_str(" = ");
            write_dict(out, &obj.to_dict(), 2, style, names);
            out.push_str(";\n");
        }
        out.push_str(&format!("/* End {isa} section */\n"));
    }
    out.push_str("\t};\n");
}

impl ProjectGraph {
    /// Serialize without knowing the project's file name.
    pub fn to_pbxproj(&self) -> String {
        to_pbxproj(self, None)
    }
}
