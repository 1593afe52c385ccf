//! Reference extraction and referential-integrity checks.
//!
//! The format does not mark which strings are identifiers, so references are
//! recognized by field name. `remoteGlobalIDString` is excluded: it may point
//! into another project file through its container portal.

use serde::Serialize;

use crate::plist::{Dict, Value};

use super::{Object, ObjectId, ProjectGraph};

/// Fields whose string (or list-of-string) values are object identifiers.
pub const REFERENCE_FIELDS: &[&str] = &[
    "baseConfigurationReference",
    "buildConfigurationList",
    "buildConfigurations",
    "buildPhases",
    "buildRules",
    "children",
    "containerPortal",
    "dependencies",
    "fileRef",
    "files",
    "mainGroup",
    "packageProductDependencies",
    "packageReferences",
    "productRef",
    "productRefGroup",
    "productReference",
    "ProductGroup",
    "ProjectRef",
    "target",
    "targetProxy",
    "targets",
];

/// A reference held by some object: `field` on the holder points at `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub field: String,
    pub key: ObjectId,
}

/// A reference that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// Holder id, or `rootObject` for the top-level root pointer.
    pub from: String,
    pub field: String,
    pub key: ObjectId,
}

/// All references held by one object, in field order.
pub fn references(object: &Object) -> Vec<Reference> {
    let mut out = Vec::new();
    collect(&object.fields, &mut out);
    out
}

fn collect(dict: &Dict, out: &mut Vec<Reference>) {
    for (field, value) in dict {
        if field == "buildSettings" {
            continue;
        }
        if field == "TargetAttributes" {
            if let Some(attrs) = value.as_dict() {
                out.extend(attrs.keys().map(|k| Reference {
                    field: field.clone(),
                    key: ObjectId::new(k.clone()),
                }));
            }
            continue;
        }
        if REFERENCE_FIELDS.contains(&field.as_str()) {
            match value {
                Value::String(s) => out.push(Reference {
                    field: field.clone(),
                    key: ObjectId::new(s.clone()),
                }),
                Value::Array(items) => out.extend(items.iter().filter_map(Value::as_str).map(|s| Reference {
                    field: field.clone(),
                    key: ObjectId::new(s),
                })),
                _ => {}
            }
            continue;
        }
        match value {
            Value::Dict(nested) => collect(nested, out),
            Value::Array(items) => {
                for nested in items.iter().filter_map(Value::as_dict) {
                    collect(nested, out);
                }
            }
            _ => {}
        }
    }
}

/// Every reference in the graph that does not resolve, in holder-id order.
pub fn dangling_references(graph: &ProjectGraph) -> Vec<DanglingReference> {
    let mut out = Vec::new();
    if let Some(root) = &graph.root_object {
        if !graph.contains(root) {
            out.push(DanglingReference {
                from: "rootObject".to_string(),
                field: "rootObject".to_string(),
                key: root.clone(),
            });
        }
    }
    for (id, obj) in &graph.objects {
        for r in references(obj) {
            if !graph.contains(&r.key) {
                out.push(DanglingReference {
                    from: id.to_string(),
                    field: r.field,
                    key: r.key,
                });
            }
        }
    }
    out
}
