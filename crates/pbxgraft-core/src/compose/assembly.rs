//! A fully wired, not-yet-inserted set of nodes for one new target.
//!
//! An `Assembly` is inert until `commit`. Dropping it is the cancellation
//! path: nothing in the graph has been touched.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::{GraftError, GraftResult};
use crate::model::validate::references;
use crate::model::{Object, ObjectId, ProjectGraph};
use crate::plist::Value;

/// Append `append` to the list field `field` of the existing node `node`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub node: ObjectId,
    pub field: String,
    pub append: ObjectId,
}

/// Identifiers of the nodes created for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTarget {
    pub name: String,
    pub target: ObjectId,
    pub product: ObjectId,
    pub configuration_list: ObjectId,
    pub configurations: Vec<ObjectId>,
    /// Sources, frameworks, copy-files, in that order.
    pub build_phases: Vec<ObjectId>,
    /// File references of the sources, in compile order.
    pub source_files: Vec<ObjectId>,
    pub entitlements: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_plist: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_in: Option<String>,
    pub node_count: usize,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub nodes: BTreeMap<ObjectId, Object>,
    pub patches: Vec<Patch>,
    pub created: CreatedTarget,
}

impl Assembly {
    fn describe(id: &ObjectId, obj: &Object) -> String {
        match obj.name() {
            Some(name) => format!("{id} ({} {name:?})", obj.isa),
            None => format!("{id} ({})", obj.isa),
        }
    }

    fn resolves(&self, graph: &ProjectGraph, key: &ObjectId) -> bool {
        self.nodes.contains_key(key) || graph.contains(key)
    }

    /// Verify that committing into `graph` leaves no dangling reference.
    pub fn check(&self, graph: &ProjectGraph) -> GraftResult<()> {
        for (id, obj) in &self.nodes {
            if graph.contains(id) {
                return Err(GraftError::invalid_argument(format!(
                    "identifier {id} is already present in the project"
                )));
            }
            for r in references(obj) {
                if !self.resolves(graph, &r.key) {
                    return Err(GraftError::broken_reference(
                        r.key,
                        format!("{}.{}", Self::describe(id, obj), r.field),
                    ));
                }
            }
        }

        for patch in &self.patches {
            let Some(holder) = graph.get(&patch.node) else {
                return Err(GraftError::broken_reference(
                    patch.node.clone(),
                    format!("patch of {}", patch.field),
                ));
            };
            if let Some(existing) = holder.fields.get(&patch.field) {
                if existing.as_array().is_none() {
                    return Err(GraftError::malformed(
                        format!("object {}", patch.node),
                        format!("`{}` must be a list, found {}", patch.field, existing.type_name()),
                    ));
                }
            }
            if !self.resolves(graph, &patch.append) {
                return Err(GraftError::broken_reference(
                    patch.append.clone(),
                    format!("{}.{}", Self::describe(&patch.node, holder), patch.field),
                ));
            }
        }
        Ok(())
    }

    /// Check, then insert every node and apply every patch.
    ///
    /// The graph is only mutated once the check has passed, and the mutation
    /// itself cannot fail, so the insertion is all-or-nothing.
    pub fn commit(self, graph: &mut ProjectGraph) -> GraftResult<CreatedTarget> {
        self.check(graph)?;

        let Assembly {
            nodes,
            patches,
            created,
        } = self;

        graph.objects.extend(nodes);
        for patch in patches {
            if let Some(holder) = graph.get_mut(&patch.node) {
                let list = holder
                    .fields
                    .entry(patch.field)
                    .or_insert_with(Value::empty_array);
                if let Some(items) = list.as_array_mut() {
                    items.push(Value::from(patch.append));
                }
            }
        }

        tracing::info!(
            target_name = %created.name,
            target_id = %created.target,
            nodes = created.node_count,
            "committed target"
        );
        Ok(created)
    }
}
