//! The in-memory project graph and its conversion from/to plist values.

use std::collections::BTreeMap;

use crate::errors::{GraftError, GraftResult};
use crate::plist::{self, Dict, Value};

use super::{NodeKind, Object, ObjectId};

/// A whole project descriptor.
///
/// `meta` holds every top-level key other than `objects` and `rootObject`
/// (`archiveVersion`, `classes`, `objectVersion`, ...), untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGraph {
    pub meta: Dict,
    pub objects: BTreeMap<ObjectId, Object>,
    pub root_object: Option<ObjectId>,
}

impl ProjectGraph {
    /// A descriptor with no objects and no root project.
    pub fn empty() -> Self {
        let mut meta = Dict::new();
        meta.insert("archiveVersion".to_string(), Value::string("1"));
        meta.insert("classes".to_string(), Value::empty_dict());
        meta.insert("objectVersion".to_string(), Value::string(crate::DEFAULT_OBJECT_VERSION));
        Self {
            meta,
            objects: BTreeMap::new(),
            root_object: None,
        }
    }

    /// Parse descriptor text into a graph.
    pub fn parse(text: &str) -> GraftResult<Self> {
        Self::from_value(plist::parse(text)?)
    }

    pub fn from_value(value: Value) -> GraftResult<Self> {
        let mut top = match value {
            Value::Dict(d) => d,
            other => {
                return Err(GraftError::malformed(
                    "document",
                    format!("top level must be a dictionary, found {}", other.type_name()),
                ))
            }
        };

        let raw_objects = match top.remove("objects") {
            Some(Value::Dict(d)) => d,
            Some(other) => {
                return Err(GraftError::malformed(
                    "objects",
                    format!("expected dictionary, found {}", other.type_name()),
                ))
            }
            None => return Err(GraftError::malformed("document", "missing `objects` dictionary")),
        };

        let root_object = match top.remove("rootObject") {
            Some(Value::String(s)) => Some(ObjectId::new(s)),
            Some(other) => {
                return Err(GraftError::malformed(
                    "rootObject",
                    format!("expected identifier string, found {}", other.type_name()),
                ))
            }
            None => None,
        };

        let mut objects = BTreeMap::new();
        for (key, raw) in raw_objects {
            let mut fields = match raw {
                Value::Dict(d) => d,
                other => {
                    return Err(GraftError::malformed(
                        format!("object {key}"),
                        format!("expected dictionary, found {}", other.type_name()),
                    ))
                }
            };
            let isa = match fields.remove("isa") {
                Some(Value::String(isa)) if !isa.is_empty() => isa,
                _ => return Err(GraftError::malformed(format!("object {key}"), "missing `isa`")),
            };
            objects.insert(ObjectId::new(key), Object { isa, fields });
        }

        tracing::debug!(objects = objects.len(), "parsed project graph");

        Ok(Self {
            meta: top,
            objects,
            root_object,
        })
    }

    /// Rebuild the plist value for the whole document.
    pub fn to_value(&self) -> Value {
        let mut top = self.meta.clone();
        let objects = self
            .objects
            .iter()
            .map(|(id, obj)| (id.as_str().to_string(), Value::Dict(obj.to_dict())))
            .collect::<Dict>();
        top.insert("objects".to_string(), Value::Dict(objects));
        if let Some(root) = &self.root_object {
            top.insert("rootObject".to_string(), Value::from(root));
        }
        Value::Dict(top)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn get(&self, id: &ObjectId) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects.keys()
    }

    /// All objects of one kind, in identifier order.
    pub fn objects_of<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = (&'a ObjectId, &'a Object)> + 'a {
        self.objects.iter().filter(move |(_, o)| &o.kind() == kind)
    }

    /// All targets, in identifier order.
    pub fn targets(&self) -> impl Iterator<Item = (&ObjectId, &Object)> {
        self.objects.iter().filter(|(_, o)| o.kind().is_target())
    }

    /// Look a target up by exact, case-sensitive name.
    pub fn find_target(&self, name: &str) -> Option<(&ObjectId, &Object)> {
        self.targets().find(|(_, o)| o.name() == Some(name))
    }

    /// The root `PBXProject`, if `rootObject` points at one.
    pub fn project(&self) -> Option<(&ObjectId, &Object)> {
        let id = self.root_object.as_ref()?;
        let obj = self.objects.get(id)?;
        (obj.kind() == NodeKind::Project).then_some((id, obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 56;
	objects = {
		P1 = {isa = PBXProject; targets = (T1, ); mainGroup = G1; };
		G1 = {isa = PBXGroup; children = (); sourceTree = "<group>"; };
		T1 = {isa = PBXNativeTarget; name = App; };
	};
	rootObject = P1;
}"#;

    #[test]
    fn lifts_objects_and_root() {
        let g = ProjectGraph::parse(SMALL).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.root_object, Some(ObjectId::new("P1")));
        assert_eq!(g.project().map(|(id, _)| id.as_str()), Some("P1"));
        assert_eq!(g.find_target("App").map(|(id, _)| id.as_str()), Some("T1"));
        assert!(g.find_target("app").is_none());
        assert_eq!(g.meta["objectVersion"].as_str(), Some("56"));
    }

    #[test]
    fn value_round_trip_is_lossless() {
        let g = ProjectGraph::parse(SMALL).unwrap();
        let again = ProjectGraph::from_value(g.to_value()).unwrap();
        assert_eq!(g, again);
    }

    #[test]
    fn missing_objects_is_malformed() {
        let err = ProjectGraph::parse("{ archiveVersion = 1; }").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("objects"));
    }

    #[test]
    fn object_without_isa_names_the_key() {
        let err = ProjectGraph::parse("{ objects = { BAD = { name = x; }; }; }").unwrap_err();
        assert!(err.to_string().contains("object BAD"));
    }

    #[test]
    fn empty_graph_has_no_targets() {
        let g = ProjectGraph::empty();
        assert!(g.is_empty());
        assert_eq!(g.targets().count(), 0);
        assert!(g.project().is_none());
    }
}
