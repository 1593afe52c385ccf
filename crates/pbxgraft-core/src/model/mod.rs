//! Typed project graph.
//!
//! A `project.pbxproj` document is a dictionary whose `objects` entry maps
//! opaque identifiers to typed records (`isa = PBXNativeTarget;` and so on).
//! Records point at each other by identifier, which makes the document a
//! directed graph. This module lifts the raw plist into that graph:
//!
//! - `ObjectId`: the opaque key
//! - `Object`: one record (`isa` + remaining fields)
//! - `NodeKind`: classification of `isa` values the engine understands
//! - `ProjectGraph`: the whole document (see `graph`)
//!
//! Unknown `isa` values are carried through untouched as `NodeKind::Other`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plist::{Dict, Value};

pub mod graph;
pub mod serialize;
pub mod validate;

pub use graph::ProjectGraph;

/// Opaque object identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ObjectId> for Value {
    fn from(id: &ObjectId) -> Self {
        Value::String(id.0.clone())
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.0)
    }
}

/// Classification of the record types the engine creates or inspects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    NativeTarget,
    FileReference,
    BuildFile,
    SourcesBuildPhase,
    FrameworksBuildPhase,
    CopyFilesBuildPhase,
    ResourcesBuildPhase,
    ConfigurationList,
    BuildConfiguration,
    Group,
    Project,
    ContainerItemProxy,
    TargetDependency,
    Other(String),
}

impl NodeKind {
    pub fn from_isa(isa: &str) -> Self {
        match isa {
            "PBXNativeTarget" => Self::NativeTarget,
            "PBXFileReference" => Self::FileReference,
            "PBXBuildFile" => Self::BuildFile,
            "PBXSourcesBuildPhase" => Self::SourcesBuildPhase,
            "PBXFrameworksBuildPhase" => Self::FrameworksBuildPhase,
            "PBXCopyFilesBuildPhase" => Self::CopyFilesBuildPhase,
            "PBXResourcesBuildPhase" => Self::ResourcesBuildPhase,
            "XCConfigurationList" => Self::ConfigurationList,
            "XCBuildConfiguration" => Self::BuildConfiguration,
            "PBXGroup" => Self::Group,
            "PBXProject" => Self::Project,
            "PBXContainerItemProxy" => Self::ContainerItemProxy,
            "PBXTargetDependency" => Self::TargetDependency,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn isa(&self) -> &str {
        match self {
            Self::NativeTarget => "PBXNativeTarget",
            Self::FileReference => "PBXFileReference",
            Self::BuildFile => "PBXBuildFile",
            Self::SourcesBuildPhase => "PBXSourcesBuildPhase",
            Self::FrameworksBuildPhase => "PBXFrameworksBuildPhase",
            Self::CopyFilesBuildPhase => "PBXCopyFilesBuildPhase",
            Self::ResourcesBuildPhase => "PBXResourcesBuildPhase",
            Self::ConfigurationList => "XCConfigurationList",
            Self::BuildConfiguration => "XCBuildConfiguration",
            Self::Group => "PBXGroup",
            Self::Project => "PBXProject",
            Self::ContainerItemProxy => "PBXContainerItemProxy",
            Self::TargetDependency => "PBXTargetDependency",
            Self::Other(isa) => isa,
        }
    }

    pub fn is_build_phase(&self) -> bool {
        matches!(
            self,
            Self::SourcesBuildPhase
                | Self::FrameworksBuildPhase
                | Self::CopyFilesBuildPhase
                | Self::ResourcesBuildPhase
        ) || matches!(self, Self::Other(isa) if isa.ends_with("BuildPhase"))
    }

    /// Buildable targets of any flavor. Target names are unique across all of them.
    pub fn is_target(&self) -> bool {
        matches!(self, Self::NativeTarget)
            || matches!(self, Self::Other(isa) if isa == "PBXAggregateTarget" || isa == "PBXLegacyTarget")
    }

    /// Display name Xcode uses for a phase that has no explicit `name`.
    pub fn default_phase_name(&self) -> Option<&'static str> {
        match self {
            Self::SourcesBuildPhase => Some("Sources"),
            Self::FrameworksBuildPhase => Some("Frameworks"),
            Self::CopyFilesBuildPhase => Some("CopyFiles"),
            Self::ResourcesBuildPhase => Some("Resources"),
            _ => None,
        }
    }
}

/// One record of the `objects` dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub isa: String,
    pub fields: Dict,
}

impl Object {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            isa: kind.isa().to_string(),
            fields: Dict::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Builder-style setter for a list of references.
    pub fn with_refs<'a>(mut self, key: &str, ids: impl IntoIterator<Item = &'a ObjectId>) -> Self {
        let items = ids.into_iter().map(Value::from).collect::<Vec<_>>();
        self.fields.insert(key.to_string(), Value::Array(items));
        self
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_isa(&self.isa)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// Identifiers stored in a list-valued field, in document order.
    pub fn ref_list(&self, key: &str) -> Vec<ObjectId> {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ObjectId::new)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn ref_field(&self, key: &str) -> Option<ObjectId> {
        self.get_str(key).map(ObjectId::new)
    }

    /// Rebuild the plist dictionary for this record.
    pub fn to_dict(&self) -> Dict {
        let mut d = self.fields.clone();
        d.insert("isa".to_string(), Value::string(self.isa.clone()));
        d
    }
}
