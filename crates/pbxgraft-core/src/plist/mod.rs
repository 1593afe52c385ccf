//! ASCII (OpenStep) property lists, the on-disk format of `project.pbxproj`.
//!
//! The codec is split in two:
//! - `parse`: text -> `Value`, discarding comments
//! - `write`: `Value` -> text, with optional `/* ... */` annotations supplied
//!   by the caller (the project model decides what an identifier is called)
//!
//! Dictionaries are `BTreeMap`s. Xcode writes keys sorted (with `isa` first),
//! so sorted storage loses nothing and keeps serialization deterministic.

use std::collections::BTreeMap;

pub mod parse;
pub mod write;

pub use parse::parse;
pub use write::{quote, Annotate, NoAnnotations, Style};

pub type Dict = BTreeMap<String, Value>;

/// A property-list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dict(Dict),
    Data(Vec<u8>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn empty_array() -> Self {
        Self::Array(Vec::new())
    }

    pub fn empty_dict() -> Self {
        Self::Dict(Dict::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dictionary",
            Self::Data(_) => "data",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Self::Dict(d)
    }
}
