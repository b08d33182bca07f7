//! Entity handles and metadata.
//!
//! An index hands out [`EntityId`]s for types and methods. The ids are
//! opaque: two ids are the same entity exactly when they compare equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque handle to a type or method in a [`SymbolIndex`](crate::SymbolIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates an id from its raw value.
    pub fn new(raw: usize) -> Self {
        Self(raw as u32)
    }

    /// Returns the raw value, usable as an arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A concrete or abstract class.
    Class,
    /// An interface type.
    Interface,
    /// An enum type.
    Enum,
    /// An annotation type (a marker candidate).
    Annotation,
    /// A method declared on a type.
    Method,
}

impl EntityKind {
    /// True for every kind that names a type.
    pub fn is_type(self) -> bool {
        !matches!(self, Self::Method)
    }

    /// True for classes, interfaces and enums, the kinds that can become
    /// architecture nodes. Annotation types are markers, not components.
    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::Enum)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata the index keeps for each entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,

    /// Simple name, e.g. `OrderService` or `publish`.
    pub name: String,

    /// Fully qualified name. Methods use `Type#method`.
    pub qualified_name: String,

    /// Source path of the declaring file.
    pub file: String,

    /// Declaring type for methods and nested types.
    pub container: Option<EntityId>,

    /// True when the entity comes from a dependency rather than the project.
    pub library: bool,
}

/// One annotation applied to an entity, as written at the use site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AnnotationRecord")]
pub struct AnnotationUse {
    /// The annotation type name as written (qualified or simple).
    #[serde(rename = "type")]
    pub name: String,

    /// Attribute values, stringified.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl AnnotationUse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute value.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns an attribute value if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Snapshot form of an annotation: either a bare name or a full record.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotationRecord {
    Name(String),
    Full {
        #[serde(rename = "type")]
        name: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },
}

impl From<AnnotationRecord> for AnnotationUse {
    fn from(record: AnnotationRecord) -> Self {
        match record {
            AnnotationRecord::Name(name) => AnnotationUse::new(name),
            AnnotationRecord::Full { name, attributes } => AnnotationUse { name, attributes },
        }
    }
}

/// A place in the source that refers to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceSite {
    /// The top-level type whose body contains the reference, if any.
    pub enclosing_type: Option<EntityId>,

    /// Source path of the file containing the reference.
    pub file: String,

    /// 1-based line, when the index knows it.
    pub line: Option<u32>,
}
