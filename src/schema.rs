//! Typed view over a JSON schema tree
//!
//! Schemas arrive as untyped `serde_json::Value` trees. [`SchemaNode`] lifts
//! the parts the engine cares about into a struct, and [`Shape`] says which
//! constraint decides what a node accepts, so type classification is a single
//! exhaustive match.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;

/// Prefix of vendor extension keys, accepted anywhere
pub const EXTENSION_PREFIX: &str = "x-";

/// Whether `key` is a vendor extension (`x-...`)
pub fn is_extension(key: &str) -> bool {
    key.starts_with(EXTENSION_PREFIX)
}

/// The schema vocabulary accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Schema,
    Id,
    Ref,
    Defs,
    Anchor,
    Metadata,
    Ui,
    Type,
    Properties,
    Required,
    Items,
    OneOf,
    AllOf,
    Const,
    Enum,
    Default,
    Title,
    Description,
    Format,
    AdditionalProperties,
}

impl Keyword {
    pub const ALL: [Keyword; 20] = [
        Keyword::Schema,
        Keyword::Id,
        Keyword::Ref,
        Keyword::Defs,
        Keyword::Anchor,
        Keyword::Metadata,
        Keyword::Ui,
        Keyword::Type,
        Keyword::Properties,
        Keyword::Required,
        Keyword::Items,
        Keyword::OneOf,
        Keyword::AllOf,
        Keyword::Const,
        Keyword::Enum,
        Keyword::Default,
        Keyword::Title,
        Keyword::Description,
        Keyword::Format,
        Keyword::AdditionalProperties,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Schema => "$schema",
            Keyword::Id => "$id",
            Keyword::Ref => "$ref",
            Keyword::Defs => "$defs",
            Keyword::Anchor => "$anchor",
            Keyword::Metadata => "metadata",
            Keyword::Ui => "ui",
            Keyword::Type => "type",
            Keyword::Properties => "properties",
            Keyword::Required => "required",
            Keyword::Items => "items",
            Keyword::OneOf => "oneOf",
            Keyword::AllOf => "allOf",
            Keyword::Const => "const",
            Keyword::Enum => "enum",
            Keyword::Default => "default",
            Keyword::Title => "title",
            Keyword::Description => "description",
            Keyword::Format => "format",
            Keyword::AdditionalProperties => "additionalProperties",
        }
    }

    /// Keywords permitted inside an `allOf` branch (`type` is checked separately)
    pub fn allowed_in_all_of(&self) -> bool {
        matches!(
            self,
            Keyword::Properties
                | Keyword::Required
                | Keyword::AdditionalProperties
                | Keyword::Title
                | Keyword::Description
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON scalar type names
pub const SCALAR_TYPES: &[&str] = &["string", "number", "integer", "boolean", "null"];

pub fn is_scalar_type(name: &str) -> bool {
    SCALAR_TYPES.contains(&name)
}

/// JSON kind of a literal value, as used by `const`/`enum`
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A schema node with the keywords the analyzer understands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// Declared `type` names, in declaration order
    pub types: Vec<String>,
    pub constant: Option<Value>,
    pub enumeration: Option<Vec<Value>>,
    pub reference: Option<String>,
    pub properties: BTreeMap<String, SchemaNode>,
    pub required: BTreeSet<String>,
    /// Single-schema `items`; tuple forms are not represented
    pub items: Option<Box<SchemaNode>>,
    pub one_of: Vec<SchemaNode>,
    pub all_of: Vec<SchemaNode>,
    pub defs: BTreeMap<String, SchemaNode>,
}

/// The constraint that decides what a node accepts, in precedence order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// Explicit `type` (string or list)
    Typed(&'a [String]),
    /// No `type`, but `properties`
    Object,
    Const(&'a Value),
    Enum(&'a [Value]),
    OneOf(&'a [SchemaNode]),
    AllOf(&'a [SchemaNode]),
    Ref(&'a str),
    /// Nothing recognizable
    Unconstrained,
}

impl SchemaNode {
    /// Build the typed view of a schema value; unknown keywords are ignored.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let types = match obj.get("type") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(list)) => list.iter().filter_map(Value::as_str).map(String::from).collect(),
            _ => Vec::new(),
        };

        let node_map = |key: &str| -> BTreeMap<String, SchemaNode> {
            obj.get(key)
                .and_then(Value::as_object)
                .map(|m| m.iter().map(|(k, v)| (k.clone(), SchemaNode::from_value(v))).collect())
                .unwrap_or_default()
        };
        let node_list = |key: &str| -> Vec<SchemaNode> {
            obj.get(key)
                .and_then(Value::as_array)
                .map(|l| l.iter().map(SchemaNode::from_value).collect())
                .unwrap_or_default()
        };

        Self {
            types,
            constant: obj.get("const").cloned(),
            enumeration: obj.get("enum").and_then(Value::as_array).cloned(),
            reference: obj.get("$ref").and_then(Value::as_str).map(String::from),
            properties: node_map("properties"),
            required: obj
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).map(String::from).collect())
                .unwrap_or_default(),
            items: obj
                .get("items")
                .filter(|i| i.is_object())
                .map(|i| Box::new(SchemaNode::from_value(i))),
            one_of: node_list("oneOf"),
            all_of: node_list("allOf"),
            defs: node_map("$defs"),
        }
    }

    /// Which constraint governs this node
    pub fn shape(&self) -> Shape<'_> {
        if !self.types.is_empty() {
            Shape::Typed(&self.types)
        } else if !self.properties.is_empty() {
            Shape::Object
        } else if let Some(value) = &self.constant {
            Shape::Const(value)
        } else if let Some(values) = &self.enumeration {
            Shape::Enum(values)
        } else if !self.one_of.is_empty() {
            Shape::OneOf(&self.one_of)
        } else if !self.all_of.is_empty() {
            Shape::AllOf(&self.all_of)
        } else if let Some(target) = &self.reference {
            Shape::Ref(target)
        } else {
            Shape::Unconstrained
        }
    }
}
