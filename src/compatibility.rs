//! Schema compatibility checking
//!
//! Decides whether moving from one schema revision to the next is safe for
//! payloads written against the old revision, and how large a version bump the
//! change needs.
//!
//! Both schemas are normalized, then flattened into maps of field path →
//! [`FieldDescriptor`]. Paths are built from property names, `[]` for array
//! items, and `oneOf/N`, `allOf/N`, `$defs/name` for alternatives and
//! definitions, e.g. `blocks[].oneOf/1.caption`.
//!
//! The comparison is directional (old → new):
//!
//! | Change | Level |
//! |---|---|
//! | field removed | breaking |
//! | type narrowed or replaced | breaking |
//! | optional → required, new required field | breaking |
//! | new optional field, widened type, required → optional | minor |
//! | anything else in the tree (titles, descriptions, formats, ...) | patch |
//!
//! Shapes the analyzer cannot compare structurally (mixed `type` unions,
//! `oneOf` with object branches, `allOf`, `$ref`, unconstrained nodes) only
//! count as unchanged when their signatures match exactly.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checksum::fingerprint;
use crate::error::{Result, SchemaError};
use crate::normalize::normalize;
use crate::schema::{is_scalar_type, json_kind, SchemaNode, Shape};
use crate::version::{ChangeLevel, SchemaVersion};

/// Result of a compatibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    /// False iff `breaking_changes` is non-empty
    pub compatible: bool,
    /// Required version bump
    pub change_level: ChangeLevel,
    /// Every breaking change found
    pub breaking_changes: Vec<BreakingChange>,
    /// Non-breaking changes worth surfacing to an operator
    pub warnings: Vec<String>,
}

impl CompatibilityResult {
    /// Whether the change breaks existing payloads
    pub fn is_breaking(&self) -> bool {
        !self.breaking_changes.is_empty()
    }

    /// Reject breaking changes unless the caller explicitly overrides
    pub fn ensure_accepted(&self, slug: &str, allow_breaking: bool) -> Result<()> {
        if self.is_breaking() && !allow_breaking {
            return Err(SchemaError::SchemaCompatibilityBreaking {
                slug: slug.to_string(),
                changes: self.breaking_changes.clone(),
            });
        }
        Ok(())
    }

    /// The version that follows `current` for this change
    pub fn next_version(&self, current: &SchemaVersion) -> Result<SchemaVersion> {
        current.bump(self.change_level)
    }

    /// One-line summary of the check
    pub fn summary(&self) -> String {
        match self.change_level {
            ChangeLevel::Major => format!("{} breaking changes detected", self.breaking_changes.len()),
            ChangeLevel::Minor => "backward compatible changes detected".to_string(),
            ChangeLevel::Patch => "cosmetic changes detected".to_string(),
            ChangeLevel::None => "No changes detected".to_string(),
        }
    }
}

/// A change that can invalidate previously valid payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChange {
    #[serde(rename = "type")]
    pub kind: BreakingChangeKind,
    /// Field path of the affected field
    pub field: String,
    /// Human-readable description
    pub description: String,
}

impl BreakingChange {
    pub fn new(kind: BreakingChangeKind, field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            description: description.into(),
        }
    }
}

/// Type of breaking change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakingChangeKind {
    /// A field was removed
    FieldRemoved,
    /// A field's type was narrowed or replaced
    TypeChanged,
    /// A field became required, or a new required field appeared
    RequiredAdded,
}

impl fmt::Display for BreakingChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BreakingChangeKind::FieldRemoved => "field_removed",
            BreakingChangeKind::TypeChanged => "type_changed",
            BreakingChangeKind::RequiredAdded => "required_added",
        })
    }
}

/// Coarse kind of a field's type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Scalar,
    Array,
    Object,
    Unknown,
}

/// What a field accepts, as far as compatibility is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    /// Accepted scalar type names (scalar kind only)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub scalar_types: BTreeSet<String>,
    /// Item type (array kind only; `None` when items are unconstrained)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_item: Option<Box<TypeDescriptor>>,
    /// Fingerprint of shapes that are not compared structurally
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

impl TypeDescriptor {
    pub fn scalar<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: TypeKind::Scalar,
            scalar_types: types.into_iter().map(Into::into).collect(),
            array_item: None,
            signature: String::new(),
        }
    }

    pub fn array(item: Option<TypeDescriptor>) -> Self {
        Self {
            kind: TypeKind::Array,
            scalar_types: BTreeSet::new(),
            array_item: item.map(Box::new),
            signature: String::new(),
        }
    }

    pub fn object() -> Self {
        Self {
            kind: TypeKind::Object,
            scalar_types: BTreeSet::new(),
            array_item: None,
            signature: String::new(),
        }
    }

    pub fn unknown(signature: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Unknown,
            scalar_types: BTreeSet::new(),
            array_item: None,
            signature: signature.into(),
        }
    }

    /// Classify what a schema node accepts
    pub fn classify(node: &SchemaNode) -> Self {
        match node.shape() {
            Shape::Typed(types) => classify_type_list(types, node),
            Shape::Object => Self::object(),
            Shape::Const(value) => classify_literals(std::slice::from_ref(value), "const"),
            Shape::Enum(values) => classify_literals(values, "enum"),
            Shape::OneOf(branches) => {
                let classified: Vec<TypeDescriptor> = branches.iter().map(Self::classify).collect();
                if classified.iter().all(|d| d.kind == TypeKind::Scalar) {
                    Self::scalar(classified.into_iter().flat_map(|d| d.scalar_types))
                } else {
                    Self::unknown("oneOf")
                }
            }
            Shape::AllOf(_) => Self::unknown("allOf"),
            Shape::Ref(target) => Self::unknown(format!("$ref:{}", target)),
            Shape::Unconstrained => Self::unknown(""),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Scalar => {
                let names: Vec<&str> = self.scalar_types.iter().map(String::as_str).collect();
                write!(f, "{}", names.join("|"))
            }
            TypeKind::Array => match &self.array_item {
                Some(item) => write!(f, "array<{}>", item),
                None => write!(f, "array"),
            },
            TypeKind::Object => write!(f, "object"),
            TypeKind::Unknown if self.signature.is_empty() => write!(f, "unknown"),
            TypeKind::Unknown => write!(f, "unknown({})", self.signature),
        }
    }
}

fn classify_type_list(types: &[String], node: &SchemaNode) -> TypeDescriptor {
    let set: BTreeSet<&str> = types.iter().map(String::as_str).collect();

    if set.len() == 1 {
        return match types[0].as_str() {
            "array" => TypeDescriptor::array(node.items.as_deref().map(TypeDescriptor::classify)),
            "object" => TypeDescriptor::object(),
            name if is_scalar_type(name) => TypeDescriptor::scalar([name]),
            other => TypeDescriptor::unknown(format!("type:{}", other)),
        };
    }

    if set.iter().all(|t| is_scalar_type(t)) {
        TypeDescriptor::scalar(set)
    } else {
        // Mixed composite unions (object|array with anything else) are not
        // compared structurally.
        let names: Vec<&str> = set.into_iter().collect();
        TypeDescriptor::unknown(format!("type:{}", names.join(",")))
    }
}

fn classify_literals(values: &[Value], tag: &str) -> TypeDescriptor {
    if values.iter().all(|v| !v.is_object() && !v.is_array()) {
        TypeDescriptor::scalar(values.iter().map(json_kind))
    } else {
        TypeDescriptor::unknown(format!("{}:{}", tag, Value::Array(values.to_vec())))
    }
}

/// A field's type and whether its parent requires it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub required: bool,
}

/// Field path → descriptor, ordered by path
pub type FieldMap = BTreeMap<String, FieldDescriptor>;

/// Flatten a schema tree into its field map
pub fn field_map(node: &SchemaNode) -> FieldMap {
    let mut fields = FieldMap::new();
    collect_fields(node, "", &mut fields);
    fields
}

fn collect_fields(node: &SchemaNode, prefix: &str, fields: &mut FieldMap) {
    for (name, child) in &node.properties {
        let path = join_path(prefix, name);
        fields.insert(
            path.clone(),
            FieldDescriptor {
                ty: TypeDescriptor::classify(child),
                required: node.required.contains(name),
            },
        );
        collect_fields(child, &path, fields);
    }
    if let Some(items) = &node.items {
        collect_fields(items, &format!("{}[]", prefix), fields);
    }
    for (i, branch) in node.one_of.iter().enumerate() {
        collect_fields(branch, &join_path(prefix, &format!("oneOf/{}", i)), fields);
    }
    for (i, branch) in node.all_of.iter().enumerate() {
        collect_fields(branch, &join_path(prefix, &format!("allOf/{}", i)), fields);
    }
    for (name, def) in &node.defs {
        collect_fields(def, &join_path(prefix, &format!("$defs/{}", name)), fields);
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

/// Outcome of comparing two type descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDelta {
    Unchanged,
    /// The new type accepts everything the old one did, and more
    Widened,
    /// Some previously valid values are no longer accepted
    Incompatible,
}

/// Compare an old field type with its new counterpart
pub fn compare_types(old: &TypeDescriptor, new: &TypeDescriptor) -> TypeDelta {
    if old.kind == TypeKind::Unknown || new.kind == TypeKind::Unknown {
        let identical = old.kind == new.kind && !old.signature.is_empty() && old.signature == new.signature;
        return if identical { TypeDelta::Unchanged } else { TypeDelta::Incompatible };
    }

    if old.kind != new.kind {
        return TypeDelta::Incompatible;
    }

    match old.kind {
        TypeKind::Scalar => {
            if old.scalar_types.is_empty() || new.scalar_types.is_empty() {
                TypeDelta::Incompatible
            } else if !new.scalar_types.is_superset(&old.scalar_types) {
                TypeDelta::Incompatible
            } else if new.scalar_types.len() == old.scalar_types.len() {
                TypeDelta::Unchanged
            } else {
                TypeDelta::Widened
            }
        }
        TypeKind::Array => match (&old.array_item, &new.array_item) {
            (None, None) => TypeDelta::Unchanged,
            (None, Some(_)) => TypeDelta::Incompatible,
            (Some(_), None) => TypeDelta::Widened,
            (Some(old_item), Some(new_item)) => compare_types(old_item, new_item),
        },
        // Nested fields surface through their own paths.
        TypeKind::Object => TypeDelta::Unchanged,
        TypeKind::Unknown => TypeDelta::Incompatible,
    }
}

/// Compatibility checker for schema revisions
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityChecker;

impl CompatibilityChecker {
    /// Create a new compatibility checker
    pub fn new() -> Self {
        Self
    }

    /// Field map of a schema in either dialect
    pub fn field_map(&self, schema: &Value) -> FieldMap {
        field_map(&SchemaNode::from_value(&normalize(schema)))
    }

    /// Check the change from `old` to `new`
    pub fn check(&self, old: &Value, new: &Value) -> CompatibilityResult {
        let old_fields = self.field_map(old);
        let new_fields = self.field_map(new);

        let mut breaking_changes = Vec::new();
        let mut warnings = Vec::new();
        let mut minor = false;

        for (path, before) in &old_fields {
            let Some(after) = new_fields.get(path) else {
                breaking_changes.push(BreakingChange::new(
                    BreakingChangeKind::FieldRemoved,
                    path,
                    format!("Field '{}' was removed", path),
                ));
                continue;
            };

            match compare_types(&before.ty, &after.ty) {
                TypeDelta::Unchanged => {}
                TypeDelta::Widened => {
                    minor = true;
                    warnings.push(format!("Type of '{}' widened from {} to {}", path, before.ty, after.ty));
                }
                TypeDelta::Incompatible => breaking_changes.push(BreakingChange::new(
                    BreakingChangeKind::TypeChanged,
                    path,
                    format!("Type of '{}' changed from {} to {}", path, before.ty, after.ty),
                )),
            }

            match (before.required, after.required) {
                (false, true) => breaking_changes.push(BreakingChange::new(
                    BreakingChangeKind::RequiredAdded,
                    path,
                    format!("Field '{}' is now required", path),
                )),
                (true, false) => {
                    minor = true;
                    warnings.push(format!("Field '{}' is no longer required", path));
                }
                _ => {}
            }
        }

        for (path, added) in new_fields.iter().filter(|(p, _)| !old_fields.contains_key(*p)) {
            if added.required {
                breaking_changes.push(BreakingChange::new(
                    BreakingChangeKind::RequiredAdded,
                    path,
                    format!("Required field '{}' was added", path),
                ));
            } else {
                minor = true;
            }
        }

        let change_level = if !breaking_changes.is_empty() {
            ChangeLevel::Major
        } else if minor {
            ChangeLevel::Minor
        } else if fingerprint(old) != fingerprint(new) {
            ChangeLevel::Patch
        } else {
            ChangeLevel::None
        };

        tracing::debug!(
            %change_level,
            breaking = breaking_changes.len(),
            fields_before = old_fields.len(),
            fields_after = new_fields.len(),
            "compared schema revisions"
        );

        CompatibilityResult {
            compatible: breaking_changes.is_empty(),
            change_level,
            breaking_changes,
            warnings,
        }
    }
}

/// Check the change from `old` to `new` with a default checker
pub fn compare(old: &Value, new: &Value) -> CompatibilityResult {
    CompatibilityChecker::new().check(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(schema: Value) -> TypeDescriptor {
        TypeDescriptor::classify(&SchemaNode::from_value(&schema))
    }

    fn article() -> Value {
        json!({
            "type": "object",
            "properties": { "title": { "type": "string" } },
            "required": ["title"]
        })
    }

    #[test]
    fn test_classify_scalars() {
        assert_eq!(classify(json!({ "type": "string" })), TypeDescriptor::scalar(["string"]));
        assert_eq!(
            classify(json!({ "type": ["null", "string"] })),
            TypeDescriptor::scalar(["null", "string"])
        );
        assert_eq!(classify(json!({ "const": "draft" })), TypeDescriptor::scalar(["string"]));
        assert_eq!(
            classify(json!({ "enum": ["a", 1, null] })),
            TypeDescriptor::scalar(["string", "number", "null"])
        );
    }

    #[test]
    fn test_classify_containers() {
        assert_eq!(classify(json!({ "type": "object" })), TypeDescriptor::object());
        assert_eq!(classify(json!({ "properties": { "a": {} } })), TypeDescriptor::object());
        assert_eq!(
            classify(json!({ "type": "array", "items": { "type": "integer" } })),
            TypeDescriptor::array(Some(TypeDescriptor::scalar(["integer"])))
        );
        assert_eq!(classify(json!({ "type": "array" })), TypeDescriptor::array(None));
    }

    #[test]
    fn test_classify_unknown_shapes() {
        assert_eq!(
            classify(json!({ "type": ["string", "object"] })),
            TypeDescriptor::unknown("type:object,string")
        );
        assert_eq!(
            classify(json!({ "type": ["array", "object"] })),
            TypeDescriptor::unknown("type:array,object")
        );
        assert_eq!(
            classify(json!({ "oneOf": [{ "type": "string" }, { "type": "object" }] })),
            TypeDescriptor::unknown("oneOf")
        );
        assert_eq!(classify(json!({ "allOf": [{ "properties": {} }] })), TypeDescriptor::unknown("allOf"));
        assert_eq!(classify(json!({ "description": "anything" })), TypeDescriptor::unknown(""));
    }

    #[test]
    fn test_classify_scalar_oneof_collapses() {
        assert_eq!(
            classify(json!({ "oneOf": [{ "type": "string" }, { "const": 3 }] })),
            TypeDescriptor::scalar(["string", "number"])
        );
    }

    #[test]
    fn test_field_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "blocks": {
                    "type": "array",
                    "items": {
                        "oneOf": [
                            { "type": "object", "properties": { "text": { "type": "string" } } },
                            { "type": "object", "properties": { "src": { "type": "string" } }, "required": ["src"] }
                        ]
                    }
                },
                "seo": { "allOf": [{ "properties": { "keywords": { "type": "string" } } }] }
            },
            "$defs": { "link": { "type": "object", "properties": { "href": { "type": "string" } } } }
        });

        let fields = CompatibilityChecker::new().field_map(&schema);
        let paths: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "$defs/link.href",
                "blocks",
                "blocks[].oneOf/0.text",
                "blocks[].oneOf/1.src",
                "seo",
                "seo.allOf/0.keywords",
                "title",
            ]
        );
        assert!(fields["blocks[].oneOf/1.src"].required);
        assert!(!fields["title"].required);
    }

    #[test]
    fn test_scalar_comparison() {
        let string = TypeDescriptor::scalar(["string"]);
        let widened = TypeDescriptor::scalar(["string", "number"]);
        let number = TypeDescriptor::scalar(["number"]);
        let integer = TypeDescriptor::scalar(["integer"]);

        assert_eq!(compare_types(&string, &string), TypeDelta::Unchanged);
        assert_eq!(compare_types(&string, &widened), TypeDelta::Widened);
        assert_eq!(compare_types(&widened, &string), TypeDelta::Incompatible);
        assert_eq!(compare_types(&string, &number), TypeDelta::Incompatible);
        assert_eq!(compare_types(&integer, &number), TypeDelta::Incompatible);
        assert_eq!(
            compare_types(&TypeDescriptor::scalar(Vec::<String>::new()), &string),
            TypeDelta::Incompatible
        );
    }

    #[test]
    fn test_array_comparison() {
        let free = TypeDescriptor::array(None);
        let strings = TypeDescriptor::array(Some(TypeDescriptor::scalar(["string"])));
        let mixed = TypeDescriptor::array(Some(TypeDescriptor::scalar(["string", "null"])));

        assert_eq!(compare_types(&free, &free), TypeDelta::Unchanged);
        assert_eq!(compare_types(&free, &strings), TypeDelta::Incompatible);
        assert_eq!(compare_types(&strings, &free), TypeDelta::Widened);
        assert_eq!(compare_types(&strings, &mixed), TypeDelta::Widened);
        assert_eq!(compare_types(&mixed, &strings), TypeDelta::Incompatible);
    }

    #[test]
    fn test_unknown_comparison_is_conservative() {
        let one_of = TypeDescriptor::unknown("oneOf");
        assert_eq!(compare_types(&one_of, &one_of), TypeDelta::Unchanged);
        assert_eq!(compare_types(&one_of, &TypeDescriptor::unknown("allOf")), TypeDelta::Incompatible);

        let unconstrained = TypeDescriptor::unknown("");
        assert_eq!(compare_types(&unconstrained, &unconstrained), TypeDelta::Incompatible);
        assert_eq!(
            compare_types(&TypeDescriptor::object(), &TypeDescriptor::scalar(["string"])),
            TypeDelta::Incompatible
        );
    }

    #[test]
    fn test_adding_optional_field_is_minor() {
        let new = json!({
            "type": "object",
            "properties": { "title": { "type": "string" }, "subtitle": { "type": "string" } },
            "required": ["title"]
        });
        let result = compare(&article(), &new);
        assert!(result.compatible);
        assert_eq!(result.change_level, ChangeLevel::Minor);
        assert!(result.breaking_changes.is_empty());
    }

    #[test]
    fn test_removing_field_is_breaking() {
        let new = json!({ "type": "object", "properties": {} });
        let result = compare(&article(), &new);
        assert!(!result.compatible);
        assert_eq!(result.change_level, ChangeLevel::Major);
        assert_eq!(
            result.breaking_changes,
            vec![BreakingChange::new(
                BreakingChangeKind::FieldRemoved,
                "title",
                "Field 'title' was removed"
            )]
        );
    }

    #[test]
    fn test_required_transitions() {
        let optional = json!({ "type": "object", "properties": { "title": { "type": "string" } } });

        let loosened = compare(&article(), &optional);
        assert!(loosened.compatible);
        assert_eq!(loosened.change_level, ChangeLevel::Minor);
        assert_eq!(loosened.warnings, vec!["Field 'title' is no longer required"]);

        let tightened = compare(&optional, &article());
        assert_eq!(tightened.change_level, ChangeLevel::Major);
        assert_eq!(tightened.breaking_changes[0].kind, BreakingChangeKind::RequiredAdded);
    }

    #[test]
    fn test_new_required_field_is_breaking() {
        let new = json!({
            "type": "object",
            "properties": { "title": { "type": "string" }, "author": { "type": "string" } },
            "required": ["title", "author"]
        });
        let result = compare(&article(), &new);
        assert!(!result.compatible);
        assert_eq!(result.breaking_changes[0].field, "author");
        assert_eq!(result.breaking_changes[0].kind, BreakingChangeKind::RequiredAdded);
    }

    #[test]
    fn test_scalar_widening_and_narrowing() {
        let narrow = json!({ "type": "object", "properties": { "v": { "type": "string" } } });
        let wide = json!({ "type": "object", "properties": { "v": { "type": ["string", "number"] } } });

        let widened = compare(&narrow, &wide);
        assert_eq!(widened.change_level, ChangeLevel::Minor);
        assert!(widened.compatible);

        let narrowed = compare(&wide, &narrow);
        assert_eq!(narrowed.change_level, ChangeLevel::Major);
        assert_eq!(narrowed.breaking_changes[0].kind, BreakingChangeKind::TypeChanged);
    }

    #[test]
    fn test_cosmetic_change_is_patch() {
        let mut described = article();
        described["properties"]["title"]["description"] = json!("Headline shown in listings");
        assert_eq!(compare(&article(), &described).change_level, ChangeLevel::Patch);
    }

    #[test]
    fn test_version_stamp_alone_is_no_change() {
        let mut stamped = article();
        stamped["metadata"] = json!({ "slug": "article", "schema_version": "article@v4.0.0" });
        let result = compare(&article(), &stamped);
        assert_eq!(result.change_level, ChangeLevel::None);
        assert_eq!(result.summary(), "No changes detected");
    }

    #[test]
    fn test_ensure_accepted() {
        let result = compare(&article(), &json!({ "type": "object" }));
        assert!(matches!(
            result.ensure_accepted("article", false),
            Err(SchemaError::SchemaCompatibilityBreaking { .. })
        ));
        assert!(result.ensure_accepted("article", true).is_ok());
        assert_eq!(
            result.next_version(&SchemaVersion::initial("article")).unwrap().to_string(),
            "article@v2.0.0"
        );
    }

    #[test]
    fn test_result_serialization() {
        let result = compare(&article(), &json!({ "type": "object" }));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["change_level"], json!("major"));
        assert_eq!(value["breaking_changes"][0]["type"], json!("field_removed"));
    }
}
