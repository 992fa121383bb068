//! Embedded schema metadata
//!
//! A schema carries its own identity under a reserved `metadata` key:
//!
//! ```json
//! {
//!   "type": "object",
//!   "properties": { "title": { "type": "string" } },
//!   "metadata": {
//!     "slug": "article",
//!     "schema_version": "article@v1.2.0",
//!     "ui_overlays": ["overlays/article.json", { "ref": "overlays/seo.json" }],
//!     "block_availability": { "allow": ["hero", "text"], "deny": ["embed"] }
//!   }
//! }
//! ```
//!
//! so the version travels with the document instead of living in a side table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::version::SchemaVersion;

/// Reserved key holding the metadata block
pub const METADATA_KEY: &str = "metadata";

const SLUG_KEY: &str = "slug";
const SCHEMA_VERSION_KEY: &str = "schema_version";
const UI_OVERLAYS_KEY: &str = "ui_overlays";
const BLOCK_AVAILABILITY_KEY: &str = "block_availability";

/// Metadata embedded in a schema tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Owning content type / block slug
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    /// Canonical `slug@vX.Y.Z` version of this schema
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema_version: String,
    /// References to UI overlay documents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ui_overlays: Vec<String>,
    /// Which block types may be embedded under this schema
    #[serde(default, skip_serializing_if = "BlockAvailability::is_empty")]
    pub block_availability: BlockAvailability,
}

/// Allow/deny rules for embeddable blocks.
///
/// Tokens are compared trimmed and lowercased. An empty allow-list admits
/// everything that is not denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAvailability {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

impl BlockAvailability {
    pub fn new<A, D>(allow: A, deny: D) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let mut rules = Self::default();
        push_tokens(&mut rules.allow, allow);
        push_tokens(&mut rules.deny, deny);
        rules
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }

    /// Whether a block type may be used
    pub fn allows(&self, block: &str) -> bool {
        let token = normalize_token(block);
        if self.deny.iter().any(|d| *d == token) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|a| *a == token)
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(_) => Self::new(string_list(value), Vec::<String>::new()),
            Value::Object(obj) => {
                let allow = ["allow", "allowed"]
                    .iter()
                    .filter_map(|k| obj.get(*k))
                    .flat_map(string_list);
                let deny = ["deny", "denied"]
                    .iter()
                    .filter_map(|k| obj.get(*k))
                    .flat_map(string_list);
                Self::new(allow, deny)
            }
            _ => Self::default(),
        }
    }

    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("allow".to_string(), strings_to_value(&self.allow));
        obj.insert("deny".to_string(), strings_to_value(&self.deny));
        Value::Object(obj)
    }
}

impl Metadata {
    /// Whether every field is empty
    pub fn is_empty(&self) -> bool {
        self.slug.is_empty()
            && self.schema_version.is_empty()
            && self.ui_overlays.is_empty()
            && self.block_availability.is_empty()
    }

    /// Read the metadata block of a schema; missing or malformed parts read as empty.
    pub fn extract(schema: &Value) -> Self {
        let Some(block) = schema.get(METADATA_KEY).and_then(Value::as_object) else {
            return Self::default();
        };

        let text = |key: &str| {
            block
                .get(key)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let ui_overlays = block
            .get(UI_OVERLAYS_KEY)
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(overlay_ref).collect())
            .unwrap_or_default();

        let block_availability = block
            .get(BLOCK_AVAILABILITY_KEY)
            .map(BlockAvailability::from_value)
            .unwrap_or_default();

        Self {
            slug: text(SLUG_KEY),
            schema_version: text(SCHEMA_VERSION_KEY),
            ui_overlays,
            block_availability,
        }
    }

    /// Merge the non-empty fields of this metadata into a copy of `schema`.
    ///
    /// Fields left empty here are never removed from the existing block.
    pub fn apply(&self, schema: &Value) -> Result<Value> {
        let mut out = schema.clone();
        let root = out
            .as_object_mut()
            .ok_or_else(|| SchemaError::InvalidFormat("schema must be a JSON object".to_string()))?;

        if !root.get(METADATA_KEY).map_or(false, Value::is_object) {
            root.insert(METADATA_KEY.to_string(), Value::Object(Map::new()));
        }
        let block = root
            .get_mut(METADATA_KEY)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SchemaError::InvalidFormat("metadata must be a JSON object".to_string()))?;

        if !self.slug.is_empty() {
            block.insert(SLUG_KEY.to_string(), Value::String(self.slug.clone()));
        }
        if !self.schema_version.is_empty() {
            block.insert(SCHEMA_VERSION_KEY.to_string(), Value::String(self.schema_version.clone()));
        }
        if !self.ui_overlays.is_empty() {
            block.insert(UI_OVERLAYS_KEY.to_string(), strings_to_value(&self.ui_overlays));
        }
        if !self.block_availability.is_empty() {
            block.insert(BLOCK_AVAILABILITY_KEY.to_string(), self.block_availability.to_value());
        }

        Ok(out)
    }
}

/// Parse the embedded `metadata.schema_version`, if there is one
pub fn schema_version(schema: &Value) -> Result<Option<SchemaVersion>> {
    let metadata = Metadata::extract(schema);
    if metadata.schema_version.is_empty() {
        return Ok(None);
    }
    SchemaVersion::parse(&metadata.schema_version).map(Some)
}

/// Make sure a schema carries a version for `slug`.
///
/// A schema without a version is stamped `slug@v1.0.0`. A schema that already
/// has one must agree with `slug`, both in its version identifier and in
/// `metadata.slug`.
pub fn ensure_schema_version(schema: &Value, slug: &str) -> Result<Value> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(SchemaError::InvalidSchemaVersion("slug must not be empty".to_string()));
    }

    let existing = Metadata::extract(schema);
    if !existing.slug.is_empty() && existing.slug != slug {
        return Err(SchemaError::SlugMismatch {
            expected: slug.to_string(),
            found: existing.slug,
        });
    }

    let version = match schema_version(schema)? {
        Some(version) if version.slug != slug => {
            return Err(SchemaError::SlugMismatch {
                expected: slug.to_string(),
                found: version.slug,
            });
        }
        Some(version) => version,
        None => SchemaVersion::initial(slug),
    };

    Metadata {
        slug: slug.to_string(),
        schema_version: version.to_string(),
        ..Default::default()
    }
    .apply(schema)
}

/// Copy of `schema` without the version identity (`slug`, `schema_version`).
///
/// Used for change detection, where a version stamp alone is not a change.
pub fn strip_version_metadata(schema: &Value) -> Value {
    let mut out = schema.clone();
    if let Some(root) = out.as_object_mut() {
        let now_empty = match root.get_mut(METADATA_KEY).and_then(Value::as_object_mut) {
            Some(block) => {
                block.remove(SLUG_KEY);
                block.remove(SCHEMA_VERSION_KEY);
                block.is_empty()
            }
            None => false,
        };
        if now_empty {
            root.remove(METADATA_KEY);
        }
    }
    out
}

fn overlay_ref(entry: &Value) -> Option<String> {
    let raw = match entry {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj
            .get("ref")
            .and_then(Value::as_str)
            .or_else(|| obj.get("path").and_then(Value::as_str)),
        _ => None,
    }?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

fn strings_to_value(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

fn push_tokens<I>(target: &mut Vec<String>, tokens: I)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for token in tokens {
        let token = normalize_token(token.as_ref());
        if !token.is_empty() && !target.contains(&token) {
            target.push(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_missing_metadata() {
        assert!(Metadata::extract(&json!({ "type": "object" })).is_empty());
        assert!(Metadata::extract(&json!({ "metadata": "nope" })).is_empty());
    }

    #[test]
    fn test_extract_full_block() {
        let schema = json!({
            "metadata": {
                "slug": "article",
                "schema_version": "article@v1.2.0",
                "ui_overlays": ["overlays/base.json", { "ref": "overlays/seo.json" }, { "path": "overlays/x.json" }, { "id": 3 }, "  "],
                "block_availability": { "allowed": ["Hero ", "text"], "deny": ["EMBED"] }
            }
        });
        let meta = Metadata::extract(&schema);
        assert_eq!(meta.slug, "article");
        assert_eq!(meta.schema_version, "article@v1.2.0");
        assert_eq!(meta.ui_overlays, vec!["overlays/base.json", "overlays/seo.json", "overlays/x.json"]);
        assert_eq!(meta.block_availability.allow, vec!["hero", "text"]);
        assert_eq!(meta.block_availability.deny, vec!["embed"]);
    }

    #[test]
    fn test_block_availability_list_form_is_allow_list() {
        let schema = json!({ "metadata": { "block_availability": ["hero", "gallery"] } });
        let rules = Metadata::extract(&schema).block_availability;
        assert!(rules.allows("Gallery"));
        assert!(!rules.allows("embed"));
    }

    #[test]
    fn test_block_availability_rules() {
        let open = BlockAvailability::default();
        assert!(open.allows("anything"));

        let deny_only = BlockAvailability::new(Vec::<String>::new(), ["embed"]);
        assert!(deny_only.allows("hero"));
        assert!(!deny_only.allows(" Embed "));

        let both = BlockAvailability::new(["hero", "embed"], ["embed"]);
        assert!(both.allows("hero"));
        assert!(!both.allows("embed"));
        assert!(!both.allows("text"));
    }

    #[test]
    fn test_apply_merges_without_deleting() {
        let schema = json!({
            "type": "object",
            "metadata": { "slug": "article", "ui_overlays": ["a.json"], "owner": "content-team" }
        });
        let updated = Metadata {
            schema_version: "article@v2.0.0".to_string(),
            ..Default::default()
        }
        .apply(&schema)
        .unwrap();

        assert_eq!(updated["metadata"]["schema_version"], json!("article@v2.0.0"));
        assert_eq!(updated["metadata"]["slug"], json!("article"));
        assert_eq!(updated["metadata"]["ui_overlays"], json!(["a.json"]));
        assert_eq!(updated["metadata"]["owner"], json!("content-team"));
        assert!(schema["metadata"].get("schema_version").is_none());
    }

    #[test]
    fn test_apply_rejects_non_object() {
        assert!(Metadata::default().apply(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_ensure_schema_version_stamps_initial() {
        let schema = ensure_schema_version(&json!({}), "article").unwrap();
        assert_eq!(schema["metadata"]["schema_version"], json!("article@v1.0.0"));
        assert_eq!(schema["metadata"]["slug"], json!("article"));
    }

    #[test]
    fn test_ensure_schema_version_keeps_existing() {
        let schema = json!({ "metadata": { "schema_version": "article@v3.1.0" } });
        let ensured = ensure_schema_version(&schema, "article").unwrap();
        assert_eq!(ensured["metadata"]["schema_version"], json!("article@v3.1.0"));
        assert_eq!(ensured["metadata"]["slug"], json!("article"));
    }

    #[test]
    fn test_ensure_schema_version_mismatches() {
        let wrong_slug = json!({ "metadata": { "slug": "page" } });
        assert!(matches!(
            ensure_schema_version(&wrong_slug, "article"),
            Err(SchemaError::SlugMismatch { .. })
        ));

        let wrong_version = json!({ "metadata": { "schema_version": "page@v1.0.0" } });
        assert!(ensure_schema_version(&wrong_version, "article").unwrap_err().is_invalid_version());

        let garbage = json!({ "metadata": { "schema_version": "v1" } });
        assert!(ensure_schema_version(&garbage, "article").unwrap_err().is_invalid_version());

        assert!(ensure_schema_version(&json!({}), "  ").is_err());
    }

    #[test]
    fn test_strip_version_metadata() {
        let schema = json!({ "type": "object", "metadata": { "slug": "a", "schema_version": "a@v1.0.0" } });
        assert_eq!(strip_version_metadata(&schema), json!({ "type": "object" }));

        let with_overlays = json!({ "metadata": { "slug": "a", "ui_overlays": ["x"] } });
        assert_eq!(
            strip_version_metadata(&with_overlays),
            json!({ "metadata": { "ui_overlays": ["x"] } })
        );
    }
}
