//! Schema subset enforcement
//!
//! Content schemas are rendered by several consumers (editors, API docs,
//! front-end renderers), so only a small JSON Schema vocabulary is accepted:
//!
//! `$schema $id $ref $defs $anchor metadata ui type properties required items
//! oneOf allOf const enum default title description format additionalProperties`
//!
//! plus any `x-` extension key, which is never inspected. `allOf` is limited
//! to a bag of extra object constraints: its branches may only carry
//! `properties`, `required`, `additionalProperties`, `title`, `description`
//! and `type: "object"`.

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::schema::{is_extension, json_kind, Keyword};

const ROOT_PATH: &str = "<root>";

const NOT_A_SCHEMA: &str = "not-a-schema";

/// Result of linting a schema
#[derive(Debug, Default)]
pub struct LintResult {
    pub schema_id: String,
    pub errors: Vec<LintError>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintError {
    pub code: &'static str,
    /// Offending keyword. For a value that is not a schema object, the
    /// keyword holding it (empty at the root)
    pub keyword: String,
    /// Field path of the offending node, in the same form as the
    /// compatibility analyzer's paths (`blocks[].oneOf/1.src`)
    pub path: String,
    pub message: String,
}

impl From<LintError> for SchemaError {
    fn from(err: LintError) -> Self {
        if err.code == NOT_A_SCHEMA {
            return SchemaError::InvalidFormat(format!("{} at {}", err.message, err.path));
        }
        SchemaError::UnsupportedKeyword {
            keyword: err.keyword,
            path: err.path,
        }
    }
}

/// Validator for the supported schema subset
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsetValidator;

impl SubsetValidator {
    pub fn new() -> Self {
        Self
    }

    /// Fail on the first keyword outside the subset
    pub fn validate(&self, schema: &Value) -> Result<()> {
        let mut walk = Walk::new(true);
        walk.node(schema, ROOT_PATH, "");
        match walk.errors.into_iter().next() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Collect every violation in the schema
    pub fn lint(&self, schema_id: &str, schema: &Value) -> LintResult {
        let mut walk = Walk::new(false);
        walk.node(schema, ROOT_PATH, "");
        LintResult {
            schema_id: schema_id.to_string(),
            errors: walk.errors,
        }
    }
}

/// Fail on the first keyword outside the subset
pub fn validate_subset(schema: &Value) -> Result<()> {
    SubsetValidator::new().validate(schema)
}

struct Walk {
    fail_fast: bool,
    errors: Vec<LintError>,
}

impl Walk {
    fn new(fail_fast: bool) -> Self {
        Self {
            fail_fast,
            errors: Vec::new(),
        }
    }

    fn done(&self) -> bool {
        self.fail_fast && !self.errors.is_empty()
    }

    fn report(&mut self, code: &'static str, keyword: &str, path: &str, message: String) {
        if !self.done() {
            self.errors.push(LintError {
                code,
                keyword: keyword.to_string(),
                path: path.to_string(),
                message,
            });
        }
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str, parent: &str) -> Option<&'v Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.report(
                NOT_A_SCHEMA,
                parent,
                path,
                format!("expected a schema object, found {}", json_kind(value)),
            );
        }
        obj
    }

    fn node(&mut self, value: &Value, path: &str, parent: &str) {
        let Some(obj) = self.object(value, path, parent) else {
            return;
        };

        for (key, child) in obj {
            if self.done() {
                return;
            }
            if is_extension(key) {
                continue;
            }
            let Some(keyword) = Keyword::parse(key) else {
                self.report("unsupported-keyword", key, path, format!("'{}' is not a supported keyword", key));
                continue;
            };

            match keyword {
                Keyword::Properties => self.properties(child, path),
                Keyword::Defs => self.named_schemas(child, path, key, |name| format!("$defs/{}", name)),
                Keyword::Items => match child {
                    Value::Object(_) => self.node(child, &items_path(path), key),
                    _ => self.report(
                        "invalid-items",
                        key,
                        path,
                        "'items' must be a single schema object".to_string(),
                    ),
                },
                Keyword::OneOf => match child.as_array() {
                    Some(branches) => {
                        for (i, branch) in branches.iter().enumerate() {
                            self.node(branch, &join(path, &format!("oneOf/{}", i)), key);
                        }
                    }
                    None => self.report("invalid-composition", key, path, "'oneOf' must be an array".to_string()),
                },
                Keyword::AllOf => match child.as_array() {
                    Some(branches) => {
                        for (i, branch) in branches.iter().enumerate() {
                            self.all_of_branch(branch, &join(path, &format!("allOf/{}", i)));
                        }
                    }
                    None => self.report("invalid-composition", key, path, "'allOf' must be an array".to_string()),
                },
                Keyword::AdditionalProperties if child.is_object() => {
                    self.node(child, &join(path, key), key)
                }
                // metadata and ui blocks are opaque to the schema vocabulary
                _ => {}
            }
        }
    }

    fn properties(&mut self, value: &Value, path: &str) {
        self.named_schemas(value, path, "properties", |name| name.to_string())
    }

    fn named_schemas(&mut self, value: &Value, path: &str, keyword: &str, segment: impl Fn(&str) -> String) {
        match value.as_object() {
            Some(entries) => {
                for (name, schema) in entries {
                    self.node(schema, &join(path, &segment(name.as_str())), keyword);
                }
            }
            None => self.report(
                "invalid-composition",
                keyword,
                path,
                format!("'{}' must be an object of schemas", keyword),
            ),
        }
    }

    fn all_of_branch(&mut self, value: &Value, path: &str) {
        let Some(obj) = self.object(value, path, "allOf") else {
            return;
        };

        for (key, child) in obj {
            if self.done() {
                return;
            }
            if is_extension(key) {
                continue;
            }
            match Keyword::parse(key) {
                Some(Keyword::Type) => {
                    if child.as_str() != Some("object") {
                        self.report(
                            "invalid-composition",
                            key,
                            path,
                            "an allOf branch may only declare type \"object\"".to_string(),
                        );
                    }
                }
                Some(Keyword::Properties) => self.properties(child, path),
                Some(Keyword::AdditionalProperties) if child.is_object() => {
                    self.node(child, &join(path, key), key)
                }
                Some(keyword) if keyword.allowed_in_all_of() => {}
                _ => self.report(
                    "unsupported-keyword",
                    key,
                    path,
                    format!("'{}' is not allowed inside allOf", key),
                ),
            }
        }
    }
}

fn join(path: &str, segment: &str) -> String {
    if path == ROOT_PATH {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

fn items_path(path: &str) -> String {
    if path == ROOT_PATH {
        "[]".to_string()
    } else {
        format!("{}[]", path)
    }
}
