//! Schema update gate
//!
//! Content-type and block services accept a new schema revision through
//! [`SchemaEvolver::evolve`]:
//!
//! 1. normalize the candidate (legacy field lists become schema trees),
//! 2. check it against the supported subset,
//! 3. make sure it carries a version for its slug,
//! 4. compare it with the stored revision, rejecting breaking changes unless
//!    overridden,
//! 5. stamp the bumped version into `metadata.schema_version`.
//!
//! The caller persists [`Evolution::schema`]; nothing is stored here.

use serde::Serialize;
use serde_json::Value;

use crate::compatibility::{CompatibilityChecker, CompatibilityResult};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::metadata::{ensure_schema_version, schema_version, Metadata};
use crate::normalize::normalize;
use crate::subset::SubsetValidator;
use crate::version::{ChangeLevel, SchemaVersion};

/// An accepted schema revision
#[derive(Debug, Clone, Serialize)]
pub struct Evolution {
    /// Normalized schema with its new version stamped in
    pub schema: Value,
    /// Version to persist alongside the schema
    pub version: SchemaVersion,
    /// Version of the revision this one replaces
    pub previous_version: Option<SchemaVersion>,
    /// Outcome of the comparison with the previous revision
    pub result: CompatibilityResult,
}

/// Gate for schema updates
#[derive(Debug, Clone)]
pub struct SchemaEvolver {
    checker: CompatibilityChecker,
    validator: Option<SubsetValidator>,
    allow_breaking_changes: bool,
}

impl Default for SchemaEvolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaEvolver {
    /// Validate candidates and reject breaking changes by default
    pub fn new() -> Self {
        Self {
            checker: CompatibilityChecker::new(),
            validator: Some(SubsetValidator::new()),
            allow_breaking_changes: false,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            checker: CompatibilityChecker::new(),
            validator: config.validation.validate_on_accept.then(SubsetValidator::new),
            allow_breaking_changes: config.compatibility.allow_breaking_changes,
        }
    }

    /// Skip subset validation of candidates
    pub fn without_validation(mut self) -> Self {
        self.validator = None;
        self
    }

    /// Accept a candidate revision of `slug`'s schema.
    ///
    /// `allow_breaking` overrides the breaking-change check for this call.
    pub fn evolve(
        &self,
        previous: Option<&Value>,
        candidate: &Value,
        slug: &str,
        allow_breaking: bool,
    ) -> Result<Evolution> {
        let normalized = normalize(candidate);
        if let Some(validator) = &self.validator {
            validator.validate(&normalized)?;
        }
        let stamped = ensure_schema_version(&normalized, slug)?;

        let Some(previous) = previous else {
            let version = schema_version(&stamped)?.unwrap_or_else(|| SchemaVersion::initial(slug));
            tracing::debug!(slug, %version, "accepted initial schema revision");
            return Ok(Evolution {
                schema: stamped,
                version,
                previous_version: None,
                result: CompatibilityResult {
                    compatible: true,
                    change_level: ChangeLevel::None,
                    breaking_changes: Vec::new(),
                    warnings: Vec::new(),
                },
            });
        };

        let previous = ensure_schema_version(&normalize(previous), slug)?;
        let previous_version = schema_version(&previous)?.unwrap_or_else(|| SchemaVersion::initial(slug));

        let result = self.checker.check(&previous, &stamped);
        result.ensure_accepted(slug, allow_breaking || self.allow_breaking_changes)?;

        let version = result.next_version(&previous_version)?;
        let schema = Metadata {
            schema_version: version.to_string(),
            ..Default::default()
        }
        .apply(&stamped)?;

        tracing::debug!(
            slug,
            from = %previous_version,
            to = %version,
            level = %result.change_level,
            "accepted schema revision"
        );

        Ok(Evolution {
            schema,
            version,
            previous_version: Some(previous_version),
            result,
        })
    }
}
