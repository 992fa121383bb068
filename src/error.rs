//! Error types for the schema compatibility engine

use thiserror::Error;

use crate::compatibility::BreakingChange;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema engine errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema version: {0}")]
    InvalidSchemaVersion(String),

    #[error("Invalid schema version: schema slug '{found}' does not match '{expected}'")]
    SlugMismatch { expected: String, found: String },

    #[error("Unsupported schema keyword '{keyword}' at {path}")]
    UnsupportedKeyword { keyword: String, path: String },

    #[error("No migration step registered for '{slug}' from version {from}")]
    MigrationStepMissing { slug: String, from: String },

    #[error("Migration cycle detected for '{slug}' at version {version}")]
    MigrationCycle { slug: String, version: String },

    #[error("Breaking schema change for '{slug}': {}", render_changes(.changes))]
    SchemaCompatibilityBreaking {
        slug: String,
        changes: Vec<BreakingChange>,
    },

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

impl SchemaError {
    /// Whether this error belongs to the invalid-version family
    /// (malformed identifiers, slug disagreement, unparsable semver).
    pub fn is_invalid_version(&self) -> bool {
        matches!(
            self,
            SchemaError::InvalidSchemaVersion(_)
                | SchemaError::SlugMismatch { .. }
                | SchemaError::Semver(_)
        )
    }
}

fn render_changes(changes: &[BreakingChange]) -> String {
    changes
        .iter()
        .map(|c| format!("{} ({})", c.description, c.field))
        .collect::<Vec<_>>()
        .join("; ")
}
