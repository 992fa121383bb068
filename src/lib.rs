//! Familiar Schema Compatibility Engine
//!
//! Versioning, compatibility analysis and payload migration for the content
//! schemas (content types, blocks) of the Familiar platform.
//!
//! ## Features
//!
//! - **Semantic Versioning**: schema versions are `slug@vMAJOR.MINOR.PATCH` and
//!   travel inside the schema's own `metadata` block
//! - **Compatibility Checking**: structural diff of two revisions, classified as
//!   none / patch / minor / major with every breaking change listed
//! - **Dialect Normalization**: legacy field lists compare like native schema trees
//! - **Subset Enforcement**: a restricted keyword vocabulary keeps schemas
//!   portable across renderers
//! - **Payload Migration**: ordered, per-slug migration chains with cycle detection
//!
//! ## Architecture
//!
//! ```text
//! candidate ──normalize──▶ subset check ──▶ ensure version ──▶ compare(previous) ──▶ bump
//!                                                                     │
//! stored payload @ old version ───────────── Migrator::migrate ◀──────┘ current version
//! ```
//!
//! The engine does no I/O and keeps no state besides the [`Migrator`] step table.

pub mod checksum;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod evolution;
pub mod metadata;
pub mod migration;
pub mod normalize;
pub mod schema;
pub mod subset;
pub mod version;

pub use checksum::{fingerprint, Checksum};
pub use compatibility::{
    compare, BreakingChange, BreakingChangeKind, CompatibilityChecker, CompatibilityResult, FieldDescriptor,
    TypeDescriptor, TypeKind,
};
pub use config::EngineConfig;
pub use error::{Result, SchemaError};
pub use evolution::{Evolution, SchemaEvolver};
pub use metadata::{ensure_schema_version, BlockAvailability, Metadata};
pub use migration::{MigrationStep, Migrator};
pub use normalize::normalize;
pub use schema::{Keyword, SchemaNode};
pub use subset::{validate_subset, LintResult, SubsetValidator};
pub use version::{bump_version, ChangeLevel, SchemaVersion};
