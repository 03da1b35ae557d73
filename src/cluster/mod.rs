//! Cluster-facing collaborators consumed by the mutators.
//!
//! The mutation engine never talks to a cluster directly. It asks four small
//! collaborators instead:
//!
//! - [`TypeResolver`]: maps a group/kind (and optional version) to its scope
//!   and plural resource name
//! - [`ResourceReader`]: fetches the live document of an object, if any
//! - [`ResourceCache`]: optional shared store of previously fetched documents
//!   together with their reconciliation status
//! - [`StatusEvaluator`]: classifies a fetched document so cache entries can be
//!   judged fresh or stale
//!
//! In-process implementations are provided for offline use:
//! [`StaticTypeResolver`], [`BatchReader`], [`MemoryResourceCache`] and
//! [`PresenceStatusEvaluator`]. A real deployment swaps in discovery- and
//! API-backed versions behind the same traits.

mod cache;
mod reader;
mod resolver;
mod status;

pub use cache::MemoryResourceCache;
pub use reader::BatchReader;
pub use resolver::StaticTypeResolver;
pub use status::PresenceStatusEvaluator;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::{Document, GroupKind, ObjectId};

/// Whether objects of a type live inside a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Objects live inside a namespace
    Namespaced,
    /// Objects are cluster-wide
    Cluster,
}

/// Result of resolving a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Scope of the type
    pub scope: Scope,
    /// Plural resource name, e.g. `deployments`
    pub resource: String,
}

impl TypeMapping {
    /// Create a new mapping.
    pub fn new(scope: Scope, resource: impl Into<String>) -> Self {
        Self {
            scope,
            resource: resource.into(),
        }
    }

    /// Whether the type is namespaced.
    pub fn is_namespaced(&self) -> bool {
        self.scope == Scope::Namespaced
    }
}

/// Errors from a [`TypeResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No type with this group/kind is known
    #[error("no matches for type \"{group_kind}\"{}", format_version(.version))]
    NoMatch {
        /// Requested type
        group_kind: GroupKind,
        /// Requested version, if pinned
        version: Option<String>,
    },
}

fn format_version(version: &Option<String>) -> String {
    version.as_ref().map(|v| format!(" and version \"{v}\"")).unwrap_or_default()
}

/// Maps resource types to their scope.
pub trait TypeResolver: Send + Sync {
    /// Resolve `group_kind`, optionally pinned to `version`.
    fn resolve(&self, group_kind: &GroupKind, version: Option<&str>) -> Result<TypeMapping, ResolveError>;
}

/// Reads live object documents.
pub trait ResourceReader: Send + Sync {
    /// Fetch the current document of `id`; `Ok(None)` when it doesn't exist.
    fn get<'a>(&'a self, id: &'a ObjectId) -> BoxFuture<'a, anyhow::Result<Option<Document>>>;
}

/// Reconciliation status of a live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconcileStatus {
    /// Live state matches desired state
    Current,
    /// Still converging
    InProgress,
    /// Converging failed
    Failed,
    /// Being deleted
    Terminating,
    /// Does not exist
    NotFound,
    /// Could not be classified
    Unknown,
}

impl fmt::Display for ReconcileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Current => "Current",
            Self::InProgress => "InProgress",
            Self::Failed => "Failed",
            Self::Terminating => "Terminating",
            Self::NotFound => "NotFound",
            Self::Unknown => "Unknown",
        };
        f.write_str(text)
    }
}

/// Status classification of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    /// Status
    pub status: ReconcileStatus,
    /// Human-readable detail
    pub message: String,
}

/// Classifies live documents.
pub trait StatusEvaluator: Send + Sync {
    /// Compute the status of `document`.
    fn compute(&self, document: &Document) -> anyhow::Result<StatusResult>;
}

/// One cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResource {
    /// Last fetched document, `None` when the object was absent
    pub resource: Option<Document>,
    /// Status computed when the entry was stored
    pub status: ReconcileStatus,
    /// Status detail
    pub message: String,
}

impl CachedResource {
    /// Whether the entry may be used instead of a live read.
    pub fn is_current(&self) -> bool {
        self.status == ReconcileStatus::Current && self.resource.is_some()
    }
}

/// Shared store of fetched documents.
///
/// Entries are written after each live read and never invalidated here.
pub trait ResourceCache: Send + Sync {
    /// Look up an entry.
    fn get(&self, id: &ObjectId) -> Option<CachedResource>;

    /// Insert or replace an entry.
    fn put(&self, id: ObjectId, entry: CachedResource);
}
