//! Pre-apply document mutators.
//!
//! A [`Mutator`] rewrites a document in place right before it is applied.
//! Two are provided and are meant to run in this order:
//!
//! 1. [`NamespaceDefaulter`]: fills the target's namespace into namespaced
//!    source references of the apply-time mutation annotation that omit one.
//!    Works offline and is idempotent.
//! 2. [`ApplyTimeMutator`]: executes the substitutions of the annotation,
//!    reading each source object from the cache or the cluster and writing
//!    into the target's fields.
//!
//! [`mutate_all`] runs a list of mutators over a wave of documents and stops
//! at the first error.
//!
//! # Partial Application
//!
//! Substitutions of one document are applied one after another. When one
//! fails, the earlier ones stay written to the document; nothing is rolled
//! back.
//!
//! # Cancellation
//!
//! Fetching a source document is the only suspension point. It is raced
//! against the [`MutationContext`]; on cancellation the call ends with
//! [`MutationError::Cancelled`].

mod apply_time;
mod context;
mod defaulter;


pub use apply_time::ApplyTimeMutator;
pub use context::{CancelHandle, MutationContext};
pub use defaulter::NamespaceDefaulter;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::annotations::AnnotationError;
use crate::cluster::ResolveError;
use crate::core::{Document, ObjectId};
use crate::jsonpath::PathError;

/// Result of running one mutator on one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationOutcome {
    /// Whether the document was changed
    pub mutated: bool,
    /// Why, when it was
    pub reason: String,
}

impl MutationOutcome {
    /// Nothing was changed.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// The document was changed for `reason`.
    pub fn changed(reason: impl Into<String>) -> Self {
        Self {
            mutated: true,
            reason: reason.into(),
        }
    }
}

/// A named, in-place document rewrite run before apply.
pub trait Mutator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Rewrite `document` in place.
    fn mutate<'a>(
        &'a self,
        ctx: &'a MutationContext,
        document: &'a mut Document,
    ) -> BoxFuture<'a, Result<MutationOutcome, MutationError>>;
}

/// One change made by [`mutate_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMutation {
    /// Mutated document
    pub id: ObjectId,
    /// Mutator that changed it
    pub mutator: String,
    /// Reason it reported
    pub reason: String,
}

/// Run every mutator over every document, in order.
///
/// Stops at the first error; documents already processed keep their changes.
pub async fn mutate_all(
    ctx: &MutationContext,
    documents: &mut [Document],
    mutators: &[Box<dyn Mutator>],
) -> Result<Vec<AppliedMutation>, MutationError> {
    let mut applied = Vec::new();
    for document in documents.iter_mut() {
        for mutator in mutators {
            let outcome = mutator.mutate(ctx, document).await.inspect_err(|err| {
                tracing::warn!(target: "mutator", "{} failed on {}: {}", mutator.name(), document.id(), err);
            })?;
            if outcome.mutated {
                let id = document.id();
                tracing::debug!(target: "mutator", "{} mutated {}: {}", mutator.name(), id, outcome.reason);
                applied.push(AppliedMutation {
                    id,
                    mutator: mutator.name().to_string(),
                    reason: outcome.reason,
                });
            }
        }
    }
    Ok(applied)
}

/// Errors produced by the mutators.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The mutation annotation could not be decoded or re-encoded
    #[error("{id}: {source}")]
    Annotation {
        /// Target object
        id: ObjectId,
        /// Codec failure
        #[source]
        source: AnnotationError,
    },

    /// A substitution reads from the object it writes to
    #[error("invalid apply-time mutation on {id}: substitution {index} references the object itself")]
    SelfReference {
        /// Target object
        id: ObjectId,
        /// Zero-based position of the substitution
        index: usize,
    },

    /// The source type could not be resolved
    #[error("failed to resolve type of source {source_ref}: {source}")]
    TypeResolution {
        /// Source reference as written
        source_ref: ObjectId,
        /// Resolver failure
        #[source]
        source: ResolveError,
    },

    /// A namespaced source has no namespace and none can be inferred
    #[error("source {source_ref} of {id} is namespaced but neither it nor the target has a namespace")]
    NamespaceRequired {
        /// Target object
        id: ObjectId,
        /// Source reference as written
        source_ref: ObjectId,
    },

    /// Reading the source object failed
    #[error("failed to get source {source_ref}: {source}")]
    Fetch {
        /// Source object
        source_ref: ObjectId,
        /// Reader failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The source object does not exist
    #[error("source {source_ref} not found")]
    SourceNotFound {
        /// Source object
        source_ref: ObjectId,
    },

    /// The source path matched nothing
    #[error("source field not present: {path} in {source_ref}")]
    SourceFieldMissing {
        /// Source object
        source_ref: ObjectId,
        /// Source path
        path: String,
    },

    /// The source path matched more than once
    #[error("ambiguous source field: {path} matched {matches} values in {source_ref}")]
    AmbiguousSource {
        /// Source object
        source_ref: ObjectId,
        /// Source path
        path: String,
        /// Number of matches
        matches: usize,
    },

    /// The target path did not match exactly once
    #[error("target field {path} of {id} must match exactly once, matched {matches}")]
    TargetField {
        /// Target object
        id: ObjectId,
        /// Target path
        path: String,
        /// Number of matches
        matches: usize,
    },

    /// Token replacement requires a string target
    #[error("target field {path} of {id} is not a string, cannot replace token")]
    TargetNotString {
        /// Target object
        id: ObjectId,
        /// Target path
        path: String,
    },

    /// A path expression is invalid
    #[error(transparent)]
    Path(#[from] PathError),

    /// The run was cancelled
    #[error("mutation cancelled")]
    Cancelled,
}
