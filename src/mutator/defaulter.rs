//! Namespace defaulting for apply-time mutation sources.

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

use super::{MutationContext, MutationError, MutationOutcome, Mutator};
use crate::annotations::{read_substitutions, write_substitutions};
use crate::cluster::TypeResolver;
use crate::constants::NAMESPACE_DEFAULT_REASON;
use crate::core::Document;

/// Fills in namespaces omitted from namespaced source references.
///
/// A source reference without a namespace whose type is namespaced gets the
/// target document's namespace. Types the resolver doesn't know yet (a CRD
/// created in the same batch, say) are left untouched. The annotation is only
/// rewritten when some entry changed, so running twice changes nothing.
pub struct NamespaceDefaulter {
    resolver: Arc<dyn TypeResolver>,
}

impl NamespaceDefaulter {
    /// Create a defaulter using `resolver` to look up scopes.
    pub fn new(resolver: Arc<dyn TypeResolver>) -> Self {
        Self {
            resolver,
        }
    }

    fn default_namespaces(&self, document: &mut Document) -> Result<MutationOutcome, MutationError> {
        let id = document.id();
        let annotation_error = |source| MutationError::Annotation {
            id: id.clone(),
            source,
        };

        let Some(mut substitutions) = read_substitutions(document).map_err(annotation_error)? else {
            return Ok(MutationOutcome::unchanged());
        };

        let mut changed = false;
        for substitution in &mut substitutions {
            let source_ref = &mut substitution.source_ref;
            if !source_ref.namespace.is_empty() {
                continue;
            }

            match self.resolver.resolve(&source_ref.group_kind(), source_ref.version()) {
                Ok(mapping) if mapping.is_namespaced() => {
                    if id.namespace.is_empty() {
                        return Err(MutationError::NamespaceRequired {
                            id: id.clone(),
                            source_ref: source_ref.to_object_id(),
                        });
                    }
                    source_ref.namespace = id.namespace.clone();
                    changed = true;
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(target: "mutator", "leaving source {} of {} as written: {}", source_ref, id, err);
                }
            }
        }

        if !changed {
            return Ok(MutationOutcome::unchanged());
        }
        write_substitutions(document, &substitutions).map_err(annotation_error)?;
        Ok(MutationOutcome::changed(NAMESPACE_DEFAULT_REASON))
    }
}

impl Mutator for NamespaceDefaulter {
    fn name(&self) -> &str {
        "namespace-defaulter"
    }

    fn mutate<'a>(
        &'a self,
        _ctx: &'a MutationContext,
        document: &'a mut Document,
    ) -> BoxFuture<'a, Result<MutationOutcome, MutationError>> {
        Box::pin(async move { self.default_namespaces(document) })
    }
}
