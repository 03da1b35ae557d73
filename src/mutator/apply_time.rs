//! Execution of apply-time field substitutions.

use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

use super::{MutationContext, MutationError, MutationOutcome, Mutator};
use crate::annotations::{FieldSubstitution, read_substitutions};
use crate::cluster::{
    CachedResource, ReconcileStatus, ResourceCache, ResourceReader, StatusEvaluator, TypeResolver,
};
use crate::constants::APPLY_TIME_MUTATION_REASON;
use crate::core::{Document, ObjectId};
use crate::jsonpath::JsonPath;

/// Copies values from source objects into the document being applied.
///
/// For each substitution of the `apply-time-mutation` annotation, in order:
/// resolve the source type and default its namespace, fetch the source (from
/// the cache when the cached copy is current, else live), read exactly one
/// value at `sourcePath`, and write it to exactly one field at `targetPath`.
/// With a `token`, the target must be a string and only occurrences of the
/// token in it are replaced by the stringified source value.
pub struct ApplyTimeMutator {
    resolver: Arc<dyn TypeResolver>,
    reader: Arc<dyn ResourceReader>,
    status: Arc<dyn StatusEvaluator>,
    cache: Option<Arc<dyn ResourceCache>>,
}

impl ApplyTimeMutator {
    /// Create a mutator without a cache.
    pub fn new(
        resolver: Arc<dyn TypeResolver>,
        reader: Arc<dyn ResourceReader>,
        status: Arc<dyn StatusEvaluator>,
    ) -> Self {
        Self {
            resolver,
            reader,
            status,
            cache: None,
        }
    }

    /// Share `cache` for source lookups.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResourceCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn apply(&self, ctx: &MutationContext, document: &mut Document) -> Result<MutationOutcome, MutationError> {
        let id = document.id();
        let substitutions = match read_substitutions(document) {
            Ok(Some(substitutions)) => substitutions,
            Ok(None) => return Ok(MutationOutcome::unchanged()),
            Err(source) => {
                return Err(MutationError::Annotation {
                    id,
                    source,
                });
            }
        };

        // Reject literal self-references before touching the cluster
        if let Some(index) = substitutions.iter().position(|s| s.source_ref.to_object_id() == id) {
            return Err(MutationError::SelfReference {
                id,
                index,
            });
        }

        for (index, substitution) in substitutions.iter().enumerate() {
            self.substitute(ctx, document, &id, index, substitution).await?;
        }

        if substitutions.is_empty() {
            return Ok(MutationOutcome::unchanged());
        }
        Ok(MutationOutcome::changed(APPLY_TIME_MUTATION_REASON))
    }

    async fn substitute(
        &self,
        ctx: &MutationContext,
        document: &mut Document,
        id: &ObjectId,
        index: usize,
        substitution: &FieldSubstitution,
    ) -> Result<(), MutationError> {
        let source_ref = &substitution.source_ref;
        let written_id = source_ref.to_object_id();

        let mapping = self.resolver.resolve(&source_ref.group_kind(), source_ref.version()).map_err(|source| {
            MutationError::TypeResolution {
                source_ref: written_id.clone(),
                source,
            }
        })?;
        let source_id = if mapping.is_namespaced() && written_id.namespace.is_empty() {
            if id.namespace.is_empty() {
                return Err(MutationError::NamespaceRequired {
                    id: id.clone(),
                    source_ref: written_id,
                });
            }
            written_id.with_namespace(&id.namespace)
        } else {
            written_id
        };
        if &source_id == id {
            return Err(MutationError::SelfReference {
                id: id.clone(),
                index,
            });
        }

        let source = self.fetch(ctx, &source_id).await?;

        let source_path = JsonPath::parse(&substitution.source_path)?;
        let mut values = source_path.get(source.value());
        let value = match values.len() {
            1 => values.remove(0),
            0 => {
                return Err(MutationError::SourceFieldMissing {
                    source_ref: source_id,
                    path: substitution.source_path.clone(),
                });
            }
            matches => {
                return Err(MutationError::AmbiguousSource {
                    source_ref: source_id,
                    path: substitution.source_path.clone(),
                    matches,
                });
            }
        };

        let target_path = JsonPath::parse(&substitution.target_path)?;
        let target_error = |matches| MutationError::TargetField {
            id: id.clone(),
            path: substitution.target_path.clone(),
            matches,
        };

        let new_value = if substitution.token.is_empty() {
            value
        } else {
            let current = target_path.get(document.value());
            if current.len() != 1 {
                return Err(target_error(current.len()));
            }
            let Value::String(text) = &current[0] else {
                return Err(MutationError::TargetNotString {
                    id: id.clone(),
                    path: substitution.target_path.clone(),
                });
            };
            Value::String(text.replace(&substitution.token, &stringify(&value)))
        };

        let locations = target_path.locate(document.value());
        if locations.len() != 1 {
            return Err(target_error(locations.len()));
        }
        if !locations[0].write(document.value_mut(), new_value) {
            return Err(target_error(0));
        }

        debug!(
            target: "mutator",
            "{}: wrote {} from {} {}",
            id, substitution.target_path, source_id, substitution.source_path
        );
        Ok(())
    }

    /// Source document from the cache when current, else a live read.
    async fn fetch(&self, ctx: &MutationContext, id: &ObjectId) -> Result<Document, MutationError> {
        if ctx.is_cancelled() {
            return Err(MutationError::Cancelled);
        }

        if let Some(cache) = &self.cache
            && let Some(entry) = cache.get(id)
        {
            if entry.is_current()
                && let Some(document) = entry.resource
            {
                trace!(target: "mutator", "using cached {}", id);
                return Ok(document);
            }
            trace!(target: "mutator", "cached {} is {}, reading live", id, entry.status);
        }

        let result = tokio::select! {
            biased;
            () = ctx.cancelled() => return Err(MutationError::Cancelled),
            result = self.reader.get(id) => result,
        };
        let live = result.map_err(|err| MutationError::Fetch {
            source_ref: id.clone(),
            source: err.into(),
        })?;

        let Some(document) = live else {
            self.remember(id, None, ReconcileStatus::NotFound, "resource not found".to_string());
            return Err(MutationError::SourceNotFound {
                source_ref: id.clone(),
            });
        };

        if self.cache.is_some() {
            let (status, message) = match self.status.compute(&document) {
                Ok(result) => (result.status, result.message),
                Err(err) => (ReconcileStatus::Unknown, err.to_string()),
            };
            self.remember(id, Some(document.clone()), status, message);
        }
        Ok(document)
    }

    fn remember(&self, id: &ObjectId, resource: Option<Document>, status: ReconcileStatus, message: String) {
        if let Some(cache) = &self.cache {
            cache.put(
                id.clone(),
                CachedResource {
                    resource,
                    status,
                    message,
                },
            );
        }
    }
}

impl Mutator for ApplyTimeMutator {
    fn name(&self) -> &str {
        "apply-time-mutator"
    }

    fn mutate<'a>(
        &'a self,
        ctx: &'a MutationContext,
        document: &'a mut Document,
    ) -> BoxFuture<'a, Result<MutationOutcome, MutationError>> {
        Box::pin(self.apply(ctx, document))
    }
}

/// Text form of a source value used for token replacement.
///
/// Strings are used as-is; numbers keep their JSON spelling so `1.0` stays
/// `1.0`; maps and lists become compact JSON.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
