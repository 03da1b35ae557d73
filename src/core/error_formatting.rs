//! Error formatting utilities for kwave
//!
//! Turns arbitrary errors into an [`ErrorContext`] with details and an
//! actionable suggestion, based on the most specific error found in the chain.

use super::error::{ErrorContext, KwaveError};
use crate::constants::{CONFIG_PATH_ENV, DEPENDS_ON_ANNOTATION};
use crate::graph::GraphError;
use crate::mutator::MutationError;

/// Convert any error into a user-friendly format with contextual suggestions.
///
/// The top-level error is kept as the displayed error; the error chain is
/// searched for a [`GraphError`], [`MutationError`], [`KwaveError`] or
/// [`std::io::Error`] to choose details and a suggestion.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let (details, suggestion) = error.chain().find_map(advice).unwrap_or((None, None));

    // Context layers added with anyhow are kept as text
    let error = match error.chain().next() {
        Some(top) if top.is::<KwaveError>() || top.is::<GraphError>() || top.is::<MutationError>() => {
            into_kwave_error(error)
        }
        _ => KwaveError::Other {
            message: format!("{error:#}"),
        },
    };

    let mut context = ErrorContext::new(error);
    if let Some(details) = details {
        context = context.with_details(details);
    }
    if let Some(suggestion) = suggestion {
        context = context.with_suggestion(suggestion);
    }
    context
}

fn into_kwave_error(error: anyhow::Error) -> KwaveError {
    let error = match error.downcast::<KwaveError>() {
        Ok(kwave) => return kwave,
        Err(other) => other,
    };
    let error = match error.downcast::<GraphError>() {
        Ok(graph) => return KwaveError::Graph(graph),
        Err(other) => other,
    };
    match error.downcast::<MutationError>() {
        Ok(mutation) => KwaveError::Mutation(mutation),
        Err(other) => KwaveError::Other {
            message: format!("{other:#}"),
        },
    }
}

type Advice = (Option<String>, Option<String>);

fn advice(error: &(dyn std::error::Error + 'static)) -> Option<Advice> {
    if let Some(graph) = error.downcast_ref::<GraphError>() {
        return Some(graph_advice(graph));
    }
    if let Some(mutation) = error.downcast_ref::<MutationError>() {
        return Some(mutation_advice(mutation));
    }
    if let Some(kwave) = error.downcast_ref::<KwaveError>() {
        return kwave_advice(kwave);
    }
    if let Some(io) = error.downcast_ref::<std::io::Error>() {
        return Some(io_advice(io));
    }
    None
}

fn graph_advice(error: &GraphError) -> Advice {
    let leaves = error.leaves();
    let count = leaves.len();

    if error.has_cycle() {
        return (
            Some(format!("{count} problem(s) found; objects in a cycle can never be applied")),
            Some(
                "Remove one depends-on entry or apply-time-mutation source along each listed cycle"
                    .to_string(),
            ),
        );
    }

    let suggestion = match leaves.first() {
        Some(GraphError::ExternalDependency { .. }) => {
            "Add the missing objects to the inputs, or remove the references if they are not needed"
                .to_string()
        }
        Some(GraphError::DuplicateDependency { .. }) => {
            format!("Remove the repeated entries from the {DEPENDS_ON_ANNOTATION} annotation")
        }
        Some(GraphError::Annotation { .. }) => {
            "Check the annotation syntax: depends-on takes group/kind/name or group/namespaces/ns/kind/name entries"
                .to_string()
        }
        _ => "Fix the listed objects and try again".to_string(),
    };
    (Some(format!("{count} problem(s) found while ordering the inputs")), Some(suggestion))
}

fn mutation_advice(error: &MutationError) -> Advice {
    let (details, suggestion) = match error {
        MutationError::SelfReference { .. } => {
            ("A substitution cannot read from the object it writes to", "Point sourceRef at another object")
        }
        MutationError::TypeResolution { .. } => (
            "The source type is neither built in nor defined by a CustomResourceDefinition in the inputs",
            "Include the CRD in the inputs or declare the type under [[types]] in the config file",
        ),
        MutationError::NamespaceRequired { .. } => (
            "A namespaced source can only be defaulted from a namespaced target",
            "Set sourceRef.namespace explicitly",
        ),
        MutationError::SourceNotFound { .. } => (
            "Sources must be applied in an earlier wave or already exist",
            "Add the source object to the inputs",
        ),
        MutationError::SourceFieldMissing { .. } | MutationError::AmbiguousSource { .. } => (
            "sourcePath must match exactly one value in the source object",
            "Narrow sourcePath with an index or a filter",
        ),
        MutationError::TargetField { .. } | MutationError::TargetNotString { .. } => (
            "targetPath must match exactly one field; with a token that field must be a string",
            "Check targetPath against the target object",
        ),
        MutationError::Path(_) => ("Paths start with '$'", "Check the path syntax"),
        MutationError::Annotation { .. } => (
            "The apply-time-mutation annotation must be a YAML or JSON list of substitutions",
            "Check the annotation syntax",
        ),
        MutationError::Fetch { .. } | MutationError::Cancelled => return (None, None),
    };
    (Some(details.to_string()), Some(suggestion.to_string()))
}

fn kwave_advice(error: &KwaveError) -> Option<Advice> {
    match error {
        KwaveError::Graph(graph) => Some(graph_advice(graph)),
        KwaveError::Mutation(mutation) => Some(mutation_advice(mutation)),
        KwaveError::FileNotFound {
            path,
        } => Some((None, Some(format!("Check that '{path}' exists")))),
        KwaveError::DocumentParse {
            ..
        } => Some((
            Some("Inputs are YAML or JSON, several documents separated by '---'".to_string()),
            Some("Fix the syntax error reported above".to_string()),
        )),
        KwaveError::ConfigParse {
            ..
        } => Some((
            None,
            Some(format!("Fix the config file, or point {CONFIG_PATH_ENV} at another one")),
        )),
        KwaveError::NoDocuments => Some((None, Some("Pass at least one file containing resources".to_string()))),
        _ => None,
    }
}

fn io_advice(error: &std::io::Error) -> Advice {
    let suggestion = match error.kind() {
        std::io::ErrorKind::NotFound => "Check that the path exists",
        std::io::ErrorKind::PermissionDenied => "Check file permissions",
        _ => "Check the file and try again",
    };
    (None, Some(suggestion.to_string()))
}
