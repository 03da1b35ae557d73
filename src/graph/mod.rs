//! Dependency graph and wave sorting for resource batches.
//!
//! Given every document submitted together, this module works out which
//! objects must exist before which others and groups the batch into waves:
//! every object in a wave depends only on objects in earlier waves, so a wave
//! can be applied as a unit once its predecessors are done.
//!
//! # Edge Sources
//!
//! Edges are collected from five places, always in this order so that
//! diagnostics come out in a stable order:
//!
//! 1. Source references of the apply-time mutation annotation
//! 2. Entries of the `depends-on` annotation
//! 3. Namespaced object → its `Namespace`, when the namespace is in the batch
//! 4. Custom resource → its `CustomResourceDefinition`, when in the batch
//! 5. Gatekeeper constraint → its `ConstraintTemplate`, when in the batch
//!
//! The first two are explicit: a target missing from the batch is an
//! [`GraphError::ExternalDependency`]. The implicit edges are skipped when
//! their target is missing since it may already live in the cluster.
//!
//! # Errors
//!
//! Validation is aggregated rather than short-circuited. Several problems on
//! one object nest inside [`GraphError::Object`], and several failing objects
//! (plus a cycle, if any) are returned together as
//! [`GraphError::Validation`]. A single problem is returned as-is.
//!
//! # Examples
//!
//! ```rust
//! use kwave_cli::core::load_documents;
//! use kwave_cli::graph::sort_objs;
//!
//! let batch = load_documents(r#"
//! apiVersion: v1
//! kind: ConfigMap
//! metadata:
//!   name: settings
//!   namespace: web
//! ---
//! apiVersion: v1
//! kind: Namespace
//! metadata:
//!   name: web
//! "#).unwrap();
//!
//! let waves = sort_objs(batch).unwrap();
//! assert_eq!(waves.len(), 2);
//! assert_eq!(waves[0][0].kind(), "Namespace");
//! assert_eq!(waves[1][0].kind(), "ConfigMap");
//! ```

mod builder;
mod dependency_graph;


pub use builder::{build_graph, reverse_sort_objs, sort_objs};
pub use dependency_graph::{DependencyGraph, Edge};

use thiserror::Error;

use crate::annotations::AnnotationError;
use crate::core::ObjectId;

/// Errors produced while building or sorting the dependency graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An explicit dependency points outside the batch
    #[error("external dependency: {from} -> {to}: dependency not found in the apply set")]
    ExternalDependency {
        /// Object declaring the dependency
        from: ObjectId,
        /// Missing prerequisite
        to: ObjectId,
    },

    /// The same dependency is listed twice on one object
    #[error("duplicate dependency: {from} -> {to}")]
    DuplicateDependency {
        /// Object declaring the dependency
        from: ObjectId,
        /// Repeated prerequisite
        to: ObjectId,
    },

    /// A directive annotation on the object could not be decoded
    #[error("{id}: {source}")]
    Annotation {
        /// Object carrying the annotation
        id: ObjectId,
        /// Decoder failure
        #[source]
        source: AnnotationError,
    },

    /// The remaining graph has no object without prerequisites
    #[error("cyclic dependency:\n{}", format_list(.edges))]
    CyclicDependency {
        /// Every edge left when sorting stalled
        edges: Vec<Edge>,
    },

    /// Several problems found on one object
    #[error("invalid object {id}:\n{}", format_list(.errors))]
    Object {
        /// Offending object
        id: ObjectId,
        /// Problems, in detection order
        errors: Vec<GraphError>,
    },

    /// Several problems found across the batch
    #[error("{} validation errors:\n{}", .errors.len(), format_list(.errors))]
    Validation {
        /// Problems, in batch order
        errors: Vec<GraphError>,
    },
}

impl GraphError {
    /// Fold a list of errors into one: `None` when empty, the error itself
    /// when alone, otherwise [`GraphError::Validation`].
    pub fn aggregate(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Validation {
                errors,
            }),
        }
    }

    /// Every non-aggregate error contained in this one, depth first.
    pub fn leaves(&self) -> Vec<&Self> {
        match self {
            Self::Object {
                errors,
                ..
            }
            | Self::Validation {
                errors,
            } => errors.iter().flat_map(Self::leaves).collect(),
            other => vec![other],
        }
    }

    /// Whether this is, or contains, a cycle.
    pub fn has_cycle(&self) -> bool {
        self.leaves().iter().any(|e| matches!(e, Self::CyclicDependency { .. }))
    }
}

fn format_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| {
            let text = item.to_string();
            format!("  - {}", text.replace('\n', "\n    "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
