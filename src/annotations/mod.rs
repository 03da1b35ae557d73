//! Directive annotations carried on resource documents.
//!
//! Two string-valued annotations drive ordering and apply-time mutation:
//!
//! - [`DEPENDS_ON_ANNOTATION`](crate::constants::DEPENDS_ON_ANNOTATION): a
//!   comma-separated list of object references. Each reference becomes an
//!   explicit dependency edge in the graph.
//! - [`APPLY_TIME_MUTATION_ANNOTATION`](crate::constants::APPLY_TIME_MUTATION_ANNOTATION):
//!   a YAML or JSON list of [`FieldSubstitution`] records. Each source
//!   reference is also a dependency edge, and the records are executed by the
//!   apply-time mutator right before the object is applied.
//!
//! # Dependency Annotation
//!
//! ```yaml
//! metadata:
//!   annotations:
//!     config.kubernetes.io/depends-on: /namespaces/web/Secret/db,apps/namespaces/web/Deployment/cache
//! ```
//!
//! # Mutation Annotation
//!
//! ```yaml
//! metadata:
//!   annotations:
//!     config.kubernetes.io/apply-time-mutation: |
//!       - sourceRef:
//!           group: networking.k8s.io
//!           kind: Ingress
//!           name: web
//!           namespace: web
//!         sourcePath: $.spec.rules[0].http.paths[0].backend.service.port.number
//!         targetPath: $.spec.containers[?(@.name == "app")].env[?(@.name == "PORT")].value
//!         token: ${service-port}
//! ```
//!
//! Both codecs round-trip: writing what was parsed reproduces the annotation
//! modulo whitespace.

mod depends_on;
mod mutation;

pub use depends_on::{format_dependencies, parse_dependencies, read_dependencies, write_dependencies};
pub use mutation::{
    FieldSubstitution, ResourceReference, format_substitutions, has_substitutions,
    parse_substitutions, read_substitutions, write_substitutions,
};

use thiserror::Error;

use crate::core::InvalidObjectReference;

/// Errors raised while decoding or encoding a directive annotation.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// A dependency entry is not a valid object reference
    #[error("invalid {annotation} annotation: {source}")]
    InvalidReference {
        /// Annotation key
        annotation: String,
        /// Parse failure for the entry
        #[source]
        source: InvalidObjectReference,
    },

    /// The mutation annotation is not a valid YAML/JSON list of substitutions
    #[error("invalid {annotation} annotation: {source}")]
    Malformed {
        /// Annotation key
        annotation: String,
        /// Decoder failure
        #[source]
        source: serde_yaml::Error,
    },

    /// A substitution record decoded but is missing required content
    #[error("invalid {annotation} annotation: substitution {index}: {reason}")]
    InvalidSubstitution {
        /// Annotation key
        annotation: String,
        /// Zero-based position of the record in the list
        index: usize,
        /// What is missing
        reason: String,
    },

    /// Substitutions could not be encoded back into the annotation
    #[error("failed to encode {annotation} annotation: {source}")]
    Encode {
        /// Annotation key
        annotation: String,
        /// Encoder failure
        #[source]
        source: serde_yaml::Error,
    },
}
