//! Core types and functionality for kwave
//!
//! This module holds the value types every other module builds on, plus the
//! crate-level error handling.
//!
//! # Modules
//!
//! ## `identity` - Object Identity
//!
//! - [`ObjectId`] - `(group, kind, namespace, name)` key of one document,
//!   parsed from and formatted as `group/kind/name` or
//!   `group/namespaces/namespace/kind/name`
//! - [`GroupKind`] - type of a document without version
//! - [`split_api_version`] - split `apps/v1` into group and version
//!
//! ## `document` - Resource Documents
//!
//! - [`Document`] - a `serde_json::Value` tree with derived identity and
//!   annotation accessors
//! - [`load_documents`] / [`to_yaml_stream`] - multi-document YAML in and out
//!
//! ## `error` - Error Handling
//!
//! - [`KwaveError`] - crate-level error wrapping the subsystem errors
//! - [`ErrorContext`] - error plus details and a suggestion for the terminal
//! - [`user_friendly_error`] - build an [`ErrorContext`] from any error
//!
//! # Examples
//!
//! ```rust
//! use kwave_cli::core::{Document, ObjectId, load_documents};
//!
//! let docs = load_documents("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: api\n  namespace: web\n").unwrap();
//! assert_eq!(docs[0].id(), ObjectId::new("apps", "Deployment", "web", "api"));
//! ```

pub mod document;
pub mod error;
mod error_formatting;
pub mod identity;

pub use document::{Document, load_documents, to_yaml_stream};
pub use error::{ErrorContext, KwaveError};
pub use error_formatting::user_friendly_error;
pub use identity::{GroupKind, InvalidObjectReference, ObjectId, split_api_version};
