//! Object identity for resources in an apply batch.
//!
//! An [`ObjectId`] is the `(group, kind, namespace, name)` tuple that addresses
//! exactly one document within a batch. It is the vertex type of the dependency
//! graph and the key of the resource cache, so it is value-typed, hashable and
//! cheap to compare.
//!
//! # String Forms
//!
//! Object references use the same textual form as the `depends-on` annotation:
//!
//! ```text
//! group/kind/name                               # cluster-scoped
//! group/namespaces/namespace/kind/name          # namespaced
//! ```
//!
//! The group may be empty for the core API group, so `/Namespace/prod` and
//! `/namespaces/prod/Secret/db` are both valid.
//!
//! # Examples
//!
//! ```rust
//! use kwave_cli::core::ObjectId;
//!
//! let id: ObjectId = "apps/namespaces/web/Deployment/frontend".parse().unwrap();
//! assert_eq!(id.group, "apps");
//! assert_eq!(id.namespace, "web");
//! assert_eq!(id.to_string(), "apps/namespaces/web/Deployment/frontend");
//!
//! let ns = ObjectId::new("", "Namespace", "", "web");
//! assert!(ns.is_cluster_scoped());
//! assert_eq!(ns.to_string(), "/Namespace/web");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::NAMESPACES_SEGMENT;

/// API group and kind of a resource type, without version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKind {
    /// API group, empty for the core group
    pub group: String,
    /// Resource kind, e.g. `Deployment`
    pub kind: String,
}

impl GroupKind {
    /// Create a new group/kind pair.
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// Identity of one resource document.
///
/// Equality and hashing cover all four fields. An empty namespace means the
/// object is cluster-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    /// API group, empty for the core group
    pub group: String,
    /// Resource kind
    pub kind: String,
    /// Namespace, empty for cluster-scoped objects
    pub namespace: String,
    /// Object name
    pub name: String,
}

impl ObjectId {
    /// Create a new object identity.
    pub fn new(
        group: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The group/kind of this object's type.
    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(self.group.clone(), self.kind.clone())
    }

    /// Whether the identity has no namespace.
    pub fn is_cluster_scoped(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Return a copy of this identity placed in `namespace`.
    #[must_use]
    pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}/{}/{}", self.group, self.kind, self.name)
        } else {
            write!(
                f,
                "{}/{}/{}/{}/{}",
                self.group, NAMESPACES_SEGMENT, self.namespace, self.kind, self.name
            )
        }
    }
}

/// An object reference string that is neither of the two accepted forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid object reference '{reference}': {reason}")]
pub struct InvalidObjectReference {
    /// The offending reference text
    pub reference: String,
    /// Why it was rejected
    pub reason: String,
}

impl InvalidObjectReference {
    fn new(reference: &str, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reference = s.trim();
        let parts: Vec<&str> = reference.split('/').collect();

        let id = match parts.as_slice() {
            [group, kind, name] => ObjectId::new(*group, *kind, "", *name),
            [group, segment, namespace, kind, name] => {
                if *segment != NAMESPACES_SEGMENT {
                    return Err(InvalidObjectReference::new(
                        reference,
                        format!("expected '{NAMESPACES_SEGMENT}' as second segment, found '{segment}'"),
                    ));
                }
                if namespace.is_empty() {
                    return Err(InvalidObjectReference::new(reference, "namespace is empty"));
                }
                ObjectId::new(*group, *kind, *namespace, *name)
            }
            _ => {
                return Err(InvalidObjectReference::new(
                    reference,
                    format!("expected 3 or 5 '/'-separated segments, found {}", parts.len()),
                ));
            }
        };

        if id.kind.is_empty() {
            return Err(InvalidObjectReference::new(reference, "kind is empty"));
        }
        if id.name.is_empty() {
            return Err(InvalidObjectReference::new(reference, "name is empty"));
        }
        Ok(id)
    }
}

/// Split an `apiVersion` string into `(group, version)`.
///
/// `v1` is the core group, `apps/v1` yields `("apps", "v1")`.
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}
