//! Codec for the `apply-time-mutation` annotation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AnnotationError;
use crate::constants::APPLY_TIME_MUTATION_ANNOTATION;
use crate::core::{Document, GroupKind, ObjectId, split_api_version};

/// Reference to the source object of a substitution.
///
/// The group may be given directly or derived from `apiVersion`; when both are
/// present `group` wins. `apiVersion` also pins the version used when
/// resolving the type's scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    /// Optional `group/version` or `version`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    /// API group, empty for the core group
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// Resource kind
    pub kind: String,
    /// Object name
    pub name: String,
    /// Namespace, empty when cluster-scoped or not yet defaulted
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl ResourceReference {
    /// Reference an object by identity.
    pub fn from_object_id(id: &ObjectId) -> Self {
        Self {
            api_version: String::new(),
            group: id.group.clone(),
            kind: id.kind.clone(),
            name: id.name.clone(),
            namespace: id.namespace.clone(),
        }
    }

    /// Effective API group.
    pub fn group(&self) -> &str {
        if self.group.is_empty() {
            split_api_version(&self.api_version).0
        } else {
            &self.group
        }
    }

    /// Version from `apiVersion`, if one was given.
    pub fn version(&self) -> Option<&str> {
        if self.api_version.is_empty() {
            None
        } else {
            Some(split_api_version(&self.api_version).1)
        }
    }

    /// Group and kind of the referenced type.
    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(self.group(), self.kind.clone())
    }

    /// Identity of the referenced object, namespace as written.
    pub fn to_object_id(&self) -> ObjectId {
        ObjectId::new(self.group(), self.kind.clone(), self.namespace.clone(), self.name.clone())
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_object_id())
    }
}

/// One field-level copy/replace directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSubstitution {
    /// Object to read from
    pub source_ref: ResourceReference,
    /// Path of the value in the source object
    pub source_path: String,
    /// Path of the field to write in the target object
    pub target_path: String,
    /// When set, only occurrences of this token in the target string are replaced
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

/// Decode a YAML or JSON list of substitutions.
pub fn parse_substitutions(text: &str) -> Result<Vec<FieldSubstitution>, AnnotationError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let substitutions: Vec<FieldSubstitution> =
        serde_yaml::from_str(text).map_err(|source| AnnotationError::Malformed {
            annotation: APPLY_TIME_MUTATION_ANNOTATION.to_string(),
            source,
        })?;

    for (index, substitution) in substitutions.iter().enumerate() {
        let missing = if substitution.source_ref.kind.is_empty() {
            Some("sourceRef.kind is empty")
        } else if substitution.source_ref.name.is_empty() {
            Some("sourceRef.name is empty")
        } else if substitution.source_path.trim().is_empty() {
            Some("sourcePath is empty")
        } else if substitution.target_path.trim().is_empty() {
            Some("targetPath is empty")
        } else {
            None
        };
        if let Some(reason) = missing {
            return Err(AnnotationError::InvalidSubstitution {
                annotation: APPLY_TIME_MUTATION_ANNOTATION.to_string(),
                index,
                reason: reason.to_string(),
            });
        }
    }
    Ok(substitutions)
}

/// Encode substitutions as annotation text (YAML).
pub fn format_substitutions(substitutions: &[FieldSubstitution]) -> Result<String, AnnotationError> {
    serde_yaml::to_string(substitutions).map_err(|source| AnnotationError::Encode {
        annotation: APPLY_TIME_MUTATION_ANNOTATION.to_string(),
        source,
    })
}

/// Whether `document` carries the mutation annotation at all.
pub fn has_substitutions(document: &Document) -> bool {
    document.annotation(APPLY_TIME_MUTATION_ANNOTATION).is_some()
}

/// Read the substitutions declared on `document`.
///
/// Returns `None` when the annotation is absent, which callers treat
/// differently from an empty list only for logging.
pub fn read_substitutions(document: &Document) -> Result<Option<Vec<FieldSubstitution>>, AnnotationError> {
    document.annotation(APPLY_TIME_MUTATION_ANNOTATION).map(parse_substitutions).transpose()
}

/// Replace the substitutions declared on `document`.
pub fn write_substitutions(
    document: &mut Document,
    substitutions: &[FieldSubstitution],
) -> Result<(), AnnotationError> {
    let text = format_substitutions(substitutions)?;
    document.set_annotation(APPLY_TIME_MUTATION_ANNOTATION, text);
    Ok(())
}
