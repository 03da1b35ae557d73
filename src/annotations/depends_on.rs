//! Codec for the `depends-on` annotation.

use super::AnnotationError;
use crate::constants::DEPENDS_ON_ANNOTATION;
use crate::core::{Document, ObjectId};

/// Parse a comma-separated list of object references.
///
/// Blank text is an empty list. Duplicate entries are preserved so that the
/// graph can report them.
pub fn parse_dependencies(text: &str) -> Result<Vec<ObjectId>, AnnotationError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|entry| {
            entry.parse::<ObjectId>().map_err(|source| AnnotationError::InvalidReference {
                annotation: DEPENDS_ON_ANNOTATION.to_string(),
                source,
            })
        })
        .collect()
}

/// Format object references as annotation text.
pub fn format_dependencies(ids: &[ObjectId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Read the dependencies declared on `document`; absent annotation is empty.
pub fn read_dependencies(document: &Document) -> Result<Vec<ObjectId>, AnnotationError> {
    document.annotation(DEPENDS_ON_ANNOTATION).map_or_else(|| Ok(Vec::new()), parse_dependencies)
}

/// Replace the dependencies declared on `document`.
///
/// An empty list removes the annotation.
pub fn write_dependencies(document: &mut Document, ids: &[ObjectId]) {
    if ids.is_empty() {
        document.remove_annotation(DEPENDS_ON_ANNOTATION);
    } else {
        document.set_annotation(DEPENDS_ON_ANNOTATION, format_dependencies(ids));
    }
}
