//! Restricted path expressions over generic documents.
//!
//! This module reads and writes fields of [`serde_json::Value`] trees using a
//! deliberately small subset of JSONPath, sized to what the apply-time mutation
//! annotation needs for its `sourcePath` and `targetPath` fields.
//!
//! # Supported Grammar
//!
//! - `$` root marker (required)
//! - `.name` and `['any key']` / `["any key"]` field access; the bracket form is
//!   required for keys containing characters other than `[A-Za-z0-9_-]`
//! - `[3]` list index
//! - `.*` / `[*]` wildcard over a map's values or a list's elements
//! - `[?(@.field == literal)]` filter over list elements, combining clauses
//!   with `&&` (binds tighter) and `||`
//!
//! Recursive descent, slices, negative indexes, script expressions and
//! comparison operators other than `==` are rejected as syntax errors.
//!
//! # Match Semantics
//!
//! [`get`] returns every matched value; zero matches is an empty list, not an
//! error. `null` is a legitimate match, distinct from no match. [`set`] writes
//! every existing match and returns how many there were; it never adds a
//! field, so a path that [`get`] finds nothing at writes nothing. Callers
//! needing exactly one match use [`locate`] first.
//!
//! # Examples
//!
//! ```rust
//! use kwave_cli::jsonpath;
//! use serde_json::json;
//!
//! let mut pod = json!({
//!     "spec": {"containers": [
//!         {"name": "app", "env": [{"name": "PORT", "value": "${port}"}]},
//!         {"name": "sidecar"}
//!     ]}
//! });
//!
//! let path = r#"$.spec.containers[?(@.name == "app")].env[?(@.name == "PORT")].value"#;
//! assert_eq!(jsonpath::get(&pod, path).unwrap(), vec![json!("${port}")]);
//!
//! let written = jsonpath::set(&mut pod, path, json!("8080")).unwrap();
//! assert_eq!(written, 1);
//! assert_eq!(pod["spec"]["containers"][0]["env"][0]["value"], "8080");
//! ```

mod eval;
mod parser;


pub use eval::{Location, Step};
pub use parser::{FilterExpr, Segment};

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The expression is not valid in the supported grammar
    #[error("invalid path expression '{path}' at offset {position}: {message}")]
    Syntax {
        /// The full expression text
        path: String,
        /// Byte offset of the problem
        position: usize,
        /// What was wrong
        message: String,
    },
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    text: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse a path expression.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        Ok(Self {
            text: path.trim().to_string(),
            segments: parser::parse(path)?,
        })
    }

    /// The parsed segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every value matched in `root`.
    pub fn get(&self, root: &Value) -> Vec<Value> {
        eval::walk(root, &self.segments).into_iter().map(|(_, value)| value.clone()).collect()
    }

    /// Every existing location matched in `root`.
    pub fn locate(&self, root: &Value) -> Vec<Location> {
        eval::walk(root, &self.segments).into_iter().map(|(location, _)| location).collect()
    }

    /// Write `value` to every match, returning the number of matches written.
    pub fn set(&self, root: &mut Value, value: Value) -> usize {
        let locations = self.locate(root);
        let mut written = 0;
        for location in &locations {
            if location.write(root, value.clone()) {
                written += 1;
            }
        }
        written
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Every value at `path` in `root`.
pub fn get(root: &Value, path: &str) -> Result<Vec<Value>, PathError> {
    Ok(JsonPath::parse(path)?.get(root))
}

/// Every existing location matched by `path` in `root`.
pub fn locate(root: &Value, path: &str) -> Result<Vec<Location>, PathError> {
    Ok(JsonPath::parse(path)?.locate(root))
}

/// Write `value` to every match of `path` in `root`, returning the match count.
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<usize, PathError> {
    Ok(JsonPath::parse(path)?.set(root, value))
}
