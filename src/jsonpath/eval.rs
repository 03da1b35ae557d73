//! Evaluation of parsed path segments against a value tree.

use serde_json::Value;
use std::fmt;

use super::parser::{FilterExpr, Segment};

/// One concrete step from a parent value to a child value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Map key
    Key(String),
    /// List index
    Index(usize),
}

/// Concrete location of one match, as the chain of steps from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location(pub Vec<Step>);

impl Location {
    /// Resolve this location against `root`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |current, step| match step {
            Step::Key(key) => current.as_object()?.get(key),
            Step::Index(i) => current.as_array()?.get(*i),
        })
    }

    /// Write `value` at this location.
    ///
    /// Every step must exist; returns false when the location no longer fits
    /// the tree.
    pub fn write(&self, root: &mut Value, value: Value) -> bool {
        let slot = self.0.iter().try_fold(root, |current, step| match step {
            Step::Key(key) => current.as_object_mut()?.get_mut(key),
            Step::Index(i) => current.as_array_mut()?.get_mut(*i),
        });
        match slot {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for step in &self.0 {
            match step {
                Step::Key(key) if is_plain_name(key) => write!(f, ".{key}")?,
                Step::Key(key) => write!(f, "['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))?,
                Step::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

fn is_plain_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Walk `segments` from `root`, returning every matched location and value.
///
/// Only existing values match; a missing key or index yields nothing.
pub(super) fn walk<'a>(root: &'a Value, segments: &[Segment]) -> Vec<(Location, &'a Value)> {
    let mut current: Vec<(Vec<Step>, &'a Value)> = vec![(Vec::new(), root)];

    for segment in segments {
        let mut next = Vec::new();

        for (steps, value) in current {
            match segment {
                Segment::Field(key) => {
                    if let Some(child) = value.as_object().and_then(|m| m.get(key)) {
                        next.push((child_steps(&steps, Step::Key(key.clone())), child));
                    }
                }
                Segment::Index(index) => {
                    if let Some(child) = value.as_array().and_then(|a| a.get(*index)) {
                        next.push((child_steps(&steps, Step::Index(*index)), child));
                    }
                }
                Segment::Wildcard => match value {
                    Value::Object(map) => {
                        for (key, child) in map {
                            next.push((child_steps(&steps, Step::Key(key.clone())), child));
                        }
                    }
                    Value::Array(items) => {
                        for (index, child) in items.iter().enumerate() {
                            next.push((child_steps(&steps, Step::Index(index)), child));
                        }
                    }
                    _ => {}
                },
                Segment::Filter(expr) => {
                    if let Some(items) = value.as_array() {
                        for (index, child) in items.iter().enumerate() {
                            if matches_filter(expr, child) {
                                next.push((child_steps(&steps, Step::Index(index)), child));
                            }
                        }
                    }
                }
            }
        }
        current = next;
    }

    current.into_iter().map(|(steps, value)| (Location(steps), value)).collect()
}

fn child_steps(parent: &[Step], step: Step) -> Vec<Step> {
    let mut steps = Vec::with_capacity(parent.len() + 1);
    steps.extend_from_slice(parent);
    steps.push(step);
    steps
}

fn matches_filter(expr: &FilterExpr, element: &Value) -> bool {
    match expr {
        FilterExpr::Equals {
            field,
            literal,
        } => {
            let found = field.iter().try_fold(element, |current, key| current.as_object()?.get(key));
            found.is_some_and(|value| literal_equals(value, literal))
        }
        FilterExpr::And(lhs, rhs) => matches_filter(lhs, element) && matches_filter(rhs, element),
        FilterExpr::Or(lhs, rhs) => matches_filter(lhs, element) || matches_filter(rhs, element),
    }
}

fn literal_equals(value: &Value, literal: &Value) -> bool {
    match (value, literal) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => value == literal,
    }
}
