//! Resource documents.
//!
//! A [`Document`] is an opaque tree of maps, lists and scalars (a
//! [`serde_json::Value`]) with a derivable [`ObjectId`] and a string-to-string
//! annotation map under `metadata.annotations`. The graph only reads documents;
//! the mutators rewrite annotations and target fields in place.
//!
//! Documents are loaded from YAML or JSON text. Multi-document YAML streams
//! (`---` separated) are split into one [`Document`] per entry, skipping empty
//! entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::identity::{ObjectId, split_api_version};

/// One resource document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    /// Wrap a JSON value as a document.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a single YAML (or JSON) document.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content).map(Self)
    }

    /// Borrow the underlying value tree.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Mutably borrow the underlying value tree.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    /// Unwrap into the underlying value tree.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Derive the identity of this document.
    ///
    /// Missing fields derive as empty strings; the group comes from `apiVersion`.
    pub fn id(&self) -> ObjectId {
        let (group, _) = split_api_version(self.api_version());
        ObjectId::new(group, self.kind(), self.namespace(), self.name())
    }

    /// The `apiVersion` field, or empty.
    pub fn api_version(&self) -> &str {
        self.str_at(&["apiVersion"]).unwrap_or_default()
    }

    /// The `kind` field, or empty.
    pub fn kind(&self) -> &str {
        self.str_at(&["kind"]).unwrap_or_default()
    }

    /// The `metadata.name` field, or empty.
    pub fn name(&self) -> &str {
        self.str_at(&["metadata", "name"]).unwrap_or_default()
    }

    /// The `metadata.namespace` field, or empty.
    pub fn namespace(&self) -> &str {
        self.str_at(&["metadata", "namespace"]).unwrap_or_default()
    }

    /// Look up a string by a fixed list of map keys.
    pub fn str_at(&self, keys: &[&str]) -> Option<&str> {
        let mut current = &self.0;
        for key in keys {
            current = current.as_object()?.get(*key)?;
        }
        current.as_str()
    }

    /// Look up a single annotation value.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.str_at(&["metadata", "annotations", key])
    }

    /// All string-valued annotations.
    pub fn annotations(&self) -> BTreeMap<String, String> {
        self.0
            .get("metadata")
            .and_then(|m| m.get("annotations"))
            .and_then(Value::as_object)
            .map(|annotations| {
                annotations
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set an annotation, creating `metadata` and `metadata.annotations` as needed.
    ///
    /// A non-map `metadata` or `annotations` value is replaced by a map.
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let root = ensure_object(&mut self.0);
        let metadata = ensure_object(root.entry("metadata").or_insert_with(|| Value::Object(Map::new())));
        let annotations =
            ensure_object(metadata.entry("annotations").or_insert_with(|| Value::Object(Map::new())));
        annotations.insert(key.into(), Value::String(value.into()));
    }

    /// Remove an annotation, returning its previous value.
    pub fn remove_annotation(&mut self, key: &str) -> Option<String> {
        let removed = self
            .0
            .get_mut("metadata")?
            .get_mut("annotations")?
            .as_object_mut()?
            .remove(key)?;
        match removed {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// Parse a YAML stream that may contain several `---` separated documents.
///
/// Empty documents (including a trailing `---`) are skipped. JSON input is
/// accepted too since it is valid YAML.
pub fn load_documents(content: &str) -> Result<Vec<Document>, serde_yaml::Error> {
    let mut documents = Vec::new();
    for deserializer in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            continue;
        }
        documents.push(Document::new(value));
    }
    Ok(documents)
}

/// Render documents as a `---` separated YAML stream.
pub fn to_yaml_stream(documents: &[Document]) -> Result<String, serde_yaml::Error> {
    let mut out = String::new();
    for (i, document) in documents.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&serde_yaml::to_string(document)?);
    }
    Ok(out)
}
