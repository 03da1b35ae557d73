//! Test fixtures for resource documents
//!
//! [`DocumentBuilder`] builds single documents in code; [`BatchFixture`]
//! holds ready-made multi-document YAML batches for the common scenarios.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{APPLY_TIME_MUTATION_ANNOTATION, DEPENDS_ON_ANNOTATION};
use crate::core::{Document, ObjectId, load_documents};

/// Fluent builder for a single resource document.
#[derive(Clone, Debug)]
pub struct DocumentBuilder {
    value: Value,
}

impl DocumentBuilder {
    /// Start a document with `apiVersion`, `kind` and `metadata.name`.
    pub fn new(api_version: &str, kind: &str, name: &str) -> Self {
        Self {
            value: json!({
                "apiVersion": api_version,
                "kind": kind,
                "metadata": { "name": name },
            }),
        }
    }

    /// Set `metadata.namespace`.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.value["metadata"]["namespace"] = json!(namespace);
        self
    }

    /// Add one annotation.
    pub fn annotation(mut self, key: &str, value: &str) -> Self {
        let metadata = &mut self.value["metadata"];
        if !metadata["annotations"].is_object() {
            metadata["annotations"] = Value::Object(Map::new());
        }
        metadata["annotations"][key] = json!(value);
        self
    }

    /// Set the `depends-on` annotation from identities.
    pub fn depends_on(self, ids: &[ObjectId]) -> Self {
        let value = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        self.annotation(DEPENDS_ON_ANNOTATION, &value)
    }

    /// Set the `apply-time-mutation` annotation verbatim.
    pub fn mutation(self, annotation: &str) -> Self {
        self.annotation(APPLY_TIME_MUTATION_ANNOTATION, annotation)
    }

    /// Set a top-level field such as `spec` or `data`.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.value[key] = value;
        self
    }

    /// Finish the document.
    pub fn build(self) -> Document {
        Document::new(self.value)
    }
}

/// A named multi-document YAML batch.
#[derive(Clone, Debug)]
pub struct BatchFixture {
    pub name: String,
    pub content: String,
}

impl BatchFixture {
    /// Namespace, Secret and a Deployment that depends on the Secret.
    ///
    /// Sorts into three waves: Namespace, Secret, Deployment.
    pub fn namespaced_app() -> Self {
        Self {
            name: "namespaced_app".to_string(),
            content: r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
  namespace: web
  annotations:
    config.kubernetes.io/depends-on: /namespaces/web/Secret/db-credentials
spec:
  replicas: 1
---
apiVersion: v1
kind: Secret
metadata:
  name: db-credentials
  namespace: web
data:
  password: aHVudGVyMg==
---
apiVersion: v1
kind: Namespace
metadata:
  name: web
"#
            .trim()
            .to_string(),
        }
    }

    /// A CRD, one of its custom resources, and an unrelated ConfigMap.
    pub fn crd_with_resource() -> Self {
        Self {
            name: "crd_with_resource".to_string(),
            content: r#"
apiVersion: example.com/v1
kind: Widget
metadata:
  name: gear
  namespace: default
spec:
  size: 3
---
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  scope: Namespaced
  names:
    kind: Widget
    plural: widgets
  versions:
  - name: v1
    served: true
    storage: true
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
  namespace: default
data:
  mode: fast
"#
            .trim()
            .to_string(),
        }
    }

    /// A Service and a Pod whose environment is filled from the Service.
    ///
    /// The Pod's source reference omits the namespace.
    pub fn service_and_pod() -> Self {
        Self {
            name: "service_and_pod".to_string(),
            content: r#"
apiVersion: v1
kind: Pod
metadata:
  name: client
  namespace: web
  annotations:
    config.kubernetes.io/apply-time-mutation: |
      - sourceRef:
          kind: Service
          name: backend
        sourcePath: $.spec.ports[0].port
        targetPath: $.spec.containers[0].env[0].value
        token: ${port}
spec:
  containers:
  - name: client
    image: client:1
    env:
    - name: BACKEND_URL
      value: http://backend:${port}/api
---
apiVersion: v1
kind: Service
metadata:
  name: backend
  namespace: web
spec:
  ports:
  - name: http
    port: 8080
"#
            .trim()
            .to_string(),
        }
    }

    /// Two ConfigMaps depending on each other.
    pub fn cycle() -> Self {
        Self {
            name: "cycle".to_string(),
            content: r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: a
  namespace: web
  annotations:
    config.kubernetes.io/depends-on: /namespaces/web/ConfigMap/b
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: b
  namespace: web
  annotations:
    config.kubernetes.io/depends-on: /namespaces/web/ConfigMap/a
"#
            .trim()
            .to_string(),
        }
    }

    /// A Pod depending on a Secret that is not in the batch.
    pub fn external_dependency() -> Self {
        Self {
            name: "external_dependency".to_string(),
            content: r#"
apiVersion: v1
kind: Pod
metadata:
  name: app
  namespace: web
  annotations:
    config.kubernetes.io/depends-on: /namespaces/web/Secret/missing
"#
            .trim()
            .to_string(),
        }
    }

    /// Parse the batch.
    pub fn documents(&self) -> Vec<Document> {
        load_documents(&self.content).unwrap_or_else(|e| panic!("fixture {} does not parse: {e}", self.name))
    }

    /// Write the batch to `<dir>/<name>.yaml` and return the path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.yaml", self.name));
        fs::write(&path, &self.content).with_context(|| format!("Failed to write fixture {}", path.display()))?;
        Ok(path)
    }
}
