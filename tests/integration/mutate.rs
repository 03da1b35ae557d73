use kwave_cli::constants::APPLY_TIME_MUTATION_ANNOTATION;
use kwave_cli::core::{Document, load_documents};
use kwave_cli::test_utils::BatchFixture;
use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;

fn client_url(document: &Document) -> &serde_json::Value {
    &document.value()["spec"]["containers"][0]["env"][0]["value"]
}

#[tokio::test]
async fn test_mutate_yaml() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::service_and_pod()).unwrap();

    let output = project.run_kwave(&["mutate", "service_and_pod.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let documents = load_documents(&output.stdout).unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].kind(), "Service");
    assert_eq!(documents[1].kind(), "Pod");
    assert_eq!(client_url(&documents[1]), "http://backend:8080/api");

    // The implicit namespace is written back into the annotation
    let annotation = documents[1].annotation(APPLY_TIME_MUTATION_ANNOTATION).unwrap();
    assert!(annotation.contains("namespace: web"), "annotation: {annotation}");
}

#[tokio::test]
async fn test_mutate_json_without_cache() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::service_and_pod()).unwrap();

    let output = project.run_kwave(&["mutate", "--no-cache", "--format", "json", "service_and_pod.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let documents: Vec<Document> = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(client_url(&documents[1]), "http://backend:8080/api");
}

#[tokio::test]
async fn test_mutate_text_lists_changes() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::service_and_pod()).unwrap();

    project
        .command()
        .args(["mutate", "--format", "text", "service_and_pod.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wave 2: /namespaces/web/Pod/client (apply-time-mutator)"))
        .stdout(predicate::str::contains("config.kubernetes.io/apply-time-mutation"));
}

#[tokio::test]
async fn test_mutate_nothing_to_do() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::namespaced_app()).unwrap();

    let output = project.run_kwave(&["mutate", "--format", "text", "namespaced_app.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert_eq!(output.stdout, "No documents changed\n");
}

/// Without a token the whole source structure is copied
#[tokio::test]
async fn test_mutate_copies_structure() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "copy.yaml",
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: copy
  namespace: web
  annotations:
    config.kubernetes.io/apply-time-mutation: |
      - sourceRef:
          kind: ConfigMap
          name: original
        sourcePath: $.data
        targetPath: $.data
data: {}
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: original
  namespace: web
data:
  mode: fast
  replicas: "3"
"#,
        )
        .await
        .unwrap();

    let output = project.run_kwave(&["mutate", "--format", "json", "copy.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let documents: Vec<Document> = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(documents[1].name(), "copy");
    assert_eq!(documents[1].value()["data"], json!({"mode": "fast", "replicas": "3"}));
}

#[tokio::test]
async fn test_mutate_missing_source_field() {
    let project = TestProject::new().unwrap();
    let content = BatchFixture::service_and_pod().content.replace("$.spec.ports[0].port", "$.spec.ports[3].port");
    project.write_file("pod.yaml", &content).await.unwrap();

    let output = project.run_kwave(&["mutate", "pod.yaml"]).unwrap();
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.is_empty());
    assert!(
        output.stderr.contains("source field not present: $.spec.ports[3].port in /namespaces/web/Service/backend"),
        "stderr: {}",
        output.stderr
    );
}

/// A misspelt target path fails instead of adding a field
#[tokio::test]
async fn test_mutate_missing_target_field() {
    let project = TestProject::new().unwrap();
    let content = BatchFixture::service_and_pod()
        .content
        .replace("targetPath: $.spec.containers[0].env[0].value", "targetPath: $.spec.containers[0].imagePullPolicy")
        .replace("        token: ${port}\n", "");
    project.write_file("pod.yaml", &content).await.unwrap();

    let output = project.run_kwave(&["mutate", "pod.yaml"]).unwrap();
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.is_empty());
    assert!(
        output.stderr.contains(
            "target field $.spec.containers[0].imagePullPolicy of /namespaces/web/Pod/client must match exactly once, matched 0"
        ),
        "stderr: {}",
        output.stderr
    );
}

#[tokio::test]
async fn test_mutate_source_outside_batch() {
    let project = TestProject::new().unwrap();
    let content = BatchFixture::service_and_pod().content.replace("name: backend\n  namespace", "name: other\n  namespace");
    project.write_file("pod.yaml", &content).await.unwrap();

    project
        .command()
        .args(["mutate", "pod.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("external dependency"))
        .stderr(predicate::str::contains("/namespaces/web/Service/backend"));
}

#[tokio::test]
async fn test_mutate_unknown_source_type() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "widget.yaml",
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: consumer
  namespace: web
  annotations:
    config.kubernetes.io/apply-time-mutation: |
      - sourceRef:
          group: example.com
          kind: Widget
          name: gear
          namespace: web
        sourcePath: $.spec.size
        targetPath: $.data.size
data:
  size: unknown
---
apiVersion: example.com/v1
kind: Widget
metadata:
  name: gear
  namespace: web
spec:
  size: 3
"#,
        )
        .await
        .unwrap();

    let output = project.run_kwave(&["mutate", "widget.yaml"]).unwrap();
    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("no matches for type"), "stderr: {}", output.stderr);
    assert!(output.stderr.contains("[[types]]"));
}
