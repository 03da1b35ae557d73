use kwave_cli::test_utils::BatchFixture;
use predicates::prelude::*;

use crate::common::TestProject;

#[tokio::test]
async fn test_validate_valid_batch() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::namespaced_app()).unwrap();

    let output = project.run_kwave(&["validate", "namespaced_app.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("✓"));
    assert!(output.stdout.contains("3 objects, 3 dependencies, 3 waves"), "stdout: {}", output.stdout);
}

/// Both edges of a two-object cycle are named
#[tokio::test]
async fn test_validate_cycle() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::cycle()).unwrap();

    let output = project.run_kwave(&["validate", "cycle.yaml"]).unwrap();
    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("cyclic dependency"));
    assert!(output.stderr.contains("/namespaces/web/ConfigMap/a -> /namespaces/web/ConfigMap/b"));
    assert!(output.stderr.contains("/namespaces/web/ConfigMap/b -> /namespaces/web/ConfigMap/a"));
    assert!(output.stderr.contains("cycle"));
}

#[tokio::test]
async fn test_validate_external_dependency() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::external_dependency()).unwrap();

    project
        .command()
        .args(["validate", "external_dependency.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("external dependency"))
        .stderr(predicate::str::contains("/namespaces/web/Secret/missing"))
        .stderr(predicate::str::contains("Add the missing objects"));
}

/// Problems on several objects are reported together
#[tokio::test]
async fn test_validate_json_lists_all_problems() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::external_dependency()).unwrap();
    project
        .write_file(
            "dupes.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: c\n  namespace: web\n  annotations:\n    \
             config.kubernetes.io/depends-on: /namespaces/web/Pod/app,/namespaces/web/Pod/app\n",
        )
        .await
        .unwrap();

    let output = project
        .run_kwave(&["validate", "--format", "json", "external_dependency.yaml", "dupes.yaml"])
        .unwrap();
    assert_eq!(output.code, Some(1));

    let report: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["objects"], 2);
    let errors: Vec<&str> = report["errors"].as_array().unwrap().iter().map(|e| e.as_str().unwrap()).collect();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].starts_with("external dependency"));
    assert!(errors[1].starts_with("duplicate dependency"));
    assert!(output.stderr.contains("2 validation errors"));
}

#[tokio::test]
async fn test_validate_malformed_annotation() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "bad.yaml",
            "apiVersion: v1\nkind: Pod\nmetadata:\n  name: app\n  namespace: web\n  annotations:\n    \
             config.kubernetes.io/depends-on: not-a-reference\n",
        )
        .await
        .unwrap();

    let output = project.run_kwave(&["validate", "bad.yaml"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("/namespaces/web/Pod/app"), "stderr: {}", output.stderr);
    assert!(output.stderr.contains("not-a-reference"));
}
