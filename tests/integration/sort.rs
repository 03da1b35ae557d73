use kwave_cli::core::load_documents;
use kwave_cli::test_utils::BatchFixture;
use predicates::prelude::*;

use crate::common::TestProject;

/// Deployment -> Secret -> Namespace come out as three waves
#[tokio::test]
async fn test_sort_text() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::namespaced_app()).unwrap();

    let output = project.run_kwave(&["sort", "namespaced_app.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert_eq!(
        output.stdout,
        "Wave 1 (1 object)\n  /Namespace/web\n\
         Wave 2 (1 object)\n  /namespaces/web/Secret/db-credentials\n\
         Wave 3 (1 object)\n  apps/namespaces/web/Deployment/api\n"
    );
}

#[tokio::test]
async fn test_sort_reverse_json() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::namespaced_app()).unwrap();

    let output = project.run_kwave(&["sort", "--reverse", "--format", "json", "namespaced_app.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let waves: Vec<Vec<String>> = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(
        waves,
        vec![
            vec!["apps/namespaces/web/Deployment/api".to_string()],
            vec!["/namespaces/web/Secret/db-credentials".to_string()],
            vec!["/Namespace/web".to_string()],
        ]
    );
}

/// Custom resources wait for their CRD; unrelated objects go first
#[tokio::test]
async fn test_sort_crd_before_custom_resource() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::crd_with_resource()).unwrap();

    let output = project.run_kwave(&["sort", "--format", "json", "crd_with_resource.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let waves: Vec<Vec<String>> = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(
        waves,
        vec![
            vec![
                "apiextensions.k8s.io/CustomResourceDefinition/widgets.example.com".to_string(),
                "/namespaces/default/ConfigMap/settings".to_string(),
            ],
            vec!["example.com/namespaces/default/Widget/gear".to_string()],
        ]
    );
}

/// Defaulted source namespaces produce edges
#[tokio::test]
async fn test_sort_uses_mutation_sources() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::service_and_pod()).unwrap();

    let output = project.run_kwave(&["sort", "--format", "json", "service_and_pod.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let waves: Vec<Vec<String>> = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(
        waves,
        vec![vec!["/namespaces/web/Service/backend".to_string()], vec!["/namespaces/web/Pod/client".to_string()]]
    );
}

#[tokio::test]
async fn test_sort_yaml_across_files() {
    let project = TestProject::new().unwrap();
    project.write_file("app.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: c\n  namespace: web\n").await.unwrap();
    project.write_file("ns.yaml", "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: web\n").await.unwrap();

    let output = project.run_kwave(&["sort", "--format", "yaml", "app.yaml", "ns.yaml"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let documents = load_documents(&output.stdout).unwrap();
    let kinds: Vec<&str> = documents.iter().map(|doc| doc.kind()).collect();
    assert_eq!(kinds, vec!["Namespace", "ConfigMap"]);
}

#[tokio::test]
async fn test_sort_from_stdin() {
    let project = TestProject::new().unwrap();
    let output = project
        .run_kwave_with_stdin(&["sort", "-"], &BatchFixture::namespaced_app().content)
        .unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.starts_with("Wave 1 (1 object)\n  /Namespace/web\n"));
}

/// Objects without relationships share one wave
#[tokio::test]
async fn test_sort_unrelated_objects() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "flat.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n---\n\
             apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n---\n\
             apiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRole\nmetadata:\n  name: reader\n",
        )
        .await
        .unwrap();

    project
        .command()
        .args(["sort", "flat.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Wave 1 (3 objects)"))
        .stdout(predicate::str::contains("Wave 2").not());
}

#[tokio::test]
async fn test_sort_missing_file() {
    let project = TestProject::new().unwrap();

    let output = project.run_kwave(&["sort", "nope.yaml"]).unwrap();
    assert!(!output.success);
    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("File not found: nope.yaml"), "stderr: {}", output.stderr);
    assert!(output.stderr.contains("suggestion"));
}

#[tokio::test]
async fn test_sort_rejects_cycle() {
    let project = TestProject::new().unwrap();
    project.write_fixture(&BatchFixture::cycle()).unwrap();

    project
        .command()
        .args(["sort", "cycle.yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cyclic dependency"));
}
