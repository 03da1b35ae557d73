use futures::future::BoxFuture;
use kwave_cli::cluster::{
    BatchReader, MemoryResourceCache, PresenceStatusEvaluator, ReconcileStatus, ResourceReader, StaticTypeResolver,
};
use kwave_cli::constants::{APPLY_TIME_MUTATION_ANNOTATION, APPLY_TIME_MUTATION_REASON};
use kwave_cli::core::{Document, ObjectId};
use kwave_cli::mutator::{ApplyTimeMutator, MutationContext, MutationError, Mutator};
use kwave_cli::test_utils::{DocumentBuilder, init_test_logging};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reader that counts lookups.
struct CountingReader {
    inner: BatchReader,
    calls: AtomicUsize,
}

impl ResourceReader for CountingReader {
    fn get<'a>(&'a self, id: &'a ObjectId) -> BoxFuture<'a, anyhow::Result<Option<Document>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id)
    }
}

fn ingress(port: Value) -> Document {
    DocumentBuilder::new("networking.k8s.io/v1", "Ingress", "frontend")
        .namespace("shop")
        .field(
            "spec",
            json!({"rules": [{"http": {"paths": [{"backend": {"service": {"name": "frontend", "port": {"number": port}}}}]}}]}),
        )
        .build()
}

fn pod(token: &str, target_path: &str) -> Document {
    let annotation = format!(
        r#"- sourceRef:
    group: networking.k8s.io
    kind: Ingress
    name: frontend
  sourcePath: $.spec.rules[0].http.paths[0].backend.service.port
  targetPath: {target_path}
  token: "{token}"
"#
    );
    DocumentBuilder::new("v1", "Pod", "shop-client")
        .namespace("shop")
        .mutation(&annotation)
        .field(
            "spec",
            json!({"containers": [{"name": "app", "env": [
                {"name": "PORT", "value": "${service-port}"},
                {"name": "OTHER", "value": "static"}
            ]}]}),
        )
        .build()
}

/// Point the source path at the port number instead of the port object.
fn read_port_number(document: &mut Document) {
    let text = document
        .annotation(APPLY_TIME_MUTATION_ANNOTATION)
        .unwrap()
        .replace("backend.service.port\n", "backend.service.port.number\n");
    document.set_annotation(APPLY_TIME_MUTATION_ANNOTATION, text);
}

fn mutator(sources: Vec<Document>) -> (ApplyTimeMutator, Arc<CountingReader>) {
    init_test_logging(None);
    let reader = Arc::new(CountingReader {
        inner: BatchReader::with_documents(sources),
        calls: AtomicUsize::new(0),
    });
    let mutator = ApplyTimeMutator::new(
        Arc::new(StaticTypeResolver::new()),
        reader.clone(),
        Arc::new(PresenceStatusEvaluator),
    );
    (mutator, reader)
}

const PORT_PATH: &str = r#"$.spec.containers[?(@.name == "app")].env[?(@.name == "PORT")].value"#;

/// Pod env value templated from an Ingress port number
#[tokio::test]
async fn test_ingress_port_into_pod_env() {
    let (mutator, _) = mutator(vec![ingress(json!(80))]);
    let mut document = pod("${service-port}", PORT_PATH);
    read_port_number(&mut document);

    let outcome = mutator.mutate(&MutationContext::background(), &mut document).await.unwrap();
    assert!(outcome.mutated);
    assert_eq!(outcome.reason, APPLY_TIME_MUTATION_REASON);
    assert_eq!(document.value()["spec"]["containers"][0]["env"][0]["value"], json!("80"));
    assert_eq!(document.value()["spec"]["containers"][0]["env"][1]["value"], json!("static"));
}

/// A map source replacing a token renders as compact JSON
#[tokio::test]
async fn test_map_source_renders_compact_json() {
    let (mutator, _) = mutator(vec![ingress(json!(8443))]);
    let mut document = pod("${service-port}", PORT_PATH);

    mutator.mutate(&MutationContext::background(), &mut document).await.unwrap();
    assert_eq!(document.value()["spec"]["containers"][0]["env"][0]["value"], json!(r#"{"number":8443}"#));
}

/// Without a token the target becomes the source structure
#[tokio::test]
async fn test_empty_token_copies_structure() {
    let (mutator, _) = mutator(vec![ingress(json!(80))]);
    let mut document = pod("", "$.spec.containers[0].env[1].value");

    mutator.mutate(&MutationContext::background(), &mut document).await.unwrap();
    assert_eq!(document.value()["spec"]["containers"][0]["env"][1]["value"], json!({"number": 80}));
}

#[tokio::test]
async fn test_float_keeps_fraction() {
    let (mutator, _) = mutator(vec![ingress(json!(1.5))]);
    let mut document = pod("${service-port}", PORT_PATH);
    read_port_number(&mut document);

    mutator.mutate(&MutationContext::background(), &mut document).await.unwrap();
    assert_eq!(document.value()["spec"]["containers"][0]["env"][0]["value"], json!("1.5"));
}

/// Re-running after the token was consumed changes nothing and does not fail
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let (mutator, _) = mutator(vec![ingress(json!(80))]);
    let mut document = pod("${service-port}", PORT_PATH);
    let ctx = MutationContext::background();

    mutator.mutate(&ctx, &mut document).await.unwrap();
    let once = document.clone();
    mutator.mutate(&ctx, &mut document).await.unwrap();
    assert_eq!(document, once);
}

#[tokio::test]
async fn test_no_annotation_untouched() {
    let (mutator, reader) = mutator(vec![ingress(json!(80))]);
    let mut document = DocumentBuilder::new("v1", "Pod", "plain").namespace("shop").build();
    let before = serde_json::to_string(&document).unwrap();

    let outcome = mutator.mutate(&MutationContext::background(), &mut document).await.unwrap();
    assert!(!outcome.mutated);
    assert!(outcome.reason.is_empty());
    assert_eq!(serde_json::to_string(&document).unwrap(), before);
    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
}

/// Self-references fail before any lookup
#[tokio::test]
async fn test_self_reference_before_lookup() {
    let (mutator, reader) = mutator(vec![ingress(json!(80))]);
    let mut document = DocumentBuilder::new("v1", "ConfigMap", "loop")
        .namespace("shop")
        .mutation(
            r#"[{"sourceRef": {"kind": "ConfigMap", "name": "loop"}, "sourcePath": "$.data.a", "targetPath": "$.data.b"}]"#,
        )
        .field("data", json!({"a": "x", "b": "y"}))
        .build();

    let err = mutator.mutate(&MutationContext::background(), &mut document).await.unwrap_err();
    assert!(matches!(err, MutationError::SelfReference { index: 0, .. }));
    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
}

/// A missing source is cached as absent and still reported
#[tokio::test]
async fn test_missing_source_cached_as_not_found() {
    let (mutator, _) = mutator(Vec::new());
    let cache = Arc::new(MemoryResourceCache::new());
    let mutator = mutator.with_cache(cache.clone());
    let mut document = pod("${service-port}", PORT_PATH);

    let err = mutator.mutate(&MutationContext::background(), &mut document).await.unwrap_err();
    assert!(matches!(err, MutationError::SourceNotFound { .. }));

    let snapshot = cache.snapshot();
    let entry = &snapshot[&ObjectId::new("networking.k8s.io", "Ingress", "shop", "frontend")];
    assert!(entry.resource.is_none());
    assert_eq!(entry.status, ReconcileStatus::NotFound);
}
