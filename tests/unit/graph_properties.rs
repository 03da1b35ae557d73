use kwave_cli::cluster::StaticTypeResolver;
use kwave_cli::core::{Document, ObjectId};
use kwave_cli::graph::{DependencyGraph, Edge, GraphError, build_graph, reverse_sort_objs, sort_objs};
use kwave_cli::mutator::{MutationContext, Mutator, NamespaceDefaulter, mutate_all};
use kwave_cli::test_utils::{BatchFixture, DocumentBuilder};
use std::collections::HashMap;
use std::sync::Arc;

fn ids(waves: &[Vec<Document>]) -> Vec<Vec<ObjectId>> {
    waves.iter().map(|wave| wave.iter().map(Document::id).collect()).collect()
}

#[test]
fn test_no_relationships_single_wave() {
    let batch = vec![
        DocumentBuilder::new("v1", "ConfigMap", "a").namespace("one").build(),
        DocumentBuilder::new("v1", "ConfigMap", "b").namespace("two").build(),
        DocumentBuilder::new("rbac.authorization.k8s.io/v1", "ClusterRole", "reader").build(),
    ];

    let waves = sort_objs(batch).unwrap();
    assert_eq!(waves.len(), 1);
    assert_eq!(waves[0].len(), 3);
}

/// Every prerequisite lands in an earlier wave than its dependents
#[tokio::test]
async fn test_edges_point_to_earlier_waves() {
    let mut batch = BatchFixture::namespaced_app().documents();
    batch.extend(BatchFixture::crd_with_resource().documents());
    batch.extend(BatchFixture::service_and_pod().documents());
    batch.push(DocumentBuilder::new("v1", "Namespace", "default").build());

    let mutators: Vec<Box<dyn Mutator>> =
        vec![Box::new(NamespaceDefaulter::new(Arc::new(StaticTypeResolver::new())))];
    mutate_all(&MutationContext::background(), &mut batch, &mutators).await.unwrap();

    let (graph, errors) = build_graph(&batch);
    assert!(errors.is_empty(), "{errors:?}");
    assert!(graph.edge_count() >= 6);

    let waves = graph.sort().unwrap();
    let wave_of: HashMap<&ObjectId, usize> =
        waves.iter().enumerate().flat_map(|(i, wave)| wave.iter().map(move |id| (id, i))).collect();

    for Edge {
        from,
        to,
    } in graph.edges()
    {
        assert!(wave_of[&to] < wave_of[&from], "{from} -> {to}");
    }
}

/// Deployment -> Secret -> Pod sorts Pod first
#[test]
fn test_depends_on_chain() {
    let pod = ObjectId::new("", "Pod", "web", "worker");
    let secret = ObjectId::new("", "Secret", "web", "token");
    let batch = vec![
        DocumentBuilder::new("apps/v1", "Deployment", "api")
            .namespace("web")
            .depends_on(std::slice::from_ref(&secret))
            .build(),
        DocumentBuilder::new("v1", "Secret", "token").namespace("web").depends_on(std::slice::from_ref(&pod)).build(),
        DocumentBuilder::new("v1", "Pod", "worker").namespace("web").build(),
    ];

    let waves = sort_objs(batch).unwrap();
    assert_eq!(ids(&waves), vec![vec![pod], vec![secret], vec![ObjectId::new("apps", "Deployment", "web", "api")]]);
}

/// Two custom resources wait for their CRD without any annotation
#[test]
fn test_crd_and_two_custom_resources() {
    let batch = vec![
        DocumentBuilder::new("example.com/v1", "Widget", "one").namespace("web").build(),
        DocumentBuilder::new("apiextensions.k8s.io/v1", "CustomResourceDefinition", "widgets.example.com")
            .field(
                "spec",
                serde_json::json!({"group": "example.com", "scope": "Namespaced", "names": {"kind": "Widget", "plural": "widgets"}}),
            )
            .build(),
        DocumentBuilder::new("example.com/v1", "Widget", "two").namespace("web").build(),
    ];

    let waves = sort_objs(batch).unwrap();
    assert_eq!(
        ids(&waves),
        vec![
            vec![ObjectId::new("apiextensions.k8s.io", "CustomResourceDefinition", "", "widgets.example.com")],
            vec![ObjectId::new("example.com", "Widget", "web", "one"), ObjectId::new("example.com", "Widget", "web", "two")],
        ]
    );
}

#[test]
fn test_three_object_cycle_names_every_edge() {
    let a = ObjectId::new("", "ConfigMap", "web", "a");
    let b = ObjectId::new("", "ConfigMap", "web", "b");
    let c = ObjectId::new("", "ConfigMap", "web", "c");

    let mut graph = DependencyGraph::new();
    graph.add_edge(a.clone(), b.clone());
    graph.add_edge(b.clone(), c.clone());
    graph.add_edge(c.clone(), a.clone());

    match graph.sort() {
        Err(GraphError::CyclicDependency {
            mut edges,
        }) => {
            edges.sort();
            let mut expected = vec![Edge::new(a.clone(), b.clone()), Edge::new(b, c.clone()), Edge::new(c, a)];
            expected.sort();
            assert_eq!(edges, expected);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

/// Objects outside the cycle are not part of the report
#[test]
fn test_cycle_report_excludes_sorted_objects() {
    let mut batch = BatchFixture::cycle().documents();
    batch.push(DocumentBuilder::new("v1", "Secret", "standalone").namespace("web").build());

    let err = sort_objs(batch).unwrap_err();
    match err {
        GraphError::CyclicDependency {
            edges,
        } => {
            assert_eq!(edges.len(), 2);
            assert!(edges.iter().all(|edge| edge.from.kind == "ConfigMap" && edge.to.kind == "ConfigMap"));
        }
        other => panic!("expected a cycle, got {other}"),
    }
}

#[test]
fn test_reverse_sort_mirrors_sort() {
    let forward = ids(&sort_objs(BatchFixture::crd_with_resource().documents()).unwrap());
    let mut reverse = ids(&reverse_sort_objs(BatchFixture::crd_with_resource().documents()).unwrap());

    reverse.reverse();
    for wave in &mut reverse {
        wave.reverse();
    }
    assert_eq!(reverse, forward);
}
