//! Edge construction from a batch of documents.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{DependencyGraph, GraphError};
use crate::annotations::{read_dependencies, read_substitutions};
use crate::constants::{
    CONSTRAINT_GROUP, CONSTRAINT_TEMPLATE_GROUP, CONSTRAINT_TEMPLATE_KIND, CRD_GROUP, CRD_KIND,
    NAMESPACE_KIND,
};
use crate::core::{Document, GroupKind, ObjectId};

/// Build the dependency graph of a batch.
///
/// Every document becomes a vertex, in batch order. Validation problems do
/// not stop construction; they are returned alongside the graph, already
/// grouped per object (see [`GraphError::Object`]) and in batch order.
pub fn build_graph(documents: &[Document]) -> (DependencyGraph, Vec<GraphError>) {
    let ids: Vec<ObjectId> = documents.iter().map(Document::id).collect();
    let members: HashSet<&ObjectId> = ids.iter().collect();

    let mut graph = DependencyGraph::new();
    for id in &ids {
        graph.add_vertex(id.clone());
    }

    let mut problems: Vec<Vec<GraphError>> = ids.iter().map(|_| Vec::new()).collect();

    // Mutation sources; several substitutions may share a source.
    for (i, document) in documents.iter().enumerate() {
        let from = &ids[i];
        match read_substitutions(document) {
            Ok(Some(substitutions)) => {
                let mut seen = HashSet::new();
                for substitution in substitutions {
                    let to = substitution.source_ref.to_object_id();
                    if !seen.insert(to.clone()) {
                        continue;
                    }
                    if members.contains(&to) {
                        debug!(target: "graph", "mutation edge {} -> {}", from, to);
                        graph.add_edge(from.clone(), to);
                    } else {
                        problems[i].push(GraphError::ExternalDependency {
                            from: from.clone(),
                            to,
                        });
                    }
                }
            }
            Ok(None) => {}
            Err(source) => problems[i].push(GraphError::Annotation {
                id: from.clone(),
                source,
            }),
        }
    }

    // Declared dependencies; repeats are reported.
    for (i, document) in documents.iter().enumerate() {
        let from = &ids[i];
        match read_dependencies(document) {
            Ok(dependencies) => {
                let mut seen = HashSet::new();
                for to in dependencies {
                    if !seen.insert(to.clone()) {
                        problems[i].push(GraphError::DuplicateDependency {
                            from: from.clone(),
                            to,
                        });
                        continue;
                    }
                    if members.contains(&to) {
                        debug!(target: "graph", "depends-on edge {} -> {}", from, to);
                        graph.add_edge(from.clone(), to);
                    } else {
                        problems[i].push(GraphError::ExternalDependency {
                            from: from.clone(),
                            to,
                        });
                    }
                }
            }
            Err(source) => problems[i].push(GraphError::Annotation {
                id: from.clone(),
                source,
            }),
        }
    }

    // Namespaces
    for from in &ids {
        if from.is_cluster_scoped() {
            continue;
        }
        let to = ObjectId::new("", NAMESPACE_KIND, "", from.namespace.clone());
        if members.contains(&to) {
            debug!(target: "graph", "namespace edge {} -> {}", from, to);
            graph.add_edge(from.clone(), to);
        }
    }

    // Custom resource definitions
    let definitions = index_definitions(documents, &ids, CRD_GROUP, CRD_KIND, |doc| {
        let group = doc.str_at(&["spec", "group"])?;
        let kind = doc.str_at(&["spec", "names", "kind"])?;
        Some(GroupKind::new(group, kind))
    });
    add_definition_edges(&mut graph, &ids, &definitions, "crd");

    // Constraint templates
    let templates =
        index_definitions(documents, &ids, CONSTRAINT_TEMPLATE_GROUP, CONSTRAINT_TEMPLATE_KIND, |doc| {
            let kind = doc.str_at(&["spec", "crd", "spec", "names", "kind"])?;
            Some(GroupKind::new(CONSTRAINT_GROUP, kind))
        });
    add_definition_edges(&mut graph, &ids, &templates, "constraint");

    let errors = ids
        .iter()
        .zip(problems)
        .filter_map(|(id, mut errors)| match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(GraphError::Object {
                id: id.clone(),
                errors,
            }),
        })
        .collect();

    (graph, errors)
}

/// Map each type defined in the batch to the identity of its definition.
fn index_definitions(
    documents: &[Document],
    ids: &[ObjectId],
    group: &str,
    kind: &str,
    defines: impl Fn(&Document) -> Option<GroupKind>,
) -> HashMap<GroupKind, ObjectId> {
    documents
        .iter()
        .zip(ids)
        .filter(|(_, id)| id.group == group && id.kind == kind)
        .filter_map(|(doc, id)| defines(doc).map(|gk| (gk, id.clone())))
        .collect()
}

fn add_definition_edges(
    graph: &mut DependencyGraph,
    ids: &[ObjectId],
    definitions: &HashMap<GroupKind, ObjectId>,
    label: &str,
) {
    if definitions.is_empty() {
        return;
    }
    for from in ids {
        if let Some(to) = definitions.get(&from.group_kind()) {
            debug!(target: "graph", "{} edge {} -> {}", label, from, to);
            graph.add_edge(from.clone(), to.clone());
        }
    }
}

/// Sort a batch into apply waves.
///
/// Validation problems and a cycle are all reported together. Objects that
/// share an identity travel together in the same wave.
pub fn sort_objs(documents: Vec<Document>) -> Result<Vec<Vec<Document>>, GraphError> {
    let (graph, mut errors) = build_graph(&documents);

    let waves = match graph.sort() {
        Ok(waves) => waves,
        Err(err) => {
            errors.push(err);
            Vec::new()
        }
    };
    if let Some(err) = GraphError::aggregate(errors) {
        return Err(err);
    }

    debug!(target: "graph", "sorted {} objects into {} waves", documents.len(), waves.len());

    let mut by_id: HashMap<ObjectId, Vec<Document>> = HashMap::new();
    for document in documents {
        by_id.entry(document.id()).or_default().push(document);
    }

    Ok(waves
        .into_iter()
        .map(|wave| wave.iter().flat_map(|id| by_id.remove(id).unwrap_or_default()).collect())
        .collect())
}

/// Sort a batch into teardown waves: [`sort_objs`] mirrored at both levels.
pub fn reverse_sort_objs(documents: Vec<Document>) -> Result<Vec<Vec<Document>>, GraphError> {
    let mut waves = sort_objs(documents)?;
    waves.reverse();
    for wave in &mut waves {
        wave.reverse();
    }
    Ok(waves)
}
