//! In-process type resolver.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{ResolveError, Scope, TypeMapping, TypeResolver};
use crate::constants::{
    CONSTRAINT_GROUP, CONSTRAINT_TEMPLATE_GROUP, CONSTRAINT_TEMPLATE_KIND, CRD_GROUP, CRD_KIND,
};
use crate::core::{Document, GroupKind};

/// Built-in types as `(group, kind, resource, namespaced)`.
const BUILTIN_TYPES: &[(&str, &str, &str, bool)] = &[
    ("", "ConfigMap", "configmaps", true),
    ("", "Endpoints", "endpoints", true),
    ("", "Event", "events", true),
    ("", "LimitRange", "limitranges", true),
    ("", "Namespace", "namespaces", false),
    ("", "Node", "nodes", false),
    ("", "PersistentVolume", "persistentvolumes", false),
    ("", "PersistentVolumeClaim", "persistentvolumeclaims", true),
    ("", "Pod", "pods", true),
    ("", "ReplicationController", "replicationcontrollers", true),
    ("", "ResourceQuota", "resourcequotas", true),
    ("", "Secret", "secrets", true),
    ("", "Service", "services", true),
    ("", "ServiceAccount", "serviceaccounts", true),
    ("admissionregistration.k8s.io", "MutatingWebhookConfiguration", "mutatingwebhookconfigurations", false),
    ("admissionregistration.k8s.io", "ValidatingWebhookConfiguration", "validatingwebhookconfigurations", false),
    ("apiextensions.k8s.io", "CustomResourceDefinition", "customresourcedefinitions", false),
    ("apiregistration.k8s.io", "APIService", "apiservices", false),
    ("apps", "ControllerRevision", "controllerrevisions", true),
    ("apps", "DaemonSet", "daemonsets", true),
    ("apps", "Deployment", "deployments", true),
    ("apps", "ReplicaSet", "replicasets", true),
    ("apps", "StatefulSet", "statefulsets", true),
    ("autoscaling", "HorizontalPodAutoscaler", "horizontalpodautoscalers", true),
    ("batch", "CronJob", "cronjobs", true),
    ("batch", "Job", "jobs", true),
    ("coordination.k8s.io", "Lease", "leases", true),
    ("discovery.k8s.io", "EndpointSlice", "endpointslices", true),
    ("networking.k8s.io", "Ingress", "ingresses", true),
    ("networking.k8s.io", "IngressClass", "ingressclasses", false),
    ("networking.k8s.io", "NetworkPolicy", "networkpolicies", true),
    ("policy", "PodDisruptionBudget", "poddisruptionbudgets", true),
    ("rbac.authorization.k8s.io", "ClusterRole", "clusterroles", false),
    ("rbac.authorization.k8s.io", "ClusterRoleBinding", "clusterrolebindings", false),
    ("rbac.authorization.k8s.io", "Role", "roles", true),
    ("rbac.authorization.k8s.io", "RoleBinding", "rolebindings", true),
    ("scheduling.k8s.io", "PriorityClass", "priorityclasses", false),
    ("storage.k8s.io", "StorageClass", "storageclasses", false),
    ("templates.gatekeeper.sh", "ConstraintTemplate", "constrainttemplates", false),
];

#[derive(Debug, Clone)]
struct TypeEntry {
    mapping: TypeMapping,
    /// Served versions; empty accepts any version.
    versions: Vec<String>,
}

/// Type resolver backed by a fixed table.
///
/// Starts with the common built-in Kubernetes types. More can be registered
/// directly, or learnt from `CustomResourceDefinition` and Gatekeeper
/// `ConstraintTemplate` documents so that custom kinds defined in the same
/// batch resolve before they are registered in a cluster.
#[derive(Debug, Clone)]
pub struct StaticTypeResolver {
    types: HashMap<GroupKind, TypeEntry>,
}

impl Default for StaticTypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticTypeResolver {
    /// Create a resolver that knows no type.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Create a resolver preloaded with the built-in types.
    pub fn new() -> Self {
        let mut resolver = Self::empty();
        for &(group, kind, resource, namespaced) in BUILTIN_TYPES {
            let scope = if namespaced {
                Scope::Namespaced
            } else {
                Scope::Cluster
            };
            resolver.register(GroupKind::new(group, kind), TypeMapping::new(scope, resource));
        }
        resolver
    }

    /// Register a type, serving any version.
    pub fn register(&mut self, group_kind: GroupKind, mapping: TypeMapping) {
        self.register_versions(group_kind, mapping, Vec::new());
    }

    /// Register a type served only at `versions`.
    pub fn register_versions(&mut self, group_kind: GroupKind, mapping: TypeMapping, versions: Vec<String>) {
        self.types.insert(
            group_kind,
            TypeEntry {
                mapping,
                versions,
            },
        );
    }

    /// Register every type defined by definitions among `documents`.
    ///
    /// Returns how many types were registered.
    pub fn learn_from(&mut self, documents: &[Document]) -> usize {
        let mut learnt = 0;
        for document in documents {
            let id = document.id();
            let defined = if id.group == CRD_GROUP && id.kind == CRD_KIND {
                crd_type(document)
            } else if id.group == CONSTRAINT_TEMPLATE_GROUP && id.kind == CONSTRAINT_TEMPLATE_KIND {
                constraint_type(document)
            } else {
                None
            };

            if let Some((group_kind, mapping, versions)) = defined {
                debug!(target: "mutator", "learnt type {} ({}) from {}", group_kind, mapping.resource, id);
                self.register_versions(group_kind, mapping, versions);
                learnt += 1;
            }
        }
        learnt
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is known.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for StaticTypeResolver {
    fn resolve(&self, group_kind: &GroupKind, version: Option<&str>) -> Result<TypeMapping, ResolveError> {
        let no_match = || ResolveError::NoMatch {
            group_kind: group_kind.clone(),
            version: version.map(str::to_string),
        };

        let entry = self.types.get(group_kind).ok_or_else(no_match)?;
        match version {
            Some(v) if !entry.versions.is_empty() && !entry.versions.iter().any(|served| served == v) => {
                Err(no_match())
            }
            _ => Ok(entry.mapping.clone()),
        }
    }
}

fn crd_type(document: &Document) -> Option<(GroupKind, TypeMapping, Vec<String>)> {
    let group = document.str_at(&["spec", "group"])?;
    let kind = document.str_at(&["spec", "names", "kind"])?;
    let resource = document
        .str_at(&["spec", "names", "plural"])
        .map_or_else(|| default_plural(kind), str::to_string);
    let scope = match document.str_at(&["spec", "scope"]) {
        Some("Cluster") => Scope::Cluster,
        _ => Scope::Namespaced,
    };

    let spec = &document.value()["spec"];
    let mut versions: Vec<String> = spec["versions"]
        .as_array()
        .map(|list| list.iter().filter_map(|v| v["name"].as_str()).map(str::to_string).collect())
        .unwrap_or_default();
    if let Some(Value::String(version)) = spec.get("version")
        && !versions.contains(version)
    {
        versions.push(version.clone());
    }

    Some((GroupKind::new(group, kind), TypeMapping::new(scope, resource), versions))
}

fn constraint_type(document: &Document) -> Option<(GroupKind, TypeMapping, Vec<String>)> {
    let kind = document.str_at(&["spec", "crd", "spec", "names", "kind"])?;
    Some((
        GroupKind::new(CONSTRAINT_GROUP, kind),
        TypeMapping::new(Scope::Cluster, kind.to_lowercase()),
        Vec::new(),
    ))
}

fn default_plural(kind: &str) -> String {
    format!("{}s", kind.to_lowercase())
}
