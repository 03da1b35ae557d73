//! Global constants used throughout the kwave codebase.
//!
//! Annotation keys, well-known API groups and kinds, and the fixed text
//! reported by mutators. Defining them centrally keeps the graph, the
//! mutators and the CLI agreeing on the same names.

/// Annotation carrying explicit dependencies of an object.
///
/// Value is a comma-separated list of object references, each either
/// `group/kind/name` (cluster-scoped) or `group/namespaces/namespace/kind/name`.
pub const DEPENDS_ON_ANNOTATION: &str = "config.kubernetes.io/depends-on";

/// Annotation carrying the apply-time field substitutions of an object.
///
/// Value is a YAML or JSON list of substitution records.
pub const APPLY_TIME_MUTATION_ANNOTATION: &str = "config.kubernetes.io/apply-time-mutation";

/// Path segment separating group from namespace in a namespaced object reference.
pub const NAMESPACES_SEGMENT: &str = "namespaces";

/// Kind of the core `Namespace` object.
pub const NAMESPACE_KIND: &str = "Namespace";

/// API group defining `CustomResourceDefinition`.
pub const CRD_GROUP: &str = "apiextensions.k8s.io";

/// Kind of a custom resource definition.
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// API group of Gatekeeper constraint templates.
pub const CONSTRAINT_TEMPLATE_GROUP: &str = "templates.gatekeeper.sh";

/// Kind of a Gatekeeper constraint template.
pub const CONSTRAINT_TEMPLATE_KIND: &str = "ConstraintTemplate";

/// API group every Gatekeeper constraint kind is served under.
pub const CONSTRAINT_GROUP: &str = "constraints.gatekeeper.sh";

/// Reason reported by the apply-time mutator when a document was changed.
pub const APPLY_TIME_MUTATION_REASON: &str =
    "resource contained annotation: config.kubernetes.io/apply-time-mutation";

/// Reason reported by the namespace defaulter when it rewrote the annotation.
pub const NAMESPACE_DEFAULT_REASON: &str =
    "defaulted source namespaces in annotation: config.kubernetes.io/apply-time-mutation";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "KWAVE_CONFIG";
