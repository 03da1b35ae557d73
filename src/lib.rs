//! kwave - apply ordering and apply-time mutation for Kubernetes resources
//!
//! kwave takes a batch of resource documents that are meant to be applied
//! together and answers two questions:
//!
//! 1. **In which order?** Objects are grouped into waves. Every object in a
//!    wave depends only on objects of earlier waves, so a wave can be applied
//!    as a unit once its predecessors are ready.
//! 2. **With which values?** Right before an object is applied, fields of it
//!    can be filled from fields of objects applied earlier, as declared by its
//!    `config.kubernetes.io/apply-time-mutation` annotation.
//!
//! # Architecture Overview
//!
//! Documents are plain JSON-like trees. Dependencies come from annotations
//! (`config.kubernetes.io/depends-on` and the sources of apply-time
//! mutations) and from implicit relationships inside the batch: namespaced
//! objects need their `Namespace`, custom resources their
//! `CustomResourceDefinition`, Gatekeeper constraints their
//! `ConstraintTemplate`.
//!
//! Cluster access is abstracted behind the traits of [`cluster`], so the
//! ordering and mutation logic never talks to an API server directly. The
//! bundled implementations work entirely in memory, which is what the CLI
//! uses.
//!
//! # Core Modules
//!
//! - [`core`] - object identity, documents, crate-level errors
//! - [`jsonpath`] - restricted path expressions for reading and writing fields
//! - [`annotations`] - codecs for the two directive annotations
//! - [`graph`] - dependency graph and wave sorting
//! - [`mutator`] - namespace defaulter and apply-time mutator
//! - [`cluster`] - collaborator traits and in-memory implementations
//! - [`config`] - user configuration file (`~/.kwave/config.toml`)
//! - [`cli`] - the `kwave` command line
//! - [`constants`] - annotation keys and well-known groups and kinds
//!
//! # Annotation Format
//!
//! ```yaml
//! apiVersion: apps/v1
//! kind: Deployment
//! metadata:
//!   name: api
//!   namespace: web
//!   annotations:
//!     config.kubernetes.io/depends-on: /namespaces/web/Secret/db-credentials
//!     config.kubernetes.io/apply-time-mutation: |
//!       - sourceRef:
//!           kind: Service
//!           name: db
//!         sourcePath: $.spec.clusterIP
//!         targetPath: $.spec.template.spec.containers[0].env[0].value
//!         token: ${db-ip}
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use kwave_cli::core::load_documents;
//! use kwave_cli::graph::sort_objs;
//!
//! # fn example(yaml: &str) -> anyhow::Result<()> {
//! let waves = sort_objs(load_documents(yaml)?)?;
//! for (i, wave) in waves.iter().enumerate() {
//!     println!("wave {}: {} objects", i + 1, wave.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod annotations;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod core;
pub mod graph;
pub mod jsonpath;
pub mod mutator;

// test_utils is available for tests and when the test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
