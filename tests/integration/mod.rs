//! Integration test suite for kwave
//!
//! End-to-end tests that run the `kwave` binary against resource files in a
//! temporary directory.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **sort**: wave output of `kwave sort` in every format
//! - **validate**: error reporting and exit status of `kwave validate`
//! - **mutate**: offline apply simulation with `kwave mutate`
//! - **config**: configuration file and `--config` handling

mod common;
mod mutate;
mod sort;
mod validate;
