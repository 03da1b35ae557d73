//! Check that a batch can be ordered.
//!
//! Every problem is reported at once: references to objects outside the
//! batch, repeated `depends-on` entries, malformed annotations and cycles.
//! The exit status is 1 when there is any.
//!
//! # Output Formats
//!
//! ## Text Format (Default)
//! ```text
//! ✓ 5 objects, 4 dependencies, 3 waves
//! ```
//!
//! ## JSON Format
//! ```json
//! {
//!   "valid": false,
//!   "objects": 2,
//!   "dependencies": 1,
//!   "waves": 0,
//!   "errors": ["external dependency: /namespaces/web/Pod/app -> /namespaces/web/Secret/db: dependency not found in the apply set"]
//! }
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{build_resolver, default_namespaces, load_inputs, output_format};
use crate::config::{KwaveConfig, OutputFormat};
use crate::core::Document;
use crate::graph::{GraphError, build_graph};

/// Arguments of `kwave validate`.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Resource files (YAML or JSON, `-` for stdin)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Output format: text or json
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Summary printed by `--format json`.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct ValidationReport {
    valid: bool,
    objects: usize,
    dependencies: usize,
    waves: usize,
    errors: Vec<String>,
}

impl ValidateCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns the aggregated [`GraphError`] when the batch is invalid, or an
    /// error if the inputs cannot be loaded.
    pub async fn execute(self, config: &KwaveConfig) -> Result<()> {
        let mut documents = load_inputs(&self.files).await?;
        let resolver = build_resolver(config, &documents);
        default_namespaces(resolver, &mut documents).await?;

        let (report, error) = validate(&documents);

        match output_format(self.format, config, OutputFormat::Text) {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            _ => {
                if report.valid {
                    println!(
                        "{} {} objects, {} dependencies, {} waves",
                        "✓".green(),
                        report.objects,
                        report.dependencies,
                        report.waves
                    );
                }
            }
        }

        match error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

fn validate(documents: &[Document]) -> (ValidationReport, Option<GraphError>) {
    let (graph, mut errors) = build_graph(documents);

    let waves = match graph.sort() {
        Ok(waves) => waves.len(),
        Err(err) => {
            errors.push(err);
            0
        }
    };
    let error = GraphError::aggregate(errors);

    let report = ValidationReport {
        valid: error.is_none(),
        objects: graph.node_count(),
        dependencies: graph.edge_count(),
        waves: if error.is_none() {
            waves
        } else {
            0
        },
        errors: error
            .as_ref()
            .map(|err| err.leaves().iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
    };
    (report, error)
}
