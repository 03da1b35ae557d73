//! Print the apply waves of a batch.
//!
//! ```bash
//! kwave sort app.yaml crds.yaml
//! kwave sort --reverse --format json app.yaml
//! ```
//!
//! Text output lists one wave per block:
//!
//! ```text
//! Wave 1 (1 object)
//!   /Namespace/web
//! Wave 2 (2 objects)
//!   /namespaces/web/Secret/db
//!   /namespaces/web/ConfigMap/settings
//! ```
//!
//! `--format json` prints an array of waves, each an array of object
//! references. `--format yaml` prints the documents themselves, in apply
//! order, as one YAML stream.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

use super::common::{build_resolver, default_namespaces, load_inputs, output_format};
use crate::config::{KwaveConfig, OutputFormat};
use crate::core::{Document, to_yaml_stream};
use crate::graph::{reverse_sort_objs, sort_objs};

/// Arguments of `kwave sort`.
#[derive(Args, Debug)]
pub struct SortCommand {
    /// Resource files (YAML or JSON, `-` for stdin)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Print deletion order instead: last wave first
    #[arg(short, long)]
    pub reverse: bool,

    /// Output format (default: text)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl SortCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs cannot be loaded, a mutation annotation
    /// is malformed, or the batch cannot be ordered.
    pub async fn execute(self, config: &KwaveConfig) -> Result<()> {
        let mut documents = load_inputs(&self.files).await?;
        let resolver = build_resolver(config, &documents);
        default_namespaces(resolver, &mut documents).await?;

        let waves = if self.reverse {
            reverse_sort_objs(documents)?
        } else {
            sort_objs(documents)?
        };

        print!("{}", render(&waves, output_format(self.format, config, OutputFormat::Text))?);
        Ok(())
    }
}

fn render(waves: &[Vec<Document>], format: OutputFormat) -> Result<String> {
    let out = match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (i, wave) in waves.iter().enumerate() {
                let noun = if wave.len() == 1 {
                    "object"
                } else {
                    "objects"
                };
                out.push_str(&format!("{} ({} {noun})\n", format!("Wave {}", i + 1).bold(), wave.len()));
                for document in wave {
                    out.push_str(&format!("  {}\n", document.id()));
                }
            }
            out
        }
        OutputFormat::Json => {
            let ids: Vec<Vec<String>> =
                waves.iter().map(|wave| wave.iter().map(|doc| doc.id().to_string()).collect()).collect();
            format!("{}\n", serde_json::to_string_pretty(&json!(ids))?)
        }
        OutputFormat::Yaml => {
            let ordered: Vec<Document> = waves.iter().flatten().cloned().collect();
            to_yaml_stream(&ordered)?
        }
    };
    Ok(out)
}
