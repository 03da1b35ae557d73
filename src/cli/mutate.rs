//! Simulate an apply of a batch, offline.
//!
//! The batch is ordered into waves, then each wave is mutated and
//! "applied": the namespace defaulter and the apply-time mutator run over
//! every document of the wave, and the mutated documents are published so
//! that later waves can read them as substitution sources. Nothing is sent
//! to a cluster.
//!
//! ```bash
//! kwave mutate app.yaml                  # mutated documents as YAML
//! kwave mutate --format json app.yaml    # ... as a JSON array
//! kwave mutate --format text app.yaml    # only list what changed
//! ```
//!
//! Ctrl-C cancels a run at the next source lookup.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use super::common::{build_resolver, default_namespaces, load_inputs, output_format};
use crate::cluster::{BatchReader, MemoryResourceCache, PresenceStatusEvaluator, TypeResolver};
use crate::config::{KwaveConfig, OutputFormat};
use crate::core::{Document, to_yaml_stream};
use crate::graph::sort_objs;
use crate::mutator::{AppliedMutation, ApplyTimeMutator, MutationContext, Mutator, NamespaceDefaulter, mutate_all};

/// Arguments of `kwave mutate`.
#[derive(Args, Debug)]
pub struct MutateCommand {
    /// Resource files (YAML or JSON, `-` for stdin)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Output format (default: yaml)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Do not share fetched sources between waves
    #[arg(long)]
    pub no_cache: bool,
}

/// Result of a simulated apply.
#[derive(Debug)]
pub struct MutationRun {
    /// Mutated documents, grouped by wave
    pub waves: Vec<Vec<Document>>,
    /// Changes, in application order, tagged with their 1-based wave
    pub applied: Vec<(usize, AppliedMutation)>,
}

impl MutateCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs cannot be loaded or ordered, or if any
    /// substitution fails.
    pub async fn execute(self, config: &KwaveConfig) -> Result<()> {
        let documents = load_inputs(&self.files).await?;
        let resolver = build_resolver(config, &documents);

        let (ctx, cancel) = MutationContext::new();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!(target: "cli", "interrupted, cancelling");
                cancel.cancel();
            }
        });

        let use_cache = config.mutate.cache && !self.no_cache;
        let run = run_waves(&ctx, resolver, documents, use_cache).await?;

        match output_format(self.format, config, OutputFormat::Yaml) {
            OutputFormat::Yaml => {
                let ordered: Vec<Document> = run.waves.into_iter().flatten().collect();
                print!("{}", to_yaml_stream(&ordered)?);
            }
            OutputFormat::Json => {
                let ordered: Vec<Document> = run.waves.into_iter().flatten().collect();
                println!("{}", serde_json::to_string_pretty(&ordered)?);
            }
            OutputFormat::Text => {
                if run.applied.is_empty() {
                    println!("No documents changed");
                }
                for (wave, change) in &run.applied {
                    println!("{} {} ({})", format!("wave {wave}:").bold(), change.id, change.mutator.cyan());
                    println!("  {}", change.reason);
                }
            }
        }
        Ok(())
    }
}

/// Order `documents` and mutate them wave by wave.
///
/// Each wave is published to an in-memory reader after mutation, so sources
/// are always read in their final, mutated form.
///
/// # Errors
///
/// Returns the first graph or mutation error.
pub async fn run_waves(
    ctx: &MutationContext,
    resolver: Arc<dyn TypeResolver>,
    mut documents: Vec<Document>,
    use_cache: bool,
) -> Result<MutationRun> {
    default_namespaces(resolver.clone(), &mut documents).await?;
    let waves = sort_objs(documents)?;

    let reader = Arc::new(BatchReader::new());
    let mut apply_time = ApplyTimeMutator::new(resolver.clone(), reader.clone(), Arc::new(PresenceStatusEvaluator));
    if use_cache {
        apply_time = apply_time.with_cache(Arc::new(MemoryResourceCache::new()));
    }
    let mutators: Vec<Box<dyn Mutator>> = vec![Box::new(NamespaceDefaulter::new(resolver)), Box::new(apply_time)];

    let mut applied = Vec::new();
    let mut done = Vec::with_capacity(waves.len());
    for (i, mut wave) in waves.into_iter().enumerate() {
        tracing::info!(target: "cli", "wave {}: mutating {} objects", i + 1, wave.len());
        let changes = mutate_all(ctx, &mut wave, &mutators).await?;
        applied.extend(changes.into_iter().map(|change| (i + 1, change)));
        reader.publish_all(wave.iter().cloned());
        done.push(wave);
    }

    Ok(MutationRun {
        waves: done,
        applied,
    })
}
