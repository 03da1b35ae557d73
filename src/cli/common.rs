//! Helpers shared by the commands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use crate::cluster::{StaticTypeResolver, TypeResolver};
use crate::config::{KwaveConfig, OutputFormat};
use crate::core::{Document, KwaveError, load_documents};
use crate::mutator::{MutationContext, Mutator, NamespaceDefaulter, mutate_all};

/// File name standing for standard input.
pub const STDIN_PATH: &str = "-";

/// Load every document from `paths`, in order.
///
/// Each file may hold several `---` separated YAML or JSON documents. `-`
/// reads standard input.
pub async fn load_inputs(paths: &[PathBuf]) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for path in paths {
        let loaded = load_file(path).await?;
        tracing::debug!(target: "cli", "loaded {} documents from {}", loaded.len(), path.display());
        documents.extend(loaded);
    }

    if documents.is_empty() {
        return Err(KwaveError::NoDocuments.into());
    }
    Ok(documents)
}

async fn load_file(path: &Path) -> Result<Vec<Document>> {
    let content = if path == Path::new(STDIN_PATH) {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read resources from standard input")?;
        content
    } else {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(KwaveError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    load_documents(&content).map_err(|source| {
        KwaveError::DocumentParse {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

/// Type resolver knowing the built-in kinds, the configured `[[types]]` and
/// every CRD or constraint template in `documents`.
pub fn build_resolver(config: &KwaveConfig, documents: &[Document]) -> Arc<dyn TypeResolver> {
    let mut resolver = StaticTypeResolver::new();
    config.register_types(&mut resolver);
    let learned = resolver.learn_from(documents);
    tracing::debug!(target: "cli", "type resolver knows {} types ({} from inputs)", resolver.len(), learned);
    Arc::new(resolver)
}

/// Run the namespace defaulter over the whole batch.
///
/// Graph edges are derived from source references, so implicit namespaces
/// must be filled in before sorting.
pub async fn default_namespaces(resolver: Arc<dyn TypeResolver>, documents: &mut [Document]) -> Result<()> {
    let mutators: Vec<Box<dyn Mutator>> = vec![Box::new(NamespaceDefaulter::new(resolver))];
    let applied = mutate_all(&MutationContext::background(), documents, &mutators).await?;
    if !applied.is_empty() {
        tracing::debug!(target: "cli", "defaulted source namespaces in {} documents", applied.len());
    }
    Ok(())
}

/// Pick the output format: flag, then config file, then `fallback`.
pub fn output_format(flag: Option<OutputFormat>, config: &KwaveConfig, fallback: OutputFormat) -> OutputFormat {
    flag.or(config.output.format).unwrap_or(fallback)
}
