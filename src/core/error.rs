//! Error handling for kwave
//!
//! Each subsystem owns a precise error enum ([`GraphError`], [`MutationError`],
//! [`AnnotationError`], [`PathError`]). This module adds the crate-level
//! [`KwaveError`] that wraps them together with the file and codec failures
//! seen at the edges, and [`ErrorContext`], which decorates an error with
//! details and a suggestion for display in the terminal.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kwave_cli::core::{ErrorContext, KwaveError, user_friendly_error};
//!
//! let context = ErrorContext::new(KwaveError::NoDocuments)
//!     .with_suggestion("Pass at least one YAML file containing resources")
//!     .with_details("Empty documents and bare '---' separators are skipped");
//! context.display();
//!
//! // Or derive details and suggestions from any error
//! let context = user_friendly_error(anyhow::anyhow!("something failed"));
//! eprintln!("{context}");
//! ```
//!
//! [`GraphError`]: crate::graph::GraphError
//! [`MutationError`]: crate::mutator::MutationError
//! [`AnnotationError`]: crate::annotations::AnnotationError
//! [`PathError`]: crate::jsonpath::PathError

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::annotations::AnnotationError;
use crate::graph::GraphError;
use crate::jsonpath::PathError;
use crate::mutator::MutationError;

/// Crate-level error type.
#[derive(Error, Debug)]
pub enum KwaveError {
    /// Building or sorting the dependency graph failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A mutator failed
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// A directive annotation is invalid
    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    /// A path expression is invalid
    #[error(transparent)]
    Path(#[from] PathError),

    /// An input file does not exist
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was given
        path: String,
    },

    /// An input file is not valid YAML or JSON
    #[error("Failed to parse resources in {path}: {source}")]
    DocumentParse {
        /// File being parsed
        path: String,
        /// Decoder failure
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration file is not valid TOML
    #[error("Invalid configuration file {path}: {source}")]
    ConfigParse {
        /// Config file path
        path: String,
        /// Decoder failure
        #[source]
        source: toml::de::Error,
    },

    /// The inputs held no resource documents
    #[error("No resources found in the given files")]
    NoDocuments,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Message
        message: String,
    },
}

/// An error decorated for the terminal.
///
/// `details` explain what happened, `suggestion` says what to do about it.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: KwaveError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap `error` without details or suggestion.
    #[must_use]
    pub const fn new(error: KwaveError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Context carrying only a suggestion.
    pub fn suggestion(suggestion: impl Into<String>) -> Self {
        Self::new(KwaveError::Other {
            message: String::new(),
        })
        .with_suggestion(suggestion)
    }

    /// Add a suggestion, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}
