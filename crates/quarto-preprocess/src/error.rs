/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Preprocessor and chain error types.
 */

//! Error types for preprocessing.
//!
//! A stage reports its own failures as [`PreprocessorError`]. The chain
//! wraps them, and any action that breaks the stream contract, into a
//! [`PipelineError`]. Every `PipelineError` is fatal to the whole chain.

use thiserror::Error;

/// Error returned by a preprocessor stage.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PreprocessorError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PreprocessorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error caused by another error, e.g. a failed sub-parse.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Ways an action can break the stream contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("cannot delete {requested} tokens, only {remaining} remain")]
    DeletionOutOfRange { requested: usize, remaining: usize },

    #[error("the end-of-stream token cannot be deleted")]
    DeletesEndOfStream,

    #[error("end-of-stream tokens cannot be injected")]
    InjectsEndOfStream,

    #[error("injected {total} tokens, more than the limit of {limit}")]
    InjectionLimitExceeded { total: usize, limit: usize },
}

/// Error that aborts a preprocessor chain.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The token stream handed to the chain is malformed
    #[error("Invalid token stream: {0}")]
    InvalidInput(String),

    /// A stage returned an error
    #[error("Stage '{stage}' failed at token {position}: {source}")]
    StageFailed {
        stage: String,
        /// Index of the current token in the stage's input stream
        position: usize,
        #[source]
        source: PreprocessorError,
    },

    /// A stage returned an action that breaks the stream contract
    #[error("Stage '{stage}' returned an invalid action at token {position}: {reason}")]
    InvalidAction {
        stage: String,
        position: usize,
        reason: ActionError,
    },

    /// Chain configuration could not be read
    #[error("Invalid chain configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl PipelineError {
    /// Name of the stage that failed, if a stage failed.
    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::StageFailed { stage, .. } | PipelineError::InvalidAction { stage, .. } => {
                Some(stage)
            }
            _ => None,
        }
    }
}
