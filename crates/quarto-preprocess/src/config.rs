/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Chain configuration.
 */

//! Configuration for a [`crate::PreprocessorChain`].
//!
//! Configuration is passed to the chain explicitly. It can be built in code
//! or read from a TOML table:
//!
//! ```toml
//! trace-actions = true
//! keep-deleted-trivia = false
//! max-injected-tokens = 10000
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ChainConfig {
    /// Log every action that changes the stream at trace level
    pub trace_actions: bool,

    /// Move the trivia of deleted tokens onto the next token written, so
    /// that comments survive the deletion of the token they precede
    pub keep_deleted_trivia: bool,

    /// Upper bound on the tokens a single stage may inject in one run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_injected_tokens: Option<usize>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            trace_actions: false,
            keep_deleted_trivia: true,
            max_injected_tokens: None,
        }
    }
}

impl ChainConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(source)?)
    }
}
