/*
 * observer.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Chain observer for tracing and progress reporting.
 */

//! Observer abstraction for chain execution events.
//!
//! The chain reports what it does through a [`ChainObserver`] handed to it
//! at construction, rather than through global state. [`TracingObserver`]
//! forwards events to `tracing`; [`NoopObserver`] drops them.

use crate::action::PreprocessorAction;
use crate::error::PipelineError;

/// Observer for chain execution events.
///
/// All methods have empty default implementations, allowing observers
/// to implement only the events they care about.
pub trait ChainObserver: Send + Sync {
    /// Called before the first stage runs.
    fn on_chain_start(&self, _total_stages: usize, _input_tokens: usize) {}

    /// Called when a stage begins its pass over the stream.
    fn on_stage_start(&self, _name: &str, _index: usize, _total: usize) {}

    /// Called for every action that changes the stream.
    ///
    /// `position` is the index of the current token in the stage's input.
    fn on_action(&self, _name: &str, _position: usize, _action: &PreprocessorAction) {}

    /// Called when a stage has processed its whole input.
    fn on_stage_complete(&self, _name: &str, _index: usize, _output_tokens: usize) {}

    /// Called when a stage fails.
    fn on_stage_error(&self, _name: &str, _index: usize, _error: &PipelineError) {}

    /// Called when every stage has completed.
    fn on_chain_complete(&self, _output_tokens: usize) {}

    /// Called when the chain aborts.
    fn on_chain_error(&self, _error: &PipelineError) {}
}

/// No-op observer implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ChainObserver for NoopObserver {}

/// Observer that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ChainObserver for TracingObserver {
    fn on_chain_start(&self, total_stages: usize, input_tokens: usize) {
        tracing::debug!(
            total_stages = total_stages,
            input_tokens = input_tokens,
            "Starting preprocessor chain"
        );
    }

    fn on_stage_start(&self, name: &str, index: usize, total: usize) {
        tracing::debug!(
            stage.name = name,
            stage.index = index,
            stage.total = total,
            "Starting preprocessor"
        );
    }

    fn on_action(&self, name: &str, position: usize, action: &PreprocessorAction) {
        tracing::trace!(
            stage.name = name,
            position = position,
            deletions = action.deletions(),
            injected_tokens = action.tokens().len(),
            injected_trivia = action.trivia().len(),
            "Applying preprocessor action"
        );
    }

    fn on_stage_complete(&self, name: &str, index: usize, output_tokens: usize) {
        tracing::debug!(
            stage.name = name,
            stage.index = index,
            output_tokens = output_tokens,
            "Completed preprocessor"
        );
    }

    fn on_stage_error(&self, name: &str, index: usize, error: &PipelineError) {
        tracing::error!(
            stage.name = name,
            stage.index = index,
            error = %error,
            "Preprocessor failed"
        );
    }

    fn on_chain_complete(&self, output_tokens: usize) {
        tracing::debug!(output_tokens = output_tokens, "Preprocessor chain completed");
    }

    fn on_chain_error(&self, error: &PipelineError) {
        tracing::error!(error = %error, "Preprocessor chain failed");
    }
}
