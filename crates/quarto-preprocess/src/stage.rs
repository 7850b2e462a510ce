/*
 * stage.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Preprocessor trait definition.
 */

//! The preprocessor stage contract.
//!
//! Without preprocessors, tokens flow straight from the lexer to the parser.
//! Preprocessors sit in between and can be chained; each one sees the
//! stream produced by the one before it:
//!
//! ```text
//! source -> lexer -> preprocessor 1 -> ... -> preprocessor N -> parser
//! ```

use std::sync::Arc;

use crate::action::PreprocessorAction;
use crate::error::PreprocessorError;
use crate::token::Token;

/// A stage that rewrites a token stream by injection and deletion.
///
/// The chain calls [`Preprocessor::init`] once at the start of every run,
/// then [`Preprocessor::process`] once per remaining position of the stage's
/// input. For a no-op stage after a lexer that produced `a b c EOF`,
/// `process` is called four times, with:
///
/// 1. `a b c EOF`
/// 2. `b c EOF`
/// 3. `c EOF`
/// 4. `EOF`
///
/// Because the whole remainder is visible, a stage can look ahead as far as
/// it needs, including running a parser over the rest of the input. State
/// about earlier tokens lives in the stage itself and is reset by `init`.
///
/// The token slice is read-only: changes are requested only through the
/// returned [`PreprocessorAction`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use quarto_preprocess::{Preprocessor, PreprocessorAction, PreprocessorError, Token};
///
/// /// Drops every `;;` token.
/// struct DropDoubleSemicolons;
///
/// impl Preprocessor for DropDoubleSemicolons {
///     fn name(&self) -> &str {
///         "drop-double-semicolons"
///     }
///
///     fn process(&mut self, tokens: &[Arc<Token>]) -> Result<PreprocessorAction, PreprocessorError> {
///         if tokens[0].value() == ";;" {
///             return Ok(PreprocessorAction::delete(1));
///         }
///         Ok(PreprocessorAction::NO_OPERATION)
///     }
/// }
/// ```
pub trait Preprocessor {
    /// Human-readable name for logging and error messages.
    fn name(&self) -> &str;

    /// Reset state before a run. Does nothing by default.
    fn init(&mut self) {}

    /// Decide what to do at the first token of `tokens`.
    ///
    /// `tokens` is never empty and always ends with the end-of-stream token.
    fn process(&mut self, tokens: &[Arc<Token>]) -> Result<PreprocessorAction, PreprocessorError>;
}

impl<P: Preprocessor + ?Sized> Preprocessor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self) {
        (**self).init()
    }

    fn process(&mut self, tokens: &[Arc<Token>]) -> Result<PreprocessorAction, PreprocessorError> {
        (**self).process(tokens)
    }
}

/// Where a stage is in its lifecycle within the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// `init` has not been called yet
    Uninitialized,
    /// Initialized, no token processed yet
    Ready,
    /// Called on at least one position, remainder not exhausted
    Processing,
    /// The end-of-stream token has been processed
    Done,
    /// The stage failed or returned an invalid action
    Failed,
}

/// A preprocessor built from a closure.
///
/// Created by [`from_fn`].
pub struct FnPreprocessor<F> {
    name: String,
    process: F,
}

/// Build a preprocessor from a closure; captured state is not reset by `init`.
pub fn from_fn<F>(name: impl Into<String>, process: F) -> FnPreprocessor<F>
where
    F: FnMut(&[Arc<Token>]) -> Result<PreprocessorAction, PreprocessorError>,
{
    FnPreprocessor {
        name: name.into(),
        process,
    }
}

impl<F> Preprocessor for FnPreprocessor<F>
where
    F: FnMut(&[Arc<Token>]) -> Result<PreprocessorAction, PreprocessorError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, tokens: &[Arc<Token>]) -> Result<PreprocessorAction, PreprocessorError> {
        (self.process)(tokens)
    }
}

impl<F> std::fmt::Debug for FnPreprocessor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPreprocessor")
            .field("name", &self.name)
            .finish()
    }
}
