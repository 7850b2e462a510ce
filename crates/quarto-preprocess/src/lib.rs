/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Token-stream preprocessing between lexer and parser.
 */

//! Chained token preprocessors.
//!
//! A lexer produces a stream of [`Token`]s ending with the end-of-stream
//! token. Before the parser sees it, the stream can pass through any number
//! of [`Preprocessor`] stages, each of which may inject tokens and trivia or
//! delete tokens. Tokens keep the [`quarto_source_text::TextLocation`] they
//! were lexed at, so diagnostics still point into the original files.
//!
//! # Architecture
//!
//! - [`token`]: tokens, token types and trivia
//! - [`action`]: the edit a stage requests at one position
//! - [`stage`]: the [`Preprocessor`] trait and closure-based stages
//! - [`chain`]: the [`PreprocessorChain`] driver
//! - [`observer`]: execution events for logging and progress reporting
//! - [`config`]: [`ChainConfig`], readable from TOML
//! - [`error`]: stage and chain errors

pub mod action;
pub mod chain;
pub mod config;
pub mod error;
pub mod observer;
pub mod stage;
pub mod token;

pub use action::PreprocessorAction;
pub use chain::PreprocessorChain;
pub use config::ChainConfig;
pub use error::{ActionError, PipelineError, PreprocessorError};
pub use observer::{ChainObserver, NoopObserver, TracingObserver};
pub use stage::{FnPreprocessor, Preprocessor, StageState, from_fn};
pub use token::{Token, TokenType, Trivia, TriviaKind};
