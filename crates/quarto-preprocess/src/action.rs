/*
 * action.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * What a preprocessor asks the chain to do at one position.
 */

//! Preprocessor actions.

use std::sync::Arc;

use crate::token::{Token, Trivia};

/// The edit a preprocessor requests at the current position of its stream.
///
/// An action can, in this order:
/// - inject trivia before the current position; they attach to the next
///   token written to the output
/// - delete `deletions` tokens starting with the current one
/// - inject tokens before the current position
///
/// When nothing is deleted, the current token is passed through after the
/// injected tokens. Injected tokens go straight to the output: the stage
/// that injected them never processes them, the next stage does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessorAction {
    deletions: usize,
    trivia: Vec<Trivia>,
    tokens: Vec<Arc<Token>>,
}

impl PreprocessorAction {
    /// Pass the current token through unchanged.
    pub const NO_OPERATION: PreprocessorAction = PreprocessorAction {
        deletions: 0,
        trivia: Vec::new(),
        tokens: Vec::new(),
    };

    pub fn new(deletions: usize, trivia: Vec<Trivia>, tokens: Vec<Arc<Token>>) -> Self {
        PreprocessorAction {
            deletions,
            trivia,
            tokens,
        }
    }

    /// Delete `count` tokens starting with the current one.
    pub fn delete(count: usize) -> Self {
        PreprocessorAction {
            deletions: count,
            ..Default::default()
        }
    }

    /// Inject `tokens` before the current token.
    pub fn inject(tokens: impl IntoIterator<Item = Token>) -> Self {
        PreprocessorAction::default().with_tokens(tokens)
    }

    /// Replace the current token with `tokens`.
    pub fn replace(tokens: impl IntoIterator<Item = Token>) -> Self {
        PreprocessorAction::delete(1).with_tokens(tokens)
    }

    pub fn with_deletions(mut self, count: usize) -> Self {
        self.deletions = count;
        self
    }

    pub fn with_tokens(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        self.tokens.extend(tokens.into_iter().map(Arc::new));
        self
    }

    /// Inject tokens that are already shared, e.g. copies of earlier tokens.
    pub fn with_shared_tokens(mut self, tokens: impl IntoIterator<Item = Arc<Token>>) -> Self {
        self.tokens.extend(tokens);
        self
    }

    pub fn with_trivia(mut self, trivia: impl IntoIterator<Item = Trivia>) -> Self {
        self.trivia.extend(trivia);
        self
    }

    pub fn deletions(&self) -> usize {
        self.deletions
    }

    pub fn trivia(&self) -> &[Trivia] {
        &self.trivia
    }

    pub fn tokens(&self) -> &[Arc<Token>] {
        &self.tokens
    }

    /// Whether this action leaves the stream untouched.
    pub fn is_noop(&self) -> bool {
        self.deletions == 0 && self.trivia.is_empty() && self.tokens.is_empty()
    }

    pub(crate) fn into_parts(self) -> (usize, Vec<Trivia>, Vec<Arc<Token>>) {
        (self.deletions, self.trivia, self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;
    use quarto_source_text::{FileId, TextLocation};

    fn token(value: &str) -> Token {
        Token::new(
            TokenType::new("IDENT"),
            value,
            TextLocation::start_of(FileId(0)),
        )
    }

    #[test]
    fn test_no_operation() {
        assert!(PreprocessorAction::NO_OPERATION.is_noop());
        assert_eq!(PreprocessorAction::NO_OPERATION, PreprocessorAction::default());
    }

    #[test]
    fn test_delete() {
        let action = PreprocessorAction::delete(2);
        assert_eq!(action.deletions(), 2);
        assert!(action.tokens().is_empty());
        assert!(!action.is_noop());
    }

    #[test]
    fn test_replace() {
        let action = PreprocessorAction::replace([token("B1"), token("B2")]);
        assert_eq!(action.deletions(), 1);
        let values: Vec<&str> = action.tokens().iter().map(|t| t.value()).collect();
        assert_eq!(values, vec!["B1", "B2"]);
    }

    #[test]
    fn test_inject_trivia_only_is_not_noop() {
        let comment = Arc::new(token("// note"));
        let action = PreprocessorAction::default().with_trivia([Trivia::comment(comment)]);
        assert_eq!(action.deletions(), 0);
        assert_eq!(action.trivia().len(), 1);
        assert!(!action.is_noop());
    }

    #[test]
    fn test_shared_tokens_keep_identity() {
        let shared = Arc::new(token("x"));
        let action = PreprocessorAction::default().with_shared_tokens([shared.clone()]);
        assert!(Arc::ptr_eq(&action.tokens()[0], &shared));
    }
}
