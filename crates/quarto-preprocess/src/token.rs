/*
 * token.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Token and trivia model shared by the lexer, preprocessors and parser.
 */

//! Tokens and trivia.
//!
//! Tokens are immutable. A preprocessor that wants to change a token deletes
//! it and injects a replacement. Tokens are shared between streams as
//! `Arc<Token>`, so a token passed through unchanged stays the same
//! allocation from the lexer to the parser.

use std::borrow::Cow;
use std::sync::Arc;

use quarto_source_text::{TextCursor, TextLocation};

/// The kind of a token, as named by the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenType(Cow<'static, str>);

impl TokenType {
    /// The end-of-stream marker every token stream ends with.
    pub const EOF: TokenType = TokenType(Cow::Borrowed("EOF"));

    pub const fn from_static(name: &'static str) -> Self {
        TokenType(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        TokenType(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_eof(&self) -> bool {
        *self == TokenType::EOF
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A token of the stream, with the trivia that precede it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    token_type: TokenType,
    value: String,
    location: TextLocation,
    trivia: Vec<Trivia>,
    generated: bool,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, location: TextLocation) -> Self {
        Token {
            token_type,
            value: value.into(),
            location,
            trivia: Vec::new(),
            generated: false,
        }
    }

    /// The end-of-stream token, located just past the last character.
    pub fn eof(location: TextLocation) -> Self {
        Token::new(TokenType::EOF, "EOF", location)
    }

    /// Build a token from characters `start..end` of a text.
    ///
    /// The value is read through the cursor and the location is the
    /// original location of the first character, so tokens lexed from a
    /// rewritten text point back into the original files. `start` must be
    /// the index of a character of the text.
    pub fn from_text(
        token_type: TokenType,
        cursor: &TextCursor,
        start: usize,
        end: usize,
    ) -> quarto_source_text::Result<Self> {
        let value = cursor.sub_text(start, end)?.to_string();
        let location = cursor.location(start)?;
        Ok(Token::new(token_type, value, location))
    }

    /// A token created by a preprocessor, inserted before `anchor`.
    ///
    /// Injected tokens have no original text; they report the location of
    /// the token they were inserted before.
    pub fn injected_before(token_type: TokenType, value: impl Into<String>, anchor: &Token) -> Self {
        Token::new(token_type, value, anchor.location).generated()
    }

    /// Mark this token as created by a preprocessor.
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Append trivia to this token.
    pub fn with_trivia(mut self, trivia: impl IntoIterator<Item = Trivia>) -> Self {
        self.trivia.extend(trivia);
        self
    }

    /// A copy of this token with `trivia` placed before its own trivia.
    pub(crate) fn with_leading_trivia(&self, mut trivia: Vec<Trivia>) -> Token {
        trivia.extend(self.trivia.iter().cloned());
        Token {
            token_type: self.token_type.clone(),
            value: self.value.clone(),
            location: self.location,
            trivia,
            generated: self.generated,
        }
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn location(&self) -> TextLocation {
        self.location
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }

    pub fn trivia(&self) -> &[Trivia] {
        &self.trivia
    }

    pub fn has_trivia(&self) -> bool {
        !self.trivia.is_empty()
    }

    /// Whether a preprocessor created this token.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn is_eof(&self) -> bool {
        self.token_type.is_eof()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// What a piece of trivia is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Comment,
    /// Source text skipped by a preprocessor, e.g. a disabled branch
    SkippedText,
    /// A preprocessing directive consumed by a preprocessor
    PreprocessorDirective,
}

/// Tokens that the grammar does not see but that stay attached to the
/// following token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    kind: TriviaKind,
    tokens: Vec<Arc<Token>>,
}

impl Trivia {
    pub fn comment(token: Arc<Token>) -> Self {
        Trivia {
            kind: TriviaKind::Comment,
            tokens: vec![token],
        }
    }

    pub fn skipped_text(tokens: Vec<Arc<Token>>) -> Self {
        Trivia {
            kind: TriviaKind::SkippedText,
            tokens,
        }
    }

    pub fn directive(tokens: Vec<Arc<Token>>) -> Self {
        Trivia {
            kind: TriviaKind::PreprocessorDirective,
            tokens,
        }
    }

    pub fn kind(&self) -> TriviaKind {
        self.kind
    }

    pub fn tokens(&self) -> &[Arc<Token>] {
        &self.tokens
    }

    /// The first token of this trivia, if any.
    pub fn token(&self) -> Option<&Arc<Token>> {
        self.tokens.first()
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TriviaKind::Comment
    }

    /// Location of the first token, if any.
    pub fn location(&self) -> Option<TextLocation> {
        self.token().map(|token| token.location())
    }
}
