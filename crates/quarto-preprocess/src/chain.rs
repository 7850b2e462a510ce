/*
 * chain.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Driver that runs token streams through a sequence of preprocessors.
 */

//! Chain execution.
//!
//! A [`PreprocessorChain`] feeds the output of each stage to the next one.
//! Within a stage, the driver walks the input position by position, hands
//! the stage the remaining suffix, and applies the returned action:
//!
//! - injected trivia, and the trivia of deleted tokens, are held back and
//!   attached to the next token written to the output
//! - injected tokens are written to the output immediately
//! - without deletions, the current token is written next and the stage
//!   moves one position forward; otherwise the deleted tokens are skipped
//!
//! Any failure aborts the whole run; a partial stream is never returned.

use std::sync::Arc;

use crate::action::PreprocessorAction;
use crate::config::ChainConfig;
use crate::error::{ActionError, PipelineError};
use crate::observer::{ChainObserver, NoopObserver};
use crate::stage::{Preprocessor, StageState};
use crate::token::{Token, Trivia};

struct StageSlot {
    stage: Box<dyn Preprocessor>,
    state: StageState,
}

/// An ordered sequence of preprocessors.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use quarto_preprocess::{ChainConfig, PreprocessorAction, PreprocessorChain, Token, TokenType, from_fn};
/// use quarto_source_text::{FileId, TextLocation};
///
/// let location = TextLocation::start_of(FileId(0));
/// let ident = |value: &str| Arc::new(Token::new(TokenType::new("IDENT"), value, location));
///
/// let mut chain = PreprocessorChain::new(ChainConfig::default());
/// chain.push(from_fn("drop-b", |tokens: &[Arc<Token>]| {
///     if tokens[0].value() == "b" {
///         Ok(PreprocessorAction::delete(1))
///     } else {
///         Ok(PreprocessorAction::NO_OPERATION)
///     }
/// }));
///
/// let output = chain
///     .run(vec![ident("a"), ident("b"), Arc::new(Token::eof(location))])
///     .unwrap();
/// let values: Vec<&str> = output.iter().map(|t| t.value()).collect();
/// assert_eq!(values, ["a", "EOF"]);
/// ```
pub struct PreprocessorChain {
    stages: Vec<StageSlot>,
    config: ChainConfig,
    observer: Arc<dyn ChainObserver>,
}

impl PreprocessorChain {
    /// Create an empty chain. An empty chain returns its input unchanged.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report execution events to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ChainObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Append a stage; it runs after every stage already in the chain.
    pub fn push(&mut self, stage: impl Preprocessor + 'static) -> &mut Self {
        self.stages.push(StageSlot {
            stage: Box::new(stage),
            state: StageState::Uninitialized,
        });
        self
    }

    pub fn with_stage(mut self, stage: impl Preprocessor + 'static) -> Self {
        self.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Get stage names for debugging.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|slot| slot.stage.name()).collect()
    }

    /// State of every stage, in chain order, as left by the last run.
    pub fn stage_states(&self) -> Vec<StageState> {
        self.stages.iter().map(|slot| slot.state).collect()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Run `tokens` through every stage.
    ///
    /// Every stage is initialized at the start of each run, so a chain can
    /// be reused for several streams.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `tokens` is empty, does not end with the end-of-stream token, or
    ///   holds an end-of-stream token before the end
    /// - a stage fails
    /// - a stage returns an action that deletes or injects an end-of-stream
    ///   token, deletes past the end, or injects more tokens than
    ///   [`ChainConfig::max_injected_tokens`] allows
    pub fn run(&mut self, tokens: Vec<Arc<Token>>) -> Result<Vec<Arc<Token>>, PipelineError> {
        if let Err(err) = validate_stream(&tokens) {
            self.observer.on_chain_error(&err);
            return Err(err);
        }

        let total = self.stages.len();
        self.observer.on_chain_start(total, tokens.len());

        for slot in &mut self.stages {
            slot.stage.init();
            slot.state = StageState::Ready;
        }

        let mut stream = tokens;
        for index in 0..total {
            let slot = &mut self.stages[index];
            self.observer.on_stage_start(slot.stage.name(), index, total);
            tracing::debug!(
                stage = slot.stage.name(),
                input_tokens = stream.len(),
                "Running preprocessor"
            );

            match run_stage(slot, &self.config, self.observer.as_ref(), &stream) {
                Ok(output) => {
                    slot.state = StageState::Done;
                    self.observer
                        .on_stage_complete(slot.stage.name(), index, output.len());
                    stream = output;
                }
                Err(err) => {
                    slot.state = StageState::Failed;
                    self.observer.on_stage_error(slot.stage.name(), index, &err);
                    self.observer.on_chain_error(&err);
                    return Err(err);
                }
            }
        }

        self.observer.on_chain_complete(stream.len());
        Ok(stream)
    }
}

impl Default for PreprocessorChain {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl std::fmt::Debug for PreprocessorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreprocessorChain")
            .field("stages", &self.stage_names())
            .field("config", &self.config)
            .finish()
    }
}

fn validate_stream(tokens: &[Arc<Token>]) -> Result<(), PipelineError> {
    let Some((last, rest)) = tokens.split_last() else {
        return Err(PipelineError::InvalidInput("the stream is empty".to_string()));
    };
    if !last.is_eof() {
        return Err(PipelineError::InvalidInput(
            "the stream does not end with an end-of-stream token".to_string(),
        ));
    }
    if let Some(index) = rest.iter().position(|token| token.is_eof()) {
        return Err(PipelineError::InvalidInput(format!(
            "end-of-stream token at position {index} before the end of the stream"
        )));
    }
    Ok(())
}

/// Run one stage over `input`, producing its output stream.
fn run_stage(
    slot: &mut StageSlot,
    config: &ChainConfig,
    observer: &dyn ChainObserver,
    input: &[Arc<Token>],
) -> Result<Vec<Arc<Token>>, PipelineError> {
    let mut output = Vec::with_capacity(input.len());
    let mut pending: Vec<Trivia> = Vec::new();
    let mut injected = 0;
    let mut position = 0;

    while position < input.len() {
        slot.state = StageState::Processing;
        let remaining = &input[position..];

        let action = slot
            .stage
            .process(remaining)
            .map_err(|source| PipelineError::StageFailed {
                stage: slot.stage.name().to_string(),
                position,
                source,
            })?;

        check_action(
            &action,
            remaining.len(),
            &mut injected,
            config.max_injected_tokens,
        )
        .map_err(|reason| PipelineError::InvalidAction {
            stage: slot.stage.name().to_string(),
            position,
            reason,
        })?;

        if !action.is_noop() {
            observer.on_action(slot.stage.name(), position, &action);
            if config.trace_actions {
                tracing::trace!(
                    stage = slot.stage.name(),
                    position = position,
                    current = %remaining[0],
                    deletions = action.deletions(),
                    injected = ?action.tokens().iter().map(|t| t.value()).collect::<Vec<_>>(),
                    "Preprocessor action"
                );
            }
        }

        let (deletions, trivia, tokens) = action.into_parts();
        pending.extend(trivia);
        if config.keep_deleted_trivia {
            for deleted in &remaining[..deletions] {
                pending.extend(deleted.trivia().iter().cloned());
            }
        }

        for token in tokens {
            emit(&mut output, token, &mut pending);
        }

        if deletions == 0 {
            emit(&mut output, remaining[0].clone(), &mut pending);
            position += 1;
        } else {
            position += deletions;
        }
    }

    Ok(output)
}

fn check_action(
    action: &PreprocessorAction,
    remaining: usize,
    injected: &mut usize,
    limit: Option<usize>,
) -> Result<(), ActionError> {
    let deletions = action.deletions();
    if deletions > remaining {
        return Err(ActionError::DeletionOutOfRange {
            requested: deletions,
            remaining,
        });
    }
    // The last remaining token is always the end-of-stream token
    if deletions == remaining {
        return Err(ActionError::DeletesEndOfStream);
    }
    if action.tokens().iter().any(|token| token.is_eof()) {
        return Err(ActionError::InjectsEndOfStream);
    }

    *injected += action.tokens().len();
    match limit {
        Some(limit) if *injected > limit => Err(ActionError::InjectionLimitExceeded {
            total: *injected,
            limit,
        }),
        _ => Ok(()),
    }
}

/// Write `token` to `output`, attaching any pending trivia in front of its
/// own. Without pending trivia the token is shared, not copied.
fn emit(output: &mut Vec<Arc<Token>>, token: Arc<Token>, pending: &mut Vec<Trivia>) {
    if pending.is_empty() {
        output.push(token);
    } else {
        let trivia = std::mem::take(pending);
        output.push(Arc::new(token.with_leading_trivia(trivia)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreprocessorError;
    use crate::stage::from_fn;
    use crate::token::TokenType;
    use quarto_source_text::{FileId, TextLocation};

    fn loc() -> TextLocation {
        TextLocation::start_of(FileId(0))
    }

    fn ident(value: &str) -> Arc<Token> {
        Arc::new(Token::new(TokenType::new("IDENT"), value, loc()))
    }

    fn stream(values: &[&str]) -> Vec<Arc<Token>> {
        values
            .iter()
            .copied()
            .map(ident)
            .chain(std::iter::once(Arc::new(Token::eof(loc()))))
            .collect()
    }

    fn values(tokens: &[Arc<Token>]) -> Vec<&str> {
        tokens.iter().map(|t| t.value()).collect()
    }

    fn noop(name: &'static str) -> impl Preprocessor + 'static {
        from_fn(name, |_: &[Arc<Token>]| Ok(PreprocessorAction::NO_OPERATION))
    }

    /// Records the length of every suffix it is shown
    struct SuffixRecorder {
        seen: Arc<std::sync::Mutex<Vec<usize>>>,
        inits: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl Preprocessor for SuffixRecorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn init(&mut self) {
            self.inits
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        fn process(&mut self, tokens: &[Arc<Token>]) -> Result<PreprocessorAction, PreprocessorError> {
            self.seen.lock().unwrap().push(tokens.len());
            Ok(PreprocessorAction::NO_OPERATION)
        }
    }

    #[test]
    fn test_empty_chain_returns_input() {
        let mut chain = PreprocessorChain::default();
        let input = stream(&["a", "b"]);
        let output = chain.run(input.clone()).unwrap();
        assert_eq!(output, input);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_stage_sees_strictly_shrinking_suffixes() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let inits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut chain = PreprocessorChain::default().with_stage(SuffixRecorder {
            seen: seen.clone(),
            inits: inits.clone(),
        });

        chain.run(stream(&["a", "b", "c"])).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![4, 3, 2, 1]);

        chain.run(stream(&["a"])).unwrap();
        assert_eq!(inits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stage_names_and_states() {
        let mut chain = PreprocessorChain::default()
            .with_stage(noop("first"))
            .with_stage(noop("second"));
        assert_eq!(chain.stage_names(), vec!["first", "second"]);
        assert_eq!(
            chain.stage_states(),
            vec![StageState::Uninitialized, StageState::Uninitialized]
        );

        chain.run(stream(&["a"])).unwrap();
        assert_eq!(chain.stage_states(), vec![StageState::Done, StageState::Done]);
    }

    #[test]
    fn test_failed_stage_state() {
        let mut chain = PreprocessorChain::default()
            .with_stage(from_fn("broken", |_: &[Arc<Token>]| {
                Err(PreprocessorError::new("boom"))
            }))
            .with_stage(noop("after"));

        let err = chain.run(stream(&["a"])).unwrap_err();
        assert_eq!(err.stage(), Some("broken"));
        assert_eq!(chain.stage_states(), vec![StageState::Failed, StageState::Ready]);
    }

    #[test]
    fn test_validate_stream() {
        assert!(matches!(
            validate_stream(&[]),
            Err(PipelineError::InvalidInput(_))
        ));
        assert!(validate_stream(&[ident("a")]).is_err());

        let mut early_eof = stream(&["a"]);
        early_eof.insert(0, Arc::new(Token::eof(loc())));
        let err = validate_stream(&early_eof).unwrap_err();
        assert!(err.to_string().contains("position 0"));

        assert!(validate_stream(&stream(&[])).is_ok());
    }

    #[test]
    fn test_check_action() {
        let mut injected = 0;
        assert_eq!(
            check_action(&PreprocessorAction::delete(3), 2, &mut injected, None),
            Err(ActionError::DeletionOutOfRange {
                requested: 3,
                remaining: 2
            })
        );
        assert_eq!(
            check_action(&PreprocessorAction::delete(2), 2, &mut injected, None),
            Err(ActionError::DeletesEndOfStream)
        );
        assert_eq!(
            check_action(
                &PreprocessorAction::inject([Token::eof(loc())]),
                2,
                &mut injected,
                None
            ),
            Err(ActionError::InjectsEndOfStream)
        );
        assert_eq!(
            check_action(&PreprocessorAction::delete(1), 2, &mut injected, None),
            Ok(())
        );
    }

    #[test]
    fn test_injection_limit_is_cumulative() {
        let one = || PreprocessorAction::default().with_shared_tokens([ident("x")]);
        let mut injected = 0;
        assert!(check_action(&one(), 5, &mut injected, Some(2)).is_ok());
        assert!(check_action(&one(), 5, &mut injected, Some(2)).is_ok());
        assert_eq!(
            check_action(&one(), 5, &mut injected, Some(2)),
            Err(ActionError::InjectionLimitExceeded { total: 3, limit: 2 })
        );
    }

    #[test]
    fn test_emit_shares_token_without_trivia() {
        let token = ident("a");
        let mut output = Vec::new();
        let mut pending = Vec::new();
        emit(&mut output, token.clone(), &mut pending);
        assert!(Arc::ptr_eq(&output[0], &token));
    }

    #[test]
    fn test_emit_attaches_pending_trivia_first() {
        let own = Trivia::comment(ident("// own"));
        let token = Arc::new(Token::new(TokenType::new("IDENT"), "a", loc()).with_trivia([own.clone()]));
        let injected = Trivia::comment(ident("// injected"));

        let mut output = Vec::new();
        let mut pending = vec![injected.clone()];
        emit(&mut output, token.clone(), &mut pending);

        assert!(pending.is_empty());
        assert!(!Arc::ptr_eq(&output[0], &token));
        assert_eq!(output[0].trivia(), &[injected, own]);
        assert_eq!(values(&output), vec!["a"]);
    }

    #[test]
    fn test_debug_lists_stage_names() {
        let chain = PreprocessorChain::default().with_stage(noop("only"));
        let debug = format!("{chain:?}");
        assert!(debug.contains("only"));
    }
}
