use thiserror::Error;

/// Errors raised by the swipe-deck engine
///
/// Guard conditions (empty stack, empty history, busy card) are not errors;
/// the engine reports them as `false`/`None`. Everything here is a
/// programming-error class that callers log and then ignore.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeckError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Card stack is empty")]
    EmptyStack,

    #[error("Duplicate candidate id: {0}")]
    DuplicateId(String),

    #[error("State desync: {0}")]
    StateDesync(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
