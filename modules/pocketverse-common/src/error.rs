//! Typed errors for state updates.

use thiserror::Error;

/// A state event that cannot be applied to the current state.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    #[error("character already exists: {0}")]
    DuplicateCharacter(String),

    #[error("unknown post: {0}")]
    UnknownPost(String),

    #[error("unknown ticket: {0}")]
    UnknownTicket(String),

    #[error("unknown message {message_id} in chat with {character_id}")]
    UnknownMessage {
        character_id: String,
        message_id: String,
    },

    #[error("ticket already purchased: {0}")]
    AlreadyPurchased(String),

    #[error("insufficient balance: need {needed:.2}, have {available:.2}")]
    InsufficientBalance { needed: f64, available: f64 },

    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
