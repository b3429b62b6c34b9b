//! Recoverable domain errors.
//!
//! Per the spec's error handling design, contract violations by the caller
//! (wrong arity, lifecycle misuse, out-of-range field index, proxy scope
//! violations, verifying an inconsistent tree) are `panic!`s, not values of
//! this enum — they are programmer errors, not things a caller should
//! recover from. Everything here is a legitimate runtime outcome.

use thiserror::Error;

/// Errors returned by [`crate::Collection`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Applying update to unknown subtree. Proof needed.")]
    ProofNeeded,

    #[error("Key collision.")]
    KeyCollision,

    #[error("Key not found.")]
    KeyNotFound,

    #[error("No match found.")]
    NoMatchFound,

    #[error("Wrong number of values.")]
    WrongNumberOfValues,
}

/// Errors returned while decoding a field's raw encoded bytes back into a
/// typed [`crate::field::FieldValue`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Wrong number of values.")]
    WrongNumberOfValues,
}

/// Errors returned by [`crate::field::Field::navigate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigateError {
    #[error("Data values cannot be navigated.")]
    NotNavigable,

    #[error("Query exceeds parent stake.")]
    QueryExceedsParent,
}
