//! Thin `tracing` span helpers for the collection engine.
//!
//! The teacher instruments its node encode/decode paths with `tracing`
//! spans and events rather than a metrics crate; this crate follows the
//! same convention for the operations a caller cares about observing:
//! mutations, transaction lifecycle, and verification.

use tracing::Span;

/// Opens a `debug`-level span for one of the four mutating operations,
/// tagged with the key being touched.
pub(crate) fn mutation_span(operation: &'static str, key: &[u8]) -> Span {
    tracing::debug_span!("collection.mutate", operation, key = %hex::encode(key))
}

/// Opens a `debug`-level span for a transaction lifecycle event.
pub(crate) fn transaction_span(operation: &'static str, id: u64) -> Span {
    tracing::debug_span!("collection.transaction", operation, id)
}

/// Opens a `trace`-level span for proof verification.
pub(crate) fn verify_span(key: &[u8]) -> Span {
    tracing::trace_span!("collection.verify", key = %hex::encode(key))
}
