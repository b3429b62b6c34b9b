//! Polymorphic field (value) kinds.
//!
//! A [`Field`] describes how one typed column of a record behaves inside the
//! tree: its placeholder encoding, how two children aggregate into a parent
//! value, and (optionally) how to navigate a cumulative query down through
//! aggregated values. Two kinds ship with the crate: [`Data`] (opaque,
//! non-aggregating) and [`Stake64`] (summed `u64` stake).

use crate::error::{DecodeError, NavigateError};

/// Which child a [`Field::navigate`] query should continue into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Left,
    Right,
}

/// A typed value passed to `Add`/`Set`/`SetField`, or returned by `decode`.
///
/// `Same` is only meaningful as an argument to [`crate::Collection::set`]:
/// it means "leave this field's current value unchanged" and is never
/// passed to a [`Field`]'s `encode`.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Bytes(Vec<u8>),
    U64(u64),
    Same,
}

impl FieldValue {
    /// Returns the bytes for an encoded [`FieldValue::Bytes`].
    ///
    /// # Panics
    /// Panics if `self` is not a `Bytes` value — passing the wrong typed
    /// value for a field is a caller contract violation, mirroring the
    /// original's `generic.([]byte)` type assertion.
    pub fn expect_bytes(&self) -> &[u8] {
        match self {
            FieldValue::Bytes(bytes) => bytes,
            other => panic!("Wrong value type for field: expected bytes, got {other:?}."),
        }
    }

    /// Returns the integer for an encoded [`FieldValue::U64`].
    ///
    /// # Panics
    /// Panics if `self` is not a `U64` value.
    pub fn expect_u64(&self) -> u64 {
        match self {
            FieldValue::U64(value) => *value,
            other => panic!("Wrong value type for field: expected u64, got {other:?}."),
        }
    }
}

/// A polymorphic value kind, instantiated once per column of a collection.
pub trait Field: std::fmt::Debug {
    /// The canonical "absent" encoded value for this field.
    fn placeholder(&self) -> Vec<u8>;

    /// Aggregates two already-encoded child values into a parent value.
    fn parent(&self, left: &[u8], right: &[u8]) -> Vec<u8>;

    /// Cumulative-query navigation: given an encoded `query` and the
    /// encoded `parent`/`left`/`right` values, decides which child the
    /// query should continue into (and, for [`Navigation::Right`],
    /// rewrites `query` in place to the remaining query for that child).
    ///
    /// Errors if `query` is not smaller than `parent` under this field's
    /// ordering. Fields with no natural ordering (e.g. [`Data`]) always err.
    fn navigate(
        &self,
        query: &mut Vec<u8>,
        parent: &[u8],
        left: &[u8],
        right: &[u8],
    ) -> Result<Navigation, NavigateError>;

    /// Encodes a typed value into the field's raw on-tree representation.
    ///
    /// # Panics
    /// Panics if `value` is not the variant this field expects.
    fn encode(&self, value: &FieldValue) -> Vec<u8>;

    /// Decodes a raw on-tree representation back into a typed value.
    fn decode(&self, raw: &[u8]) -> Result<FieldValue, DecodeError>;
}

/// An opaque byte-string field. Carries no aggregate: its placeholder and
/// parent values are always empty, and it cannot be navigated.
#[derive(Clone, Copy, Debug, Default)]
pub struct Data;

impl Field for Data {
    fn placeholder(&self) -> Vec<u8> {
        Vec::new()
    }

    fn parent(&self, _left: &[u8], _right: &[u8]) -> Vec<u8> {
        Vec::new()
    }

    fn navigate(
        &self,
        _query: &mut Vec<u8>,
        _parent: &[u8],
        _left: &[u8],
        _right: &[u8],
    ) -> Result<Navigation, NavigateError> {
        Err(NavigateError::NotNavigable)
    }

    fn encode(&self, value: &FieldValue) -> Vec<u8> {
        value.expect_bytes().to_vec()
    }

    fn decode(&self, raw: &[u8]) -> Result<FieldValue, DecodeError> {
        Ok(FieldValue::Bytes(raw.to_vec()))
    }
}

/// A big-endian `u64` field whose parent value is the sum of its children.
///
/// Overflowing addition is a contract violation, not silently wrapped: the
/// spec assumes no overflow occurs in practice, and wrapping would corrupt
/// the aggregate without any signal to the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stake64;

impl Stake64 {
    fn decode_u64(raw: &[u8]) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(raw);
        u64::from_be_bytes(bytes)
    }

    fn encode_u64(value: u64) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }
}

impl Field for Stake64 {
    fn placeholder(&self) -> Vec<u8> {
        Self::encode_u64(0)
    }

    fn parent(&self, left: &[u8], right: &[u8]) -> Vec<u8> {
        let sum = Self::decode_u64(left)
            .checked_add(Self::decode_u64(right))
            .expect("Stake64 parent aggregation overflowed a u64.");
        Self::encode_u64(sum)
    }

    fn navigate(
        &self,
        query: &mut Vec<u8>,
        parent: &[u8],
        left: &[u8],
        _right: &[u8],
    ) -> Result<Navigation, NavigateError> {
        let query_value = Self::decode_u64(query);
        let parent_value = Self::decode_u64(parent);

        if query_value >= parent_value {
            return Err(NavigateError::QueryExceedsParent);
        }

        let left_value = Self::decode_u64(left);

        if query_value >= left_value {
            *query = Self::encode_u64(query_value - left_value);
            Ok(Navigation::Right)
        } else {
            Ok(Navigation::Left)
        }
    }

    fn encode(&self, value: &FieldValue) -> Vec<u8> {
        Self::encode_u64(value.expect_u64())
    }

    fn decode(&self, raw: &[u8]) -> Result<FieldValue, DecodeError> {
        if raw.len() != 8 {
            return Err(DecodeError::WrongNumberOfValues);
        }
        Ok(FieldValue::U64(Self::decode_u64(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_round_trips_identity() {
        let data = Data;
        let encoded = data.encode(&FieldValue::Bytes(b"mydata".to_vec()));
        assert_eq!(encoded, b"mydata");
        assert_eq!(
            data.decode(&encoded).unwrap(),
            FieldValue::Bytes(b"mydata".to_vec())
        );
    }

    #[test]
    fn data_placeholder_and_parent_are_empty() {
        let data = Data;
        assert!(data.placeholder().is_empty());
        assert!(data.parent(b"left", b"right").is_empty());
    }

    #[test]
    fn data_cannot_navigate() {
        let data = Data;
        let mut query = b"query".to_vec();
        assert!(data.navigate(&mut query, b"p", b"l", b"r").is_err());
    }

    #[test]
    fn stake64_encode_decode_round_trip() {
        let stake = Stake64;
        for value in [0u64, 1, 42, u64::MAX] {
            let encoded = stake.encode(&FieldValue::U64(value));
            assert_eq!(stake.decode(&encoded).unwrap(), FieldValue::U64(value));
        }
    }

    #[test]
    fn stake64_placeholder_is_zero() {
        let stake = Stake64;
        assert_eq!(stake.decode(&stake.placeholder()).unwrap(), FieldValue::U64(0));
    }

    #[test]
    fn stake64_parent_sums_children() {
        let stake = Stake64;
        let left = stake.encode(&FieldValue::U64(7));
        let right = stake.encode(&FieldValue::U64(35));
        let parent = stake.parent(&left, &right);
        assert_eq!(stake.decode(&parent).unwrap(), FieldValue::U64(42));
    }

    #[test]
    #[should_panic]
    fn stake64_parent_overflow_panics() {
        let stake = Stake64;
        let left = stake.encode(&FieldValue::U64(u64::MAX));
        let right = stake.encode(&FieldValue::U64(1));
        stake.parent(&left, &right);
    }

    #[test]
    fn stake64_navigate_picks_correct_child_and_rewrites_query() {
        let stake = Stake64;
        let left = stake.encode(&FieldValue::U64(10));
        let right = stake.encode(&FieldValue::U64(5));
        let parent = stake.parent(&left, &right);

        let mut low_query = stake.encode(&FieldValue::U64(3));
        let nav = stake.navigate(&mut low_query, &parent, &left, &right).unwrap();
        assert_eq!(nav, Navigation::Left);

        let mut high_query = stake.encode(&FieldValue::U64(12));
        let nav = stake
            .navigate(&mut high_query, &parent, &left, &right)
            .unwrap();
        assert_eq!(nav, Navigation::Right);
        assert_eq!(stake.decode(&high_query).unwrap(), FieldValue::U64(2));
    }

    #[test]
    fn stake64_navigate_rejects_out_of_range_query() {
        let stake = Stake64;
        let left = stake.encode(&FieldValue::U64(10));
        let right = stake.encode(&FieldValue::U64(5));
        let parent = stake.parent(&left, &right);

        let mut query = stake.encode(&FieldValue::U64(15));
        assert!(stake.navigate(&mut query, &parent, &left, &right).is_err());
    }

    #[test]
    fn decode_wrong_length_errors() {
        let stake = Stake64;
        assert!(stake.decode(&[0u8; 4]).is_err());
    }
}
