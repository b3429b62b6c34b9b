//! The canonical, type-tagged hasher used for every digest in the tree.
//!
//! Every value is preceded by a one-byte type tag from a fixed enumeration,
//! so that `H(u8(44)) != H(i8(44))` and `H(u8(44), u8(55)) != H([u8](44,55))`.
//! Sequences carry a big-endian `u64` length prefix. Nested sequences recurse
//! through [`HashItem::Nested`]. The tag assignment is part of the external
//! contract (§4.1 / §6) and must not be reordered.

use sha2::{Digest as _, Sha256};

use crate::Digest;

const TAG_BOOL: u8 = 0;
const TAG_I8: u8 = 1;
const TAG_I16: u8 = 2;
const TAG_I32: u8 = 3;
const TAG_I64: u8 = 4;
const TAG_U8: u8 = 5;
const TAG_U16: u8 = 6;
const TAG_U32: u8 = 7;
const TAG_U64: u8 = 8;
const TAG_BOOL_SLICE: u8 = 9;
const TAG_I8_SLICE: u8 = 10;
const TAG_I16_SLICE: u8 = 11;
const TAG_I32_SLICE: u8 = 12;
const TAG_I64_SLICE: u8 = 13;
const TAG_U8_SLICE: u8 = 14;
const TAG_U16_SLICE: u8 = 15;
const TAG_U32_SLICE: u8 = 16;
const TAG_U64_SLICE: u8 = 17;
const TAG_STRING: u8 = 18;
const TAG_NESTED: u8 = 19;

/// A single value accepted by [`canonical_hash`].
///
/// Variants mirror the fixed tag enumeration exactly (0..=19). Widths are
/// explicit because the hash is platform-independent: there is no variant
/// for a bare `usize`/`isize`.
#[derive(Clone, Copy, Debug)]
pub enum HashItem<'a> {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    BoolSlice(&'a [bool]),
    I8Slice(&'a [i8]),
    I16Slice(&'a [i16]),
    I32Slice(&'a [i32]),
    I64Slice(&'a [i64]),
    U8Slice(&'a [u8]),
    U16Slice(&'a [u16]),
    U32Slice(&'a [u32]),
    U64Slice(&'a [u64]),
    Str(&'a str),
    /// An arbitrarily nested sequence of further items.
    Nested(&'a [HashItem<'a>]),
}

fn write_len(buffer: &mut Vec<u8>, len: usize) {
    buffer.extend_from_slice(&(len as u64).to_be_bytes());
}

fn encode_item(item: &HashItem<'_>, buffer: &mut Vec<u8>) {
    match *item {
        HashItem::Bool(value) => {
            buffer.push(TAG_BOOL);
            buffer.push(value as u8);
        }
        HashItem::I8(value) => {
            buffer.push(TAG_I8);
            buffer.push(value as u8);
        }
        HashItem::I16(value) => {
            buffer.push(TAG_I16);
            buffer.extend_from_slice(&value.to_be_bytes());
        }
        HashItem::I32(value) => {
            buffer.push(TAG_I32);
            buffer.extend_from_slice(&value.to_be_bytes());
        }
        HashItem::I64(value) => {
            buffer.push(TAG_I64);
            buffer.extend_from_slice(&value.to_be_bytes());
        }
        HashItem::U8(value) => {
            buffer.push(TAG_U8);
            buffer.push(value);
        }
        HashItem::U16(value) => {
            buffer.push(TAG_U16);
            buffer.extend_from_slice(&value.to_be_bytes());
        }
        HashItem::U32(value) => {
            buffer.push(TAG_U32);
            buffer.extend_from_slice(&value.to_be_bytes());
        }
        HashItem::U64(value) => {
            buffer.push(TAG_U64);
            buffer.extend_from_slice(&value.to_be_bytes());
        }
        HashItem::BoolSlice(values) => {
            buffer.push(TAG_BOOL_SLICE);
            write_len(buffer, values.len());
            buffer.extend(values.iter().map(|v| *v as u8));
        }
        HashItem::I8Slice(values) => {
            buffer.push(TAG_I8_SLICE);
            write_len(buffer, values.len());
            buffer.extend(values.iter().map(|v| *v as u8));
        }
        HashItem::I16Slice(values) => {
            buffer.push(TAG_I16_SLICE);
            write_len(buffer, values.len());
            for value in values {
                buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
        HashItem::I32Slice(values) => {
            buffer.push(TAG_I32_SLICE);
            write_len(buffer, values.len());
            for value in values {
                buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
        HashItem::I64Slice(values) => {
            buffer.push(TAG_I64_SLICE);
            write_len(buffer, values.len());
            for value in values {
                buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
        HashItem::U8Slice(values) => {
            buffer.push(TAG_U8_SLICE);
            write_len(buffer, values.len());
            buffer.extend_from_slice(values);
        }
        HashItem::U16Slice(values) => {
            buffer.push(TAG_U16_SLICE);
            write_len(buffer, values.len());
            for value in values {
                buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
        HashItem::U32Slice(values) => {
            buffer.push(TAG_U32_SLICE);
            write_len(buffer, values.len());
            for value in values {
                buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
        HashItem::U64Slice(values) => {
            buffer.push(TAG_U64_SLICE);
            write_len(buffer, values.len());
            for value in values {
                buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
        HashItem::Str(value) => {
            buffer.push(TAG_STRING);
            write_len(buffer, value.len());
            buffer.extend_from_slice(value.as_bytes());
        }
        HashItem::Nested(items) => {
            buffer.push(TAG_NESTED);
            write_len(buffer, items.len());
            for nested in items {
                encode_item(nested, buffer);
            }
        }
    }
}

/// Hashes a sequence of heterogeneous, typed items into a single digest.
///
/// Each top-level item is encoded in order and concatenated (there is no
/// length prefix around the whole call, only around each sequence-typed
/// item) before taking `SHA-256` of the resulting buffer.
pub fn canonical_hash(items: &[HashItem<'_>]) -> Digest {
    let mut buffer = Vec::new();
    for item in items {
        encode_item(item, &mut buffer);
    }
    Digest(Sha256::digest(&buffer).into())
}

/// Convenience: wraps a slice of byte-strings as a nested sequence of
/// [`HashItem::U8Slice`] items, matching how per-field encoded values are
/// hashed together (`[][]byte` in the original source).
pub fn nested_byte_strings(values: &[Vec<u8>]) -> Vec<HashItem<'_>> {
    values.iter().map(|v| HashItem::U8Slice(v)).collect()
}

/// The plain, untagged `SHA-256` digest of a record key — used only to
/// compute the path through the tree, never for node labels.
pub fn path_for_key(key: &[u8]) -> Digest {
    Digest(Sha256::digest(key).into())
}

/// The digest of a leaf node: `H(true, key, values)`.
pub fn leaf_digest(key: &[u8], values: &[Vec<u8>]) -> Digest {
    canonical_hash(&[
        HashItem::Bool(true),
        HashItem::U8Slice(key),
        HashItem::Nested(&nested_byte_strings(values)),
    ])
}

/// The digest of an internal node: `H(false, values, left, right)`.
pub fn internal_digest(values: &[Vec<u8>], left: Digest, right: Digest) -> Digest {
    canonical_hash(&[
        HashItem::Bool(false),
        HashItem::Nested(&nested_byte_strings(values)),
        HashItem::U8Slice(&left.0),
        HashItem::U8Slice(&right.0),
    ])
}
