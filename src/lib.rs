//! An authenticated, sparse, prefix-indexed key/value Merkle collection.
//!
//! A [`Collection`] stores records keyed by arbitrary byte strings; each
//! record carries a fixed number of typed [`field::Field`] values. Every
//! tree node carries a cryptographic digest that commits to its subtree, so
//! a remote verifier holding only a pruned view (a root digest, or a
//! restricted sub-range via [`Scope`]) can still answer membership queries
//! and validate mutations via [`Proof`]s.
//!
//! ```
//! use merkle_collection::{Collection, FieldValue};
//! use merkle_collection::field::Data;
//!
//! let mut collection = Collection::empty(vec![Box::new(Data)]);
//! collection
//!     .add(b"alice", &[FieldValue::Bytes(b"payload".to_vec())])
//!     .unwrap();
//! assert!(collection.get(b"alice").unwrap().matches());
//! ```

mod arena;
mod bytes_util;
pub mod config;
pub mod error;
pub mod field;
pub mod hash;
mod logging;
mod node;
pub mod proof;
pub mod record;
pub mod scope;
pub mod update;

mod collection;

use serde::{Deserialize, Serialize};

pub use crate::collection::Collection;
pub use crate::config::CollectionConfig;
pub use crate::error::{CollectionError, DecodeError, NavigateError};
pub use crate::field::{Field, FieldValue};
pub use crate::proof::{Dump, Proof, Step};
pub use crate::record::Record;
pub use crate::scope::Scope;
pub use crate::update::{Proxy, ReadOnly, ReadWrite, Update};

/// A 32-byte SHA-256 digest. Equality is bytewise; there is no notion of
/// network byte order since the value never leaves the process as
/// anything but an opaque array.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Digest(pub [u8; 32]);

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", hex::encode(self.0))
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Data;

    #[test]
    fn empty_collection_and_verifier_share_a_root_digest() {
        let collection = Collection::empty(vec![Box::new(Data)]);
        let verifier = Collection::empty_verifier(vec![Box::new(Data)]);
        assert_eq!(collection.root_digest(), verifier.root_digest());
    }

    #[test]
    fn digest_debug_and_display_are_hex() {
        let digest = Digest([0xab; 32]);
        assert_eq!(format!("{digest}"), "ab".repeat(32));
        assert!(format!("{digest:?}").starts_with("Digest(ab"));
    }
}
