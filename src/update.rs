//! User-defined update transactions and the capability-gated [`Proxy`].
//!
//! An [`Update`] bundles a declared working set of keys with two phases: a
//! read-only `check` against the tree as it stands, and a read-write
//! `apply` that performs the actual mutation. The collection only ever
//! hands the update a [`Proxy`], never itself, so the update cannot reach
//! any key outside what it declared up front — this is what lets a
//! verifier holding only a pruned tree know exactly which proofs it must
//! supply before running someone else's update.

use hashbrown::HashSet;

use crate::field::FieldValue;
use crate::hash::path_for_key;
use crate::record::Record;
use crate::CollectionError;
use crate::Collection;

/// Read-only access to a [`Collection`] through a [`Proxy`]'s declared key set.
pub trait ReadOnly {
    /// Looks up `key`.
    ///
    /// # Panics
    /// Panics if `key` is not in the proxy's declared set.
    fn get(&self, key: &[u8]) -> Record;
}

/// Read-write access to a [`Collection`] through a [`Proxy`]'s declared key set.
pub trait ReadWrite: ReadOnly {
    /// # Panics
    /// Panics if `key` is not in the proxy's declared set.
    fn add(&mut self, key: &[u8], values: &[FieldValue]) -> Result<(), CollectionError>;

    /// # Panics
    /// Panics if `key` is not in the proxy's declared set.
    fn set(&mut self, key: &[u8], values: &[FieldValue]) -> Result<(), CollectionError>;

    /// # Panics
    /// Panics if `key` is not in the proxy's declared set, or `field_index`
    /// is out of range.
    fn set_field(
        &mut self,
        key: &[u8],
        field_index: usize,
        value: &FieldValue,
    ) -> Result<(), CollectionError>;

    /// # Panics
    /// Panics if `key` is not in the proxy's declared set.
    fn remove(&mut self, key: &[u8]) -> Result<(), CollectionError>;
}

/// A user-defined update: declares the keys it may touch, then runs a
/// read-only check followed by a read-write apply.
pub trait Update {
    /// The keys this update may read or mutate. Declared up front so a
    /// verifier knows which proofs it needs before running the update.
    fn keys(&self) -> Vec<Vec<u8>>;

    /// A read-only precondition check. Returning `false` aborts the
    /// update before [`Update::apply`] runs.
    fn check(&self, view: &dyn ReadOnly) -> bool;

    /// The mutation itself, run only if [`Update::check`] returned `true`.
    fn apply(&self, view: &mut dyn ReadWrite);
}

/// A capability-gated view into a [`Collection`] that only permits access
/// to a pre-declared set of keys. Obtained from [`Collection::proxy`] (see
/// `Collection::run_update`).
pub struct Proxy<'a> {
    collection: &'a mut Collection,
    paths: HashSet<crate::Digest>,
}

impl<'a> Proxy<'a> {
    pub(crate) fn new(collection: &'a mut Collection, keys: &[Vec<u8>]) -> Proxy<'a> {
        let paths = keys.iter().map(|key| path_for_key(key)).collect();
        Proxy { collection, paths }
    }

    fn require(&self, key: &[u8]) {
        if !self.paths.contains(&path_for_key(key)) {
            panic!("Accessing undeclared key from update.");
        }
    }
}

impl<'a> ReadOnly for Proxy<'a> {
    fn get(&self, key: &[u8]) -> Record {
        self.require(key);
        self.collection
            .get(key)
            .expect("proof needed for a key declared in the update's working set")
    }
}

impl<'a> ReadWrite for Proxy<'a> {
    fn add(&mut self, key: &[u8], values: &[FieldValue]) -> Result<(), CollectionError> {
        self.require(key);
        self.collection.add(key, values)
    }

    fn set(&mut self, key: &[u8], values: &[FieldValue]) -> Result<(), CollectionError> {
        self.require(key);
        self.collection.set(key, values)
    }

    fn set_field(
        &mut self,
        key: &[u8],
        field_index: usize,
        value: &FieldValue,
    ) -> Result<(), CollectionError> {
        self.require(key);
        self.collection.set_field(key, field_index, value)
    }

    fn remove(&mut self, key: &[u8]) -> Result<(), CollectionError> {
        self.require(key);
        self.collection.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Data;

    struct RenameIfPresent {
        from: Vec<u8>,
        to: Vec<u8>,
    }

    impl Update for RenameIfPresent {
        fn keys(&self) -> Vec<Vec<u8>> {
            vec![self.from.clone(), self.to.clone()]
        }

        fn check(&self, view: &dyn ReadOnly) -> bool {
            view.get(&self.from).matches()
        }

        fn apply(&self, view: &mut dyn ReadWrite) {
            let record = view.get(&self.from);
            let values: Vec<FieldValue> = record
                .values(&[Box::new(Data)])
                .unwrap()
                .into_iter()
                .collect();
            view.add(&self.to, &values).unwrap();
            view.remove(&self.from).unwrap();
        }
    }

    #[test]
    fn proxy_rejects_undeclared_keys() {
        let mut collection = Collection::empty(vec![Box::new(Data)]);
        collection
            .add(b"alice", &[FieldValue::Bytes(b"x".to_vec())])
            .unwrap();

        let mut proxy = Proxy::new(&mut collection, &[b"alice".to_vec()]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            proxy.get(b"bob");
        }));
        assert!(result.is_err());
    }

    #[test]
    fn proxy_allows_declared_keys_and_update_runs_end_to_end() {
        let mut collection = Collection::empty(vec![Box::new(Data)]);
        collection
            .add(b"alice", &[FieldValue::Bytes(b"payload".to_vec())])
            .unwrap();

        let update = RenameIfPresent {
            from: b"alice".to_vec(),
            to: b"alicia".to_vec(),
        };

        let mut proxy = Proxy::new(&mut collection, &update.keys());
        assert!(update.check(&proxy));
        update.apply(&mut proxy);

        assert!(!collection.get(b"alice").unwrap().matches());
        assert!(collection.get(b"alicia").unwrap().matches());
    }
}
