//! Property-style coverage of the universal invariants: path-independence
//! of removal, scope coherence after a transaction, and proof soundness
//! across arbitrary insert/remove traces.

use merkle_collection::field::{Data, FieldValue};
use merkle_collection::scope::Scope;
use merkle_collection::Collection;
use proptest::prelude::*;

fn empty_digest() -> merkle_collection::Digest {
    Collection::empty(vec![Box::new(Data)]).root_digest()
}

fn small_key() -> impl Strategy<Value = Vec<u8>> {
    (0u64..64).prop_map(|index| index.to_be_bytes().to_vec())
}

proptest! {
    /// Inserting then removing the same set of keys, in any order, always
    /// returns the tree to the empty-collection digest: removal must be
    /// path-independent.
    #[test]
    fn removal_is_path_independent(
        keys in prop::collection::hash_set(small_key(), 1..20),
        seed in any::<u64>(),
    ) {
        let mut keys: Vec<Vec<u8>> = keys.into_iter().collect();
        let mut collection = Collection::empty(vec![Box::new(Data)]);

        for key in &keys {
            collection.add(key, &[FieldValue::Bytes(vec![])]).unwrap();
        }
        prop_assert!(collection.debug_check_invariants().is_ok());

        // Deterministically shuffle the removal order from the seed so the
        // trace differs from the insertion order without depending on a
        // disallowed source of randomness inside the test body itself.
        let mut rng_state = seed;
        for index in (1..keys.len()).rev() {
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let swap_index = (rng_state % (index as u64 + 1)) as usize;
            keys.swap(index, swap_index);
        }

        for key in &keys {
            collection.remove(key).unwrap();
        }

        prop_assert_eq!(collection.root_digest(), empty_digest());
        prop_assert!(collection.debug_check_invariants().is_ok());
    }

    /// After `End()` on a transaction with `scope = none`, the root's
    /// grandchildren must not be known: a verifier-scoped transaction
    /// never retains materialization it shouldn't.
    #[test]
    fn scope_none_transaction_prunes_grandchildren(
        keys in prop::collection::hash_set(small_key(), 4..20),
    ) {
        let mut collection = Collection::empty(vec![Box::new(Data)]);
        collection.scope = Scope::none();

        collection.begin();
        for key in &keys {
            collection.add(key, &[FieldValue::Bytes(vec![])]).unwrap();
        }
        collection.end();

        prop_assert!(!collection.debug_any_grandchild_of_root_known());
    }

    /// A proof issued for any key in the tree is self-consistent, and its
    /// match/values agree with the corresponding direct record lookup.
    #[test]
    fn proof_soundness_matches_direct_lookup(
        keys in prop::collection::hash_set(small_key(), 1..20),
        query in small_key(),
    ) {
        let mut collection = Collection::empty(vec![Box::new(Data)]);
        for key in &keys {
            collection.add(key, &[FieldValue::Bytes(key.clone())]).unwrap();
        }

        let record = collection.get(&query).unwrap();
        let proof = collection.proof(&query).unwrap();

        prop_assert!(proof.consistent());
        prop_assert_eq!(proof.matches(), record.matches());

        if record.matches() {
            let proof_values = proof.values(collection.fields()).unwrap();
            let record_values = record.values(collection.fields()).unwrap();
            prop_assert_eq!(proof_values, record_values);
        } else {
            prop_assert!(proof.values(collection.fields()).is_err());
        }
    }
}
