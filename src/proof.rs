//! Proofs: the externally-transmissible witness along a root-to-leaf path.

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::bytes_util::bit;
use crate::error::CollectionError;
use crate::field::{Field, FieldValue};
use crate::hash::{internal_digest, leaf_digest, path_for_key};
use crate::node::NodeId;
use crate::Digest;

/// The serializable projection of a single node.
///
/// Leaf-ness in transit is encoded as `left_digest == right_digest ==` the
/// all-zero digest (§4.4, §6).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dump {
    pub digest: Digest,
    pub values: Vec<Vec<u8>>,
    pub key: Option<Vec<u8>>,
    pub left_digest: Digest,
    pub right_digest: Digest,
}

impl Dump {
    pub(crate) fn of(arena: &Arena, id: NodeId) -> Dump {
        let node = arena.get(id);

        if node.is_leaf() {
            Dump {
                digest: node.digest,
                values: node.values.clone(),
                key: Some(node.key.clone()),
                left_digest: Digest::default(),
                right_digest: Digest::default(),
            }
        } else {
            let left = arena.get(node.left.expect("internal node has a left child"));
            let right = arena.get(node.right.expect("internal node has a right child"));

            Dump {
                digest: node.digest,
                values: node.values.clone(),
                key: None,
                left_digest: left.digest,
                right_digest: right.digest,
            }
        }
    }

    /// Whether this dump represents a leaf: both carried child digests are
    /// the zero digest.
    pub fn is_leaf(&self) -> bool {
        self.left_digest == Digest::default() && self.right_digest == Digest::default()
    }

    /// Recomputes the digest using the tag/children rule of §3 and compares
    /// it against the carried digest.
    pub fn consistent(&self) -> bool {
        let expected = if self.is_leaf() {
            let key = match &self.key {
                Some(key) => key,
                None => return false,
            };
            leaf_digest(key, &self.values)
        } else {
            internal_digest(&self.values, self.left_digest, self.right_digest)
        };

        expected == self.digest
    }
}

/// A pair of sibling dumps at one depth of a proof.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub left: Dump,
    pub right: Dump,
}

/// A non-interactive witness along the root-to-leaf path for a key.
///
/// Contains the key, a dump of the root, and an ordered sequence of steps
/// from depth 0 down to the depth at which either side is a leaf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    pub key: Vec<u8>,
    pub root: Dump,
    pub steps: Vec<Step>,
}

impl Proof {
    /// Whether every step is internally consistent, chains the digests
    /// carried by the parent at each depth, and the final step reaches a
    /// leaf on the side indicated by the key's path bit.
    pub fn consistent(&self) -> bool {
        if self.steps.is_empty() {
            return false;
        }

        if !self.root.consistent() {
            return false;
        }

        let path = path_for_key(&self.key);
        let mut parent = &self.root;

        for (depth, step) in self.steps.iter().enumerate() {
            if !step.left.consistent() || !step.right.consistent() {
                return false;
            }

            if parent.left_digest != step.left.digest || parent.right_digest != step.right.digest {
                return false;
            }

            let is_last = depth + 1 == self.steps.len();
            let taken = if bit(&path.0, depth) {
                &step.right
            } else {
                &step.left
            };

            if is_last {
                if !taken.is_leaf() {
                    return false;
                }
            } else if taken.is_leaf() {
                // The path reached a leaf earlier than the last recorded
                // step: the proof is malformed.
                return false;
            }

            parent = if bit(&path.0, depth) {
                &step.right
            } else {
                &step.left
            };
        }

        true
    }

    /// Whether the terminal leaf's key equals this proof's key.
    pub fn matches(&self) -> bool {
        if self.steps.is_empty() {
            return false;
        }

        let path = path_for_key(&self.key);
        let depth = self.steps.len() - 1;
        let terminal = if bit(&path.0, depth) {
            &self.steps[depth].right
        } else {
            &self.steps[depth].left
        };

        terminal.key.as_deref() == Some(self.key.as_slice())
    }

    /// The terminal leaf's decoded values, if [`Proof::matches`].
    pub fn values(&self, fields: &[Box<dyn Field>]) -> Result<Vec<FieldValue>, CollectionError> {
        if !self.matches() {
            return Err(CollectionError::NoMatchFound);
        }

        let path = path_for_key(&self.key);
        let depth = self.steps.len() - 1;
        let terminal = if bit(&path.0, depth) {
            &self.steps[depth].right
        } else {
            &self.steps[depth].left
        };

        if terminal.values.len() != fields.len() {
            return Err(CollectionError::WrongNumberOfValues);
        }

        terminal
            .values
            .iter()
            .zip(fields.iter())
            .map(|(raw, field)| {
                field
                    .decode(raw)
                    .map_err(|_| CollectionError::WrongNumberOfValues)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Data, Stake64};

    #[test]
    fn dump_consistent_detects_tampering() {
        let mut dump = Dump {
            digest: Digest::default(),
            values: vec![vec![1, 2, 3]],
            key: Some(b"k".to_vec()),
            left_digest: Digest::default(),
            right_digest: Digest::default(),
        };
        dump.digest = leaf_digest(b"k", &dump.values);
        assert!(dump.consistent());

        dump.digest.0[0] ^= 0xff;
        assert!(!dump.consistent());
    }

    #[test]
    fn empty_step_proof_is_inconsistent_and_not_matching() {
        let proof = Proof {
            key: b"k".to_vec(),
            root: Dump {
                digest: Digest::default(),
                values: vec![],
                key: None,
                left_digest: Digest::default(),
                right_digest: Digest::default(),
            },
            steps: vec![],
        };

        assert!(!proof.consistent());
        assert!(!proof.matches());
        assert!(proof
            .values(&[Box::new(Data) as Box<dyn Field>])
            .is_err());
    }

    #[test]
    fn values_respects_field_count() {
        let fields: Vec<Box<dyn Field>> = vec![Box::new(Stake64), Box::new(Data)];
        assert_eq!(fields.len(), 2);
    }
}
