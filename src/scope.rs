//! Scope: the set of bit-prefix patterns that determine which subtree paths
//! a collection (or verifier) keeps materialized.

use crate::bytes_util::prefix_match;
use crate::Digest;

/// A single bit-prefix pattern: the first `bits` bits of `value` must match.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Mask {
    value: Vec<u8>,
    bits: usize,
}

impl Mask {
    fn matches(&self, path: &Digest) -> bool {
        prefix_match(&path.0, &self.value, self.bits)
    }
}

/// The set of prefix masks delimiting which tree paths are materialized.
///
/// An empty mask set falls back to `all`: `true` retains everything, `false`
/// retains nothing. Once any mask is added, matching is purely mask-driven.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    masks: Vec<Mask>,
    all: bool,
}

impl Scope {
    /// A scope that matches every path.
    pub fn all() -> Self {
        Scope {
            masks: Vec::new(),
            all: true,
        }
    }

    /// A scope that matches no path.
    pub fn none() -> Self {
        Scope {
            masks: Vec::new(),
            all: false,
        }
    }

    /// Resets this scope to match every path, clearing any masks.
    pub fn set_all(&mut self) {
        self.all = true;
        self.masks.clear();
    }

    /// Resets this scope to match no path, clearing any masks.
    pub fn set_none(&mut self) {
        self.all = false;
        self.masks.clear();
    }

    /// Adds a prefix mask: any path whose first `bits` bits equal those of
    /// `value` will be considered in-scope.
    pub fn add(&mut self, value: impl Into<Vec<u8>>, bits: usize) {
        self.masks.push(Mask {
            value: value.into(),
            bits,
        });
    }

    /// Whether `path` falls within this scope.
    pub(crate) fn matches(&self, path: &Digest) -> bool {
        if self.masks.is_empty() {
            return self.all;
        }
        self.masks.iter().any(|mask| mask.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_masks_fall_back_to_all_flag() {
        let all = Scope::all();
        let none = Scope::none();
        let path = Digest([0xaa; 32]);
        assert!(all.matches(&path));
        assert!(!none.matches(&path));
    }

    #[test]
    fn mask_matches_prefix() {
        let mut scope = Scope::none();
        scope.add(vec![0xff], 4);
        let mut matching = Digest([0; 32]);
        matching.0[0] = 0xf0;
        let mut non_matching = Digest([0; 32]);
        non_matching.0[0] = 0x0f;
        assert!(scope.matches(&matching));
        assert!(!scope.matches(&non_matching));
    }

    #[test]
    fn any_mask_matching_is_sufficient() {
        let mut scope = Scope::none();
        scope.add(vec![0x00], 1);
        scope.add(vec![0xff], 3);
        scope.add(vec![0xd2], 6);

        let mut first = Digest([0; 32]);
        first.0[0] = 0b0000_0000;
        let mut second = Digest([0; 32]);
        second.0[0] = 0b1110_0000;
        let mut unmatched = Digest([0; 32]);
        unmatched.0[0] = 0b1000_0000;

        assert!(scope.matches(&first));
        assert!(scope.matches(&second));
        assert!(!scope.matches(&unmatched));
    }
}
