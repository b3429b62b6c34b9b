//! Construction-time configuration for a [`crate::Collection`].
//!
//! The spec is explicit that there is no file/CLI/environment
//! configuration surface (§6). What's here instead is the in-process
//! builder that lets a caller set the initial `scope`/`auto_collect`
//! defaults without growing [`crate::Collection::empty`]'s own signature,
//! the way the teacher's tree construction takes a reader/writer pair
//! rather than a long parameter list.

use crate::field::Field;
use crate::scope::Scope;
use crate::Collection;

/// Builds a [`Collection`] with non-default initial `scope`/`auto_collect`.
///
/// Most callers should just use [`Collection::empty`] or
/// [`Collection::empty_verifier`] directly; this exists for the less
/// common case of constructing a verifier that already knows it will only
/// ever care about a restricted set of paths.
#[derive(Debug, Default)]
pub struct CollectionConfig {
    scope: Option<Scope>,
    auto_collect: Option<bool>,
}

impl CollectionConfig {
    pub fn new() -> Self {
        CollectionConfig::default()
    }

    /// Overrides the collection's initial scope.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Overrides whether `collect()` runs automatically after each
    /// mutation or transaction.
    pub fn auto_collect(mut self, enabled: bool) -> Self {
        self.auto_collect = Some(enabled);
        self
    }

    /// Builds a fully materialized collection (as [`Collection::empty`])
    /// with this configuration's overrides applied.
    pub fn build(self, fields: Vec<Box<dyn Field>>) -> Collection {
        self.apply(Collection::empty(fields))
    }

    /// Builds a pruned verifier (as [`Collection::empty_verifier`]) with
    /// this configuration's overrides applied.
    pub fn build_verifier(self, fields: Vec<Box<dyn Field>>) -> Collection {
        self.apply(Collection::empty_verifier(fields))
    }

    fn apply(self, mut collection: Collection) -> Collection {
        if let Some(scope) = self.scope {
            collection.scope = scope;
        }
        if let Some(auto_collect) = self.auto_collect {
            if auto_collect {
                collection.enable_auto_collect();
            } else {
                collection.disable_auto_collect();
            }
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Data;

    #[test]
    fn default_config_matches_plain_empty() {
        let plain = Collection::empty(vec![Box::new(Data)]);
        let configured = CollectionConfig::new().build(vec![Box::new(Data)]);
        assert_eq!(plain.root_digest(), configured.root_digest());
    }

    #[test]
    fn scope_override_takes_effect() {
        let collection = CollectionConfig::new()
            .scope(Scope::none())
            .auto_collect(false)
            .build(vec![Box::new(Data)]);
        assert!(!collection.scope.matches(&crate::hash::path_for_key(b"x")));
    }
}
