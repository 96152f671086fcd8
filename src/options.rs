//! Lookup options: lifecycle and fallback policy
//!
//! Options are keyed either by a bare type name (`"service"`) or a full
//! specifier (`"service:mailer"`). Specifier-level settings beat type-level
//! settings for the same key; the merged view a lookup actually acts on is
//! computed by [`OptionStore::effective`].

use crate::specifier::validate_type_name;
use crate::{Result, Specifier};
use ahash::RandomState;
use dashmap::DashMap;

/// One configurable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOption {
    /// Cache the first constructed instance for the container's lifetime.
    /// Default: `false`.
    Singleton(bool),
    /// Instantiate the definition on lookup. When `false`, the registered
    /// payload is returned as-is. Default: `true`.
    Instantiate(bool),
    /// Alternate specifiers tried, in order, when the primary specifier is
    /// unresolved anywhere in the chain. Default: empty.
    Fallbacks(Vec<Specifier>),
}

/// Key selecting one option for [`Container::get_option`](crate::Container::get_option).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Singleton,
    Instantiate,
    Fallbacks,
}

/// Options stored for one type or one specifier. Unset fields defer to the
/// next level (type level, then the defaults).
#[derive(Debug, Clone, Default)]
struct OptionSlot {
    singleton: Option<bool>,
    instantiate: Option<bool>,
    fallbacks: Option<Vec<Specifier>>,
}

impl OptionSlot {
    fn apply(&mut self, option: LookupOption) {
        match option {
            LookupOption::Singleton(v) => self.singleton = Some(v),
            LookupOption::Instantiate(v) => self.instantiate = Some(v),
            LookupOption::Fallbacks(v) => self.fallbacks = Some(v),
        }
    }

    fn get(&self, key: OptionKey) -> Option<LookupOption> {
        match key {
            OptionKey::Singleton => self.singleton.map(LookupOption::Singleton),
            OptionKey::Instantiate => self.instantiate.map(LookupOption::Instantiate),
            OptionKey::Fallbacks => self.fallbacks.clone().map(LookupOption::Fallbacks),
        }
    }
}

/// The merged option view a single lookup acts on.
#[derive(Debug, Clone)]
pub(crate) struct EffectiveOptions {
    pub singleton: bool,
    pub instantiate: bool,
    pub fallbacks: Vec<Specifier>,
}

/// Per-type and per-specifier option storage.
pub(crate) struct OptionStore {
    by_type: DashMap<String, OptionSlot, RandomState>,
    by_specifier: DashMap<Specifier, OptionSlot, RandomState>,
}

impl OptionStore {
    pub fn new() -> Self {
        Self {
            by_type: DashMap::with_hasher(RandomState::new()),
            by_specifier: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Store an option under a type or specifier key.
    pub fn set(&self, type_or_specifier: &str, option: LookupOption) -> Result<()> {
        if type_or_specifier.contains(':') {
            let specifier = Specifier::parse(type_or_specifier)?;
            self.by_specifier.entry(specifier).or_default().apply(option);
        } else {
            validate_type_name(type_or_specifier)?;
            self.by_type
                .entry(type_or_specifier.to_owned())
                .or_default()
                .apply(option);
        }
        Ok(())
    }

    /// Store an option directly under a specifier key.
    pub fn set_for_specifier(&self, specifier: Specifier, option: LookupOption) {
        self.by_specifier.entry(specifier).or_default().apply(option);
    }

    /// Read the exact slot (no merging) for a type or specifier key.
    pub fn get(&self, type_or_specifier: &str, key: OptionKey) -> Result<Option<LookupOption>> {
        if type_or_specifier.contains(':') {
            let specifier = Specifier::parse(type_or_specifier)?;
            Ok(self
                .by_specifier
                .get(&specifier)
                .and_then(|slot| slot.get(key)))
        } else {
            validate_type_name(type_or_specifier)?;
            Ok(self
                .by_type
                .get(type_or_specifier)
                .and_then(|slot| slot.get(key)))
        }
    }

    /// Remove the specifier-level slot for a specifier.
    pub fn remove_specifier(&self, specifier: &Specifier) {
        self.by_specifier.remove(specifier);
    }

    /// Merge specifier-level over type-level over defaults, per key.
    pub fn effective(&self, specifier: &Specifier) -> EffectiveOptions {
        let spec_slot = self
            .by_specifier
            .get(specifier)
            .map(|slot| slot.value().clone())
            .unwrap_or_default();
        let type_slot = self
            .by_type
            .get(specifier.type_name())
            .map(|slot| slot.value().clone())
            .unwrap_or_default();

        EffectiveOptions {
            singleton: spec_slot.singleton.or(type_slot.singleton).unwrap_or(false),
            instantiate: spec_slot
                .instantiate
                .or(type_slot.instantiate)
                .unwrap_or(true),
            fallbacks: spec_slot
                .fallbacks
                .or(type_slot.fallbacks)
                .unwrap_or_default(),
        }
    }
}

impl Default for OptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(s: &str) -> Specifier {
        Specifier::parse(s).unwrap()
    }

    #[test]
    fn test_defaults() {
        let store = OptionStore::new();
        let eff = store.effective(&spec("service:db"));
        assert!(!eff.singleton);
        assert!(eff.instantiate);
        assert!(eff.fallbacks.is_empty());
    }

    #[test]
    fn test_type_level_option_applies_to_all_names() {
        let store = OptionStore::new();
        store.set("service", LookupOption::Singleton(true)).unwrap();

        assert!(store.effective(&spec("service:db")).singleton);
        assert!(store.effective(&spec("service:mailer")).singleton);
        assert!(!store.effective(&spec("action:index")).singleton);
    }

    #[test]
    fn test_specifier_level_beats_type_level() {
        let store = OptionStore::new();
        store.set("service", LookupOption::Singleton(true)).unwrap();
        store
            .set("service:db", LookupOption::Singleton(false))
            .unwrap();

        assert!(!store.effective(&spec("service:db")).singleton);
        assert!(store.effective(&spec("service:mailer")).singleton);
    }

    #[test]
    fn test_merge_is_per_key() {
        let store = OptionStore::new();
        store.set("foo", LookupOption::Singleton(true)).unwrap();
        store
            .set("foo:bar", LookupOption::Instantiate(false))
            .unwrap();

        let eff = store.effective(&spec("foo:bar"));
        // singleton comes from the type level even though the specifier
        // slot exists for another key
        assert!(eff.singleton);
        assert!(!eff.instantiate);
    }

    #[test]
    fn test_get_reads_exact_slot_only() {
        let store = OptionStore::new();
        store.set("foo", LookupOption::Singleton(true)).unwrap();

        assert_eq!(
            store.get("foo", OptionKey::Singleton).unwrap(),
            Some(LookupOption::Singleton(true))
        );
        // No merging on reads: the specifier slot is empty
        assert_eq!(store.get("foo:bar", OptionKey::Singleton).unwrap(), None);
    }

    #[test]
    fn test_fallbacks_round_trip() {
        let store = OptionStore::new();
        store
            .set(
                "serializer",
                LookupOption::Fallbacks(vec![spec("serializer:application")]),
            )
            .unwrap();

        let eff = store.effective(&spec("serializer:post"));
        assert_eq!(eff.fallbacks, vec![spec("serializer:application")]);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let store = OptionStore::new();
        assert!(store.set("", LookupOption::Singleton(true)).is_err());
        assert!(store.set("a:b:c", LookupOption::Singleton(true)).is_err());
        assert!(store.set(":", LookupOption::Singleton(true)).is_err());
    }
}
