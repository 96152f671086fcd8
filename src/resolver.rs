//! Per-bundle resolution: specifier -> definition within one bundle
//!
//! A [`Resolver`] answers "does bundle B define specifier S, and if so, what
//! is it?" for exactly one bundle. Manual registrations always shadow
//! scanned/discovered entries, and a per-type [`TypeStrategy`] can hook both
//! retrieval and enumeration for a single type. Absence is a normal outcome
//! at this layer: `retrieve` returns `None`, never an error - the container
//! decides when exhaustion becomes a failure.

use crate::definition::Definition;
use crate::entries::EntryMap;
use crate::Specifier;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Custom resolution hook for a single type.
///
/// Installed on a resolver via [`Resolver::set_strategy`], a strategy is
/// consulted after manual registrations but before scanned entries for
/// specifiers of its type. The enumeration hook is optional; returning
/// `None` from [`TypeStrategy::available`] falls back to the generic
/// enumeration of manual plus scanned entries.
pub trait TypeStrategy: Send + Sync {
    /// Resolve `type:name`, or `None` if this strategy has no answer.
    fn retrieve(&self, type_name: &str, name: &str) -> Option<Definition>;

    /// Enumerate the names this strategy knows for its type.
    ///
    /// `None` means "no enumeration support" (generic enumeration applies),
    /// which is distinct from `Some(vec![])` ("I enumerate, and have none").
    fn available(&self, type_name: &str) -> Option<Vec<String>> {
        let _ = type_name;
        None
    }
}

/// Resolves specifiers within a single bundle.
///
/// Retrieval precedence, most to least specific:
///
/// 1. manual registrations ([`Resolver::register`])
/// 2. the type's [`TypeStrategy`], if one is installed
/// 3. scanned entries ([`Resolver::discover`], recorded by the packaging
///    layer in discovery order)
///
/// # Examples
///
/// ```rust
/// use strata_di::{Definition, Resolver};
///
/// let resolver = Resolver::new("app");
/// resolver.register("config:environment".parse().unwrap(), Definition::value("production"));
///
/// let spec = "config:environment".parse().unwrap();
/// assert!(resolver.retrieve(&spec).is_some());
/// ```
pub struct Resolver {
    /// Bundle name, surfaced in not-found diagnostics
    name: String,
    /// Manual registrations - always win within this resolver
    manual: EntryMap,
    /// Entries recorded by bundle scanning, in discovery order
    scanned: EntryMap,
    /// Per-type resolution strategies
    strategies: DashMap<String, Arc<dyn TypeStrategy>, RandomState>,
}

impl Resolver {
    /// Create an empty resolver for the named bundle.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();

        #[cfg(feature = "logging")]
        debug!(target: "strata_di", bundle = %name, "Creating resolver");

        Self {
            name,
            manual: EntryMap::new(),
            scanned: EntryMap::new(),
            strategies: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// The bundle name this resolver serves.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a manual entry, overwriting any prior manual entry for the same
    /// specifier. Scanned entries are unaffected.
    pub fn register(&self, specifier: Specifier, definition: Definition) {
        #[cfg(feature = "logging")]
        debug!(
            target: "strata_di",
            bundle = %self.name,
            specifier = %specifier,
            entry_type = definition.type_name(),
            "Registering manual entry"
        );

        self.manual.insert(specifier, definition);
    }

    /// Record a scanned entry in discovery order.
    ///
    /// The packaging/build layer calls this while walking a bundle's source
    /// tree; manual registrations shadow whatever lands here.
    pub fn discover(&self, specifier: Specifier, definition: Definition) {
        #[cfg(feature = "logging")]
        trace!(
            target: "strata_di",
            bundle = %self.name,
            specifier = %specifier,
            "Recording discovered entry"
        );

        self.scanned.insert(specifier, definition);
    }

    /// Install a custom resolution strategy for one type.
    pub fn set_strategy(&self, type_name: impl Into<String>, strategy: Arc<dyn TypeStrategy>) {
        self.strategies.insert(type_name.into(), strategy);
    }

    /// Resolve a specifier within this bundle.
    ///
    /// Returns `None` when nothing matches; absence is an expected outcome
    /// here, not an error.
    pub fn retrieve(&self, specifier: &Specifier) -> Option<Definition> {
        if let Some(definition) = self.manual.get(specifier) {
            #[cfg(feature = "logging")]
            trace!(
                target: "strata_di",
                bundle = %self.name,
                specifier = %specifier,
                source = "manual",
                "Resolved entry"
            );
            return Some(definition);
        }

        if let Some(strategy) = self.strategies.get(specifier.type_name()) {
            if let Some(definition) = strategy.retrieve(specifier.type_name(), specifier.name()) {
                #[cfg(feature = "logging")]
                trace!(
                    target: "strata_di",
                    bundle = %self.name,
                    specifier = %specifier,
                    source = "strategy",
                    "Resolved entry"
                );
                return Some(definition);
            }
        }

        self.scanned.get(specifier)
    }

    /// Enumerate the full specifiers known to this resolver for a type.
    ///
    /// A strategy's enumeration takes over when it provides one; otherwise
    /// manual entries (registration order) come first, then scanned entries
    /// (discovery order), de-duplicated.
    pub fn available_for_type(&self, type_name: &str) -> Vec<Specifier> {
        if let Some(strategy) = self.strategies.get(type_name) {
            if let Some(names) = strategy.available(type_name) {
                return names
                    .iter()
                    .filter_map(|name| Specifier::new(type_name, name).ok())
                    .collect();
            }
        }

        let mut specifiers = self.manual.specifiers_for_type(type_name);
        for specifier in self.scanned.specifiers_for_type(type_name) {
            if !specifiers.contains(&specifier) {
                specifiers.push(specifier);
            }
        }
        specifiers
    }

    /// Remove a manual entry. Returns true if one existed. Scanned entries
    /// are unaffected.
    pub fn unregister(&self, specifier: &Specifier) -> bool {
        self.manual.remove(specifier)
    }

    /// Manually registered specifiers, in registration order. Feeds the
    /// not-found diagnostic.
    pub fn registered_specifiers(&self) -> Vec<Specifier> {
        self.manual.specifiers()
    }

    /// Total entries (manual + scanned).
    pub fn len(&self) -> usize {
        self.manual.len() + self.scanned.len()
    }

    /// Check if this resolver holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("name", &self.name)
            .field("manual", &self.manual.len())
            .field("scanned", &self.scanned.len())
            .finish()
    }
}
