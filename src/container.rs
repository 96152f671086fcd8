//! The container: chain-of-resolvers lookup authority
//!
//! The `Container` is the single point of truth for specifier -> value across
//! a whole application. It holds an ordered chain of per-bundle resolvers
//! (built breadth-first by [`Container::load_bundle`]), per-type and
//! per-specifier options, and a cache of instantiated singletons. Direct
//! registrations live in a synthetic top-priority resolver consulted before
//! the chain, so the application always wins ties against its add-ons.

use crate::bundle::Bundle;
use crate::definition::Definition;
use crate::inject::ResolutionGuard;
use crate::options::{EffectiveOptions, LookupOption, OptionKey, OptionStore};
use crate::resolver::Resolver;
use crate::specifier::validate_type_name;
use crate::{ContainerError, Result, Specifier};
use ahash::RandomState;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Name of the synthetic resolver holding direct registrations.
const REGISTRATIONS: &str = "registrations";

/// A cached singleton instance plus its type name for diagnostics.
#[derive(Clone)]
struct CachedInstance {
    instance: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Per-entry lifecycle overrides passed to [`Container::register_with`].
///
/// Stored as specifier-level options for the registered entry; unset fields
/// defer to type-level options and the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationOptions {
    singleton: Option<bool>,
    instantiate: Option<bool>,
}

impl RegistrationOptions {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the singleton flag for this entry.
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = Some(singleton);
        self
    }

    /// Override the instantiate flag for this entry.
    pub fn instantiate(mut self, instantiate: bool) -> Self {
        self.instantiate = Some(instantiate);
        self
    }
}

/// String-keyed, bundle-layered lookup container.
///
/// Cheap to clone - clones share all internal state. Lookups are synchronous
/// and perform no I/O; all shared state lives in lock-free maps, so the
/// container is `Send + Sync` even though the resolution model is
/// single-threaded.
///
/// # Examples
///
/// ```rust
/// use strata_di::{Container, Definition, LookupOption};
///
/// #[derive(Clone)]
/// struct Store { backend: String }
///
/// let container = Container::new();
/// container.set_option("service", LookupOption::Singleton(true)).unwrap();
/// container
///     .register("service:store", Definition::factory(|| Store {
///         backend: "memory".into(),
///     }))
///     .unwrap();
///
/// let a = container.lookup::<Store>("service:store").unwrap();
/// let b = container.lookup::<Store>("service:store").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone)]
pub struct Container {
    /// Synthetic top-priority resolver for direct registrations
    registrations: Arc<Resolver>,
    /// Resolver chain, fixed once by `load_bundle`
    chain: Arc<OnceCell<Vec<Arc<Resolver>>>>,
    /// Instantiated singletons, keyed by the specifier they resolved under
    cache: Arc<DashMap<Specifier, CachedInstance, RandomState>>,
    /// Per-type and per-specifier options
    options: Arc<OptionStore>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "strata_di", "Creating container");

        Self {
            registrations: Arc::new(Resolver::new(REGISTRATIONS)),
            chain: Arc::new(OnceCell::new()),
            cache: Arc::new(DashMap::with_hasher(RandomState::new())),
            options: Arc::new(OptionStore::new()),
        }
    }

    // =========================================================================
    // Bundle loading
    // =========================================================================

    /// Build the resolver chain from a bundle graph.
    ///
    /// Breadth-first traversal starting at `root`: the root's resolver is
    /// appended first, then its direct children, then their children,
    /// skipping bundle names already visited. Sibling order within each level
    /// is exactly the order [`Bundle::children`] returns, so all of a
    /// bundle's siblings precede any of their nested children in the chain.
    /// The resulting precedence order means the application shadows its
    /// add-ons, and shallower add-ons shadow deeper ones.
    ///
    /// May succeed exactly once; a second call fails with
    /// [`ContainerError::BundleAlreadyLoaded`].
    pub fn load_bundle(&self, root: &dyn Bundle) -> Result<()> {
        if self.chain.get().is_some() {
            return Err(ContainerError::BundleAlreadyLoaded);
        }

        let mut chain: Vec<Arc<Resolver>> = Vec::new();
        let mut visited: HashSet<String, RandomState> = HashSet::with_hasher(RandomState::new());
        let mut queue: VecDeque<Arc<dyn Bundle>> = VecDeque::new();

        visited.insert(root.name().to_owned());
        chain.push(Arc::new(root.load()));
        queue.extend(root.children());

        while let Some(bundle) = queue.pop_front() {
            if !visited.insert(bundle.name().to_owned()) {
                continue;
            }
            chain.push(Arc::new(bundle.load()));
            queue.extend(bundle.children());
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "strata_di",
            resolvers = ?chain.iter().map(|r| r.name().to_owned()).collect::<Vec<_>>(),
            "Loaded bundle graph"
        );

        self.chain
            .set(chain)
            .map_err(|_| ContainerError::BundleAlreadyLoaded)
    }

    fn chain_resolvers(&self) -> &[Arc<Resolver>] {
        self.chain.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolver names in precedence order, the synthetic registrations
    /// resolver first. Useful for boot diagnostics.
    pub fn resolver_names(&self) -> Vec<String> {
        let mut names = vec![self.registrations.name().to_owned()];
        names.extend(self.chain_resolvers().iter().map(|r| r.name().to_owned()));
        names
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a definition directly on the container.
    ///
    /// Direct registrations take precedence over every bundle resolver. If a
    /// singleton instance is already cached under this specifier, explicit
    /// re-registration evicts it.
    pub fn register(&self, specifier: &str, definition: Definition) -> Result<()> {
        self.register_with(specifier, definition, RegistrationOptions::new())
    }

    /// Register with per-entry lifecycle overrides.
    pub fn register_with(
        &self,
        specifier: &str,
        definition: Definition,
        options: RegistrationOptions,
    ) -> Result<()> {
        let specifier = Specifier::parse(specifier)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "strata_di",
            specifier = %specifier,
            entry_type = definition.type_name(),
            "Registering on container"
        );

        // Explicit re-registration clears the stale singleton
        if self.cache.remove(&specifier).is_some() {
            #[cfg(feature = "logging")]
            debug!(
                target: "strata_di",
                specifier = %specifier,
                "Evicted cached singleton on re-registration"
            );
        }

        if let Some(singleton) = options.singleton {
            self.options
                .set_for_specifier(specifier.clone(), LookupOption::Singleton(singleton));
        }
        if let Some(instantiate) = options.instantiate {
            self.options
                .set_for_specifier(specifier.clone(), LookupOption::Instantiate(instantiate));
        }

        self.registrations.register(specifier, definition);
        Ok(())
    }

    /// Register a ready value under a specifier.
    pub fn register_value<T: Send + Sync + 'static>(&self, specifier: &str, value: T) -> Result<()> {
        self.register(specifier, Definition::value(value))
    }

    /// Register a constructor closure under a specifier.
    pub fn register_factory<T, F>(&self, specifier: &str, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(specifier, Definition::factory(factory))
    }

    /// Register a constructor whose product declares injected fields.
    pub fn register_injectable<T, F>(&self, specifier: &str, factory: F) -> Result<()>
    where
        T: crate::Inject + Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(specifier, Definition::injectable(factory))
    }

    /// Remove a direct registration along with the specifier's cached
    /// singleton and specifier-level options.
    pub fn unregister(&self, specifier: &str) -> Result<()> {
        let specifier = Specifier::parse(specifier)?;
        self.registrations.unregister(&specifier);
        self.cache.remove(&specifier);
        self.options.remove_specifier(&specifier);
        Ok(())
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Set an option for a bare type (`"service"`) or a full specifier
    /// (`"service:mailer"`). Specifier-level settings beat type-level
    /// settings for the same key.
    pub fn set_option(&self, type_or_specifier: &str, option: LookupOption) -> Result<()> {
        self.options.set(type_or_specifier, option)
    }

    /// Read the exact option slot for a type or specifier. No merging: a
    /// type-level setting is not visible through a specifier key.
    pub fn get_option(
        &self,
        type_or_specifier: &str,
        key: OptionKey,
    ) -> Result<Option<LookupOption>> {
        self.options.get(type_or_specifier, key)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Look up a specifier and downcast the result.
    ///
    /// Fails with [`ContainerError::EntryNotFound`] when the full chain
    /// (including fallbacks) is exhausted, or
    /// [`ContainerError::TypeMismatch`] when the entry is not a `T`.
    pub fn lookup<T: Send + Sync + 'static>(&self, specifier: &str) -> Result<Arc<T>> {
        let specifier = Specifier::parse(specifier)?;
        let (instance, type_name) = self.lookup_entry(&specifier)?;
        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::type_mismatch::<T>(specifier, type_name))
    }

    /// Look up a specifier without recovering a static type.
    pub fn lookup_erased(&self, specifier: &str) -> Result<Arc<dyn Any + Send + Sync>> {
        let specifier = Specifier::parse(specifier)?;
        Ok(self.lookup_entry(&specifier)?.0)
    }

    /// Erased lookup for an already-parsed specifier. Used by injectable
    /// constructors filling their fields.
    pub(crate) fn lookup_specifier(&self, specifier: &Specifier) -> Result<Arc<dyn Any + Send + Sync>> {
        Ok(self.lookup_entry(specifier)?.0)
    }

    /// Look up every available name under a type.
    ///
    /// Merges `available_for_type` across the whole chain (earlier resolvers
    /// shadow later ones on name collisions) and runs each name through the
    /// full lookup path. The first failure propagates - a partial service
    /// map is more dangerous than a hard failure at boot.
    pub fn lookup_all<T: Send + Sync + 'static>(
        &self,
        type_name: &str,
    ) -> Result<HashMap<String, Arc<T>>> {
        let mut all = HashMap::new();
        for name in self.available_for_type(type_name)? {
            let specifier = Specifier::new(type_name, name.as_str())?;
            let (instance, entry_type) = self.lookup_entry(&specifier)?;
            let typed = instance
                .downcast::<T>()
                .map_err(|_| ContainerError::type_mismatch::<T>(specifier, entry_type))?;
            all.insert(name, typed);
        }
        Ok(all)
    }

    /// De-duplicated, precedence-ordered names available under a type across
    /// the whole resolver chain.
    pub fn available_for_type(&self, type_name: &str) -> Result<Vec<String>> {
        validate_type_name(type_name)?;

        let mut names: Vec<String> = Vec::new();
        let chain = self.chain_resolvers();
        for resolver in std::iter::once(&self.registrations).chain(chain.iter()) {
            for specifier in resolver.available_for_type(type_name) {
                if !names.iter().any(|n| n == specifier.name()) {
                    names.push(specifier.name().to_owned());
                }
            }
        }
        Ok(names)
    }

    /// Presence probe: can this specifier be resolved (directly or through a
    /// fallback)? No instantiation, no caching.
    pub fn has(&self, specifier: &str) -> bool {
        let Ok(specifier) = Specifier::parse(specifier) else {
            return false;
        };
        if self.cache.contains_key(&specifier) || self.find_definition(&specifier).is_some() {
            return true;
        }
        self.options
            .effective(&specifier)
            .fallbacks
            .iter()
            .any(|fb| self.cache.contains_key(fb) || self.find_definition(fb).is_some())
    }

    /// Raw definition access: the definition a lookup would use, without
    /// instantiating or caching anything.
    pub fn definition_for(&self, specifier: &str) -> Option<Definition> {
        let specifier = Specifier::parse(specifier).ok()?;
        if let Some(definition) = self.find_definition(&specifier) {
            return Some(definition);
        }
        self.options
            .effective(&specifier)
            .fallbacks
            .iter()
            .find_map(|fb| self.find_definition(fb))
    }

    /// Drop every cached singleton. Intended for test-scope teardown;
    /// definitions, options, and the resolver chain are untouched.
    pub fn clear_cache(&self) {
        let count = self.cache.len();
        self.cache.clear();

        #[cfg(feature = "logging")]
        debug!(
            target: "strata_di",
            instances_dropped = count,
            "Cleared singleton cache"
        );
        #[cfg(not(feature = "logging"))]
        let _ = count;
    }

    // =========================================================================
    // Resolution internals
    // =========================================================================

    fn lookup_entry(&self, specifier: &Specifier) -> Result<(Arc<dyn Any + Send + Sync>, &'static str)> {
        // Primary: cache, then chain walk
        if let Some(hit) = self.cached(specifier) {
            return Ok(hit);
        }
        if let Some(definition) = self.find_definition(specifier) {
            return self.materialize(specifier, &definition);
        }

        // Fallbacks retry the cache + chain steps only, each lookup adopting
        // the fallback's own options and cache slot
        for fallback in &self.options.effective(specifier).fallbacks {
            if fallback == specifier {
                continue;
            }

            #[cfg(feature = "logging")]
            trace!(
                target: "strata_di",
                specifier = %specifier,
                fallback = %fallback,
                "Primary specifier unresolved, trying fallback"
            );

            if let Some(hit) = self.cached(fallback) {
                return Ok(hit);
            }
            if let Some(definition) = self.find_definition(fallback) {
                return self.materialize(fallback, &definition);
            }
        }

        Err(self.not_found(specifier))
    }

    fn cached(&self, specifier: &Specifier) -> Option<(Arc<dyn Any + Send + Sync>, &'static str)> {
        self.cache.get(specifier).map(|entry| {
            #[cfg(feature = "logging")]
            trace!(
                target: "strata_di",
                specifier = %specifier,
                "Returning cached singleton"
            );
            (Arc::clone(&entry.instance), entry.type_name)
        })
    }

    /// Walk the chain in precedence order; the first resolver with an answer
    /// wins.
    fn find_definition(&self, specifier: &Specifier) -> Option<Definition> {
        if let Some(definition) = self.registrations.retrieve(specifier) {
            return Some(definition);
        }
        for resolver in self.chain_resolvers() {
            if let Some(definition) = resolver.retrieve(specifier) {
                #[cfg(feature = "logging")]
                trace!(
                    target: "strata_di",
                    specifier = %specifier,
                    resolver = resolver.name(),
                    "Resolved from bundle resolver"
                );
                return Some(definition);
            }
        }
        None
    }

    /// Apply lifecycle policy to a resolved definition. Nothing is cached
    /// until construction has succeeded, so a failed lookup leaves the
    /// container unchanged.
    fn materialize(
        &self,
        specifier: &Specifier,
        definition: &Definition,
    ) -> Result<(Arc<dyn Any + Send + Sync>, &'static str)> {
        let EffectiveOptions {
            singleton,
            instantiate,
            ..
        } = self.options.effective(specifier);

        if !instantiate {
            return Ok((definition.payload(), definition.type_name()));
        }

        if singleton && !definition.is_constructor() {
            // A bare value cannot satisfy a singleton entry; this usually
            // means a missing constructor registration
            return Err(ContainerError::EntryNotAConstructor {
                specifier: specifier.clone(),
                type_name: definition.type_name(),
            });
        }

        if !definition.is_constructor() {
            return Ok((definition.resolve(self)?, definition.type_name()));
        }

        // Constructors may re-enter lookup through injected fields; the
        // guard turns a revisit into an error instead of a stack overflow
        let _guard = ResolutionGuard::enter(specifier)?;
        let instance = definition.resolve(self)?;

        if singleton {
            #[cfg(feature = "logging")]
            debug!(
                target: "strata_di",
                specifier = %specifier,
                entry_type = definition.type_name(),
                "Caching singleton instance"
            );
            self.cache.insert(
                specifier.clone(),
                CachedInstance {
                    instance: Arc::clone(&instance),
                    type_name: definition.type_name(),
                },
            );
        }

        Ok((instance, definition.type_name()))
    }

    #[cold]
    fn not_found(&self, specifier: &Specifier) -> ContainerError {
        let mut registered: Vec<String> = self
            .registrations
            .registered_specifiers()
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut resolvers = vec![self.registrations.name().to_owned()];
        for resolver in self.chain_resolvers() {
            resolvers.push(resolver.name().to_owned());
            registered.extend(
                resolver
                    .registered_specifiers()
                    .iter()
                    .map(ToString::to_string),
            );
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "strata_di",
            specifier = %specifier,
            resolvers = ?resolvers,
            "Entry not found after exhausting chain and fallbacks"
        );

        ContainerError::EntryNotFound {
            specifier: specifier.clone(),
            registered,
            resolvers,
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.registrations.len())
            .field(
                "chain",
                &self
                    .chain_resolvers()
                    .iter()
                    .map(|r| r.name().to_owned())
                    .collect::<Vec<_>>(),
            )
            .field("cached_singletons", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BundleDef;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone, Debug)]
    struct TestService {
        tag: &'static str,
    }

    fn counting_factory(counter: &'static AtomicU32) -> Definition {
        Definition::factory(move || TestService {
            tag: Box::leak(
                format!("instance-{}", counter.fetch_add(1, Ordering::SeqCst)).into_boxed_str(),
            ),
        })
    }

    #[test]
    fn test_singleton_identity_and_single_construction() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .set_option("service:db", LookupOption::Singleton(true))
            .unwrap();
        container
            .register("service:db", counting_factory(&COUNTER))
            .unwrap();

        let a = container.lookup::<TestService>("service:db").unwrap();
        let b = container.lookup::<TestService>("service:db").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_freshness() {
        let container = Container::new();
        container
            .register_factory("service:id", || TestService { tag: "fresh" })
            .unwrap();

        let a = container.lookup::<TestService>("service:id").unwrap();
        let b = container.lookup::<TestService>("service:id").unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_value_definition_is_stable_without_singleton() {
        let container = Container::new();
        container
            .register_value("config:port", 8080u16)
            .unwrap();

        let a = container.lookup::<u16>("config:port").unwrap();
        let b = container.lookup::<u16>("config:port").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_application_precedence() {
        let addon = BundleDef::new("addon").setup(|resolver| {
            resolver.register(
                "foo:bar".parse().unwrap(),
                Definition::value(TestService { tag: "addon" }),
            );
        });
        let app = BundleDef::new("app")
            .setup(|resolver| {
                resolver.register(
                    "foo:bar".parse().unwrap(),
                    Definition::value(TestService { tag: "app" }),
                );
            })
            .child(Arc::new(addon));

        let container = Container::new();
        container.load_bundle(&app).unwrap();

        let resolved = container.lookup::<TestService>("foo:bar").unwrap();
        assert_eq!(resolved.tag, "app");
    }

    #[test]
    fn test_breadth_first_chain_order() {
        // top -> {foo, quux}, foo -> {bar}: siblings before nested children
        let bar: Arc<dyn Bundle> = Arc::new(BundleDef::new("bar"));
        let foo: Arc<dyn Bundle> = Arc::new(BundleDef::new("foo").child(bar));
        let quux: Arc<dyn Bundle> = Arc::new(BundleDef::new("quux"));
        let top = BundleDef::new("top").children([foo, quux]);

        let container = Container::new();
        container.load_bundle(&top).unwrap();

        assert_eq!(
            container.resolver_names(),
            vec!["registrations", "top", "foo", "quux", "bar"]
        );
    }

    #[test]
    fn test_diamond_graph_visited_once() {
        let shared: Arc<dyn Bundle> = Arc::new(BundleDef::new("shared"));
        let left: Arc<dyn Bundle> = Arc::new(BundleDef::new("left").child(Arc::clone(&shared)));
        let right: Arc<dyn Bundle> = Arc::new(BundleDef::new("right").child(shared));
        let top = BundleDef::new("top").children([left, right]);

        let container = Container::new();
        container.load_bundle(&top).unwrap();

        assert_eq!(
            container.resolver_names(),
            vec!["registrations", "top", "left", "right", "shared"]
        );
    }

    #[test]
    fn test_second_load_bundle_fails() {
        let container = Container::new();
        container.load_bundle(&BundleDef::new("app")).unwrap();

        assert!(matches!(
            container.load_bundle(&BundleDef::new("other")),
            Err(ContainerError::BundleAlreadyLoaded)
        ));
    }

    #[test]
    fn test_fallback_resolution() {
        let container = Container::new();
        container
            .set_option(
                "foo",
                LookupOption::Fallbacks(vec!["foo:application".parse().unwrap()]),
            )
            .unwrap();
        container
            .register_value("foo:application", TestService { tag: "default" })
            .unwrap();

        let resolved = container.lookup::<TestService>("foo:nonexistent").unwrap();
        assert_eq!(resolved.tag, "default");
    }

    #[test]
    fn test_fallback_caches_under_fallback_slot() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .set_option(
                "foo",
                LookupOption::Fallbacks(vec!["foo:application".parse().unwrap()]),
            )
            .unwrap();
        container
            .set_option("foo:application", LookupOption::Singleton(true))
            .unwrap();
        container
            .register("foo:application", counting_factory(&COUNTER))
            .unwrap();

        let via_fallback = container.lookup::<TestService>("foo:missing").unwrap();
        let direct = container.lookup::<TestService>("foo:application").unwrap();

        assert!(Arc::ptr_eq(&via_fallback, &direct));
        assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manual_override_beats_scanned_entries() {
        let app = BundleDef::new("app").setup(|resolver| {
            resolver.discover(
                "foo:bar".parse().unwrap(),
                Definition::value(TestService { tag: "scanned" }),
            );
        });

        let container = Container::new();
        container.load_bundle(&app).unwrap();
        container
            .register_value("foo:bar", TestService { tag: "manual" })
            .unwrap();

        let resolved = container.lookup::<TestService>("foo:bar").unwrap();
        assert_eq!(resolved.tag, "manual");
    }

    #[test]
    fn test_enumeration_completeness() {
        let container = Container::new();
        for name in ["alpha", "beta", "gamma", "delta"] {
            container
                .register_value(&format!("foo:{name}"), TestService { tag: name })
                .unwrap();
        }

        let names = container.available_for_type("foo").unwrap();
        assert_eq!(names, vec!["alpha", "beta", "gamma", "delta"]);

        for name in names {
            assert!(container.lookup::<TestService>(&format!("foo:{name}")).is_ok());
        }
    }

    #[test]
    fn test_lookup_all_shadows_by_chain_order() {
        let addon = BundleDef::new("addon").setup(|resolver| {
            resolver.register(
                "foo:shared".parse().unwrap(),
                Definition::value(TestService { tag: "addon" }),
            );
            resolver.register(
                "foo:addon-only".parse().unwrap(),
                Definition::value(TestService { tag: "addon-only" }),
            );
        });
        let app = BundleDef::new("app")
            .setup(|resolver| {
                resolver.register(
                    "foo:shared".parse().unwrap(),
                    Definition::value(TestService { tag: "app" }),
                );
            })
            .child(Arc::new(addon));

        let container = Container::new();
        container.load_bundle(&app).unwrap();

        let all = container.lookup_all::<TestService>("foo").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["shared"].tag, "app");
        assert_eq!(all["addon-only"].tag, "addon-only");
    }

    #[test]
    fn test_lookup_all_propagates_first_failure() {
        let container = Container::new();
        container
            .register_value("foo:number", 42u32)
            .unwrap();
        container
            .register_value("foo:text", "not a number")
            .unwrap();

        // Downcasting everything to u32 must fail on the &str entry rather
        // than returning a partial map
        assert!(container.lookup_all::<u32>("foo").is_err());
    }

    #[test]
    fn test_not_found_diagnostics() {
        let container = Container::new();
        let err = container.lookup::<TestService>("missing:entry").unwrap_err();

        match err {
            ContainerError::EntryNotFound {
                specifier,
                resolvers,
                ..
            } => {
                assert_eq!(specifier.to_string(), "missing:entry");
                assert_eq!(resolvers, vec!["registrations"]);
            }
            other => panic!("expected EntryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_lookup_leaves_no_state() {
        let container = Container::new();
        assert!(container.lookup::<TestService>("missing:entry").is_err());

        // A later registration resolves normally: nothing negative was cached
        container
            .register_value("missing:entry", TestService { tag: "late" })
            .unwrap();
        assert_eq!(
            container.lookup::<TestService>("missing:entry").unwrap().tag,
            "late"
        );
    }

    #[test]
    fn test_reregistration_clears_cached_singleton() {
        let container = Container::new();
        container
            .register_with(
                "service:db",
                Definition::factory(|| TestService { tag: "first" }),
                RegistrationOptions::new().singleton(true),
            )
            .unwrap();

        let first = container.lookup::<TestService>("service:db").unwrap();
        assert_eq!(first.tag, "first");

        container
            .register("service:db", Definition::factory(|| TestService { tag: "second" }))
            .unwrap();

        let second = container.lookup::<TestService>("service:db").unwrap();
        assert_eq!(second.tag, "second");
    }

    #[test]
    fn test_chain_registration_does_not_invalidate_cache() {
        let app = BundleDef::new("app");
        let container = Container::new();
        container.load_bundle(&app).unwrap();

        container
            .register_with(
                "service:db",
                Definition::factory(|| TestService { tag: "cached" }),
                RegistrationOptions::new().singleton(true),
            )
            .unwrap();
        let cached = container.lookup::<TestService>("service:db").unwrap();

        // A deeper registration for the same specifier leaves the cache alone
        container.chain_resolvers()[0].register(
            "service:db".parse().unwrap(),
            Definition::value(TestService { tag: "chain" }),
        );

        let still_cached = container.lookup::<TestService>("service:db").unwrap();
        assert!(Arc::ptr_eq(&cached, &still_cached));
    }

    #[test]
    fn test_singleton_value_is_not_a_constructor() {
        let container = Container::new();
        container
            .set_option("service:db", LookupOption::Singleton(true))
            .unwrap();
        container
            .register_value("service:db", TestService { tag: "value" })
            .unwrap();

        assert!(matches!(
            container.lookup::<TestService>("service:db"),
            Err(ContainerError::EntryNotAConstructor { .. })
        ));
    }

    #[test]
    fn test_instantiate_false_returns_payload() {
        let container = Container::new();
        container
            .set_option("blueprint:model", LookupOption::Instantiate(false))
            .unwrap();
        container
            .register_factory("blueprint:model", || TestService { tag: "built" })
            .unwrap();

        // The definition handle itself comes back; instantiation is deferred
        // to the caller
        let definition = container.lookup::<Definition>("blueprint:model").unwrap();
        assert!(definition.is_constructor());
    }

    #[test]
    fn test_constructor_failure_propagates() {
        let container = Container::new();
        container
            .register(
                "service:flaky",
                Definition::constructor(|_: &Container| -> Result<TestService> {
                    Err(ContainerError::construction_failed(
                        "service:flaky".parse()?,
                        "backend unavailable",
                    ))
                }),
            )
            .unwrap();

        match container.lookup::<TestService>("service:flaky") {
            Err(ContainerError::ConstructionFailed { specifier, reason }) => {
                assert_eq!(specifier.to_string(), "service:flaky");
                assert_eq!(reason, "backend unavailable");
            }
            other => panic!("expected ConstructionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_from_arc_shares_existing_allocation() {
        let shared = Arc::new(TestService { tag: "shared" });

        let container = Container::new();
        container
            .register("service:shared", Definition::from_arc(Arc::clone(&shared)))
            .unwrap();

        let resolved = container.lookup::<TestService>("service:shared").unwrap();
        assert!(Arc::ptr_eq(&resolved, &shared));
    }

    #[test]
    fn test_type_mismatch() {
        let container = Container::new();
        container.register_value("config:port", 8080u16).unwrap();

        assert!(matches!(
            container.lookup::<String>("config:port"),
            Err(ContainerError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_has_and_definition_for_are_side_effect_free() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .set_option("service:db", LookupOption::Singleton(true))
            .unwrap();
        container
            .register("service:db", counting_factory(&COUNTER))
            .unwrap();

        assert!(container.has("service:db"));
        assert!(container.definition_for("service:db").is_some());
        assert!(!container.has("service:missing"));
        assert!(!container.has("not-a-specifier"));

        // Nothing was constructed or cached
        assert_eq!(COUNTER.load(Ordering::SeqCst), 0);
        assert_eq!(container.cache.len(), 0);
    }

    #[test]
    fn test_clear_cache_forces_reconstruction() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        container
            .set_option("service:db", LookupOption::Singleton(true))
            .unwrap();
        container
            .register("service:db", counting_factory(&COUNTER))
            .unwrap();

        let _ = container.lookup::<TestService>("service:db").unwrap();
        container.clear_cache();
        let _ = container.lookup::<TestService>("service:db").unwrap();

        assert_eq!(COUNTER.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unregister_removes_entry_and_cache() {
        let container = Container::new();
        container
            .register_with(
                "service:db",
                Definition::factory(|| TestService { tag: "db" }),
                RegistrationOptions::new().singleton(true),
            )
            .unwrap();
        let _ = container.lookup::<TestService>("service:db").unwrap();

        container.unregister("service:db").unwrap();

        assert!(!container.has("service:db"));
        assert!(container.lookup::<TestService>("service:db").is_err());
    }

    #[test]
    fn test_clone_shares_state() {
        let container = Container::new();
        let clone = container.clone();

        clone
            .register_value("service:db", TestService { tag: "shared" })
            .unwrap();
        assert!(container.has("service:db"));
    }
}
