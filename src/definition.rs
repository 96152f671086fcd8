//! Definitions: what a specifier resolves to
//!
//! A [`Definition`] is the closed variant stored behind every registry entry:
//! either a ready-made value returned as-is, or a type-erased constructor
//! invoked to produce a fresh instance. Lifecycle policy (singleton caching,
//! `instantiate = false`) is applied by the container, not here.

use crate::inject::Inject;
use crate::{Container, Result};
use std::any::Any;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// Type-erased constructor function
type ConstructFn = Arc<dyn Fn(&Container) -> Result<Arc<dyn Any + Send + Sync>> + Send + Sync>;

#[derive(Clone)]
enum DefinitionKind {
    /// A ready instance - resolved by cloning the Arc
    Value(Arc<dyn Any + Send + Sync>),
    /// A constructor - invoked with the container on every instantiation
    Constructor(ConstructFn),
}

/// The definition registered under a specifier.
///
/// Built through one of three constructors:
///
/// - [`Definition::value`] - a plain value, returned as-is on every lookup
/// - [`Definition::factory`] - a closure producing a fresh instance
/// - [`Definition::injectable`] - like `factory`, but the produced instance's
///   declared [`Inject`] fields are filled from the container before the
///   instance is handed back
///
/// # Examples
///
/// ```rust
/// use strata_di::{Container, Definition};
///
/// #[derive(Clone)]
/// struct Mailer { host: String }
///
/// let container = Container::new();
/// container.register("service:mailer", Definition::factory(|| Mailer {
///     host: "smtp.example.com".into(),
/// })).unwrap();
///
/// let mailer = container.lookup::<Mailer>("service:mailer").unwrap();
/// assert_eq!(mailer.host, "smtp.example.com");
/// ```
#[derive(Clone)]
pub struct Definition {
    kind: DefinitionKind,
    /// Registered Rust type, for diagnostics
    type_name: &'static str,
}

impl Definition {
    /// Wrap a ready value. Lookups return it as-is; it cannot satisfy a
    /// `singleton = true` entry (that requires a constructor).
    #[inline]
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            kind: DefinitionKind::Value(Arc::new(value) as Arc<dyn Any + Send + Sync>),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap an already-shared value.
    #[inline]
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            kind: DefinitionKind::Value(value as Arc<dyn Any + Send + Sync>),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap a constructor closure. Invoked once per transient lookup, or
    /// exactly once for a singleton entry.
    #[inline]
    pub fn factory<T, F>(ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            kind: DefinitionKind::Constructor(Arc::new(move |_container| {
                Ok(Arc::new(ctor()) as Arc<dyn Any + Send + Sync>)
            })),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap a constructor that receives the container, for definitions that
    /// look up collaborators explicitly during construction.
    #[inline]
    pub fn constructor<T, F>(ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            kind: DefinitionKind::Constructor(Arc::new(move |container| {
                Ok(Arc::new(ctor(container)?) as Arc<dyn Any + Send + Sync>)
            })),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap a constructor whose product declares injected fields.
    ///
    /// After construction, every field returned by
    /// [`Inject::injected_fields`] is resolved through the container and
    /// filled before the instance escapes - callers of `lookup` always see
    /// fully injected instances.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata_di::{Container, Definition, Inject, Injected, InjectedField};
    ///
    /// struct Store;
    ///
    /// struct PostAction {
    ///     store: Injected<Store>,
    /// }
    ///
    /// impl Inject for PostAction {
    ///     fn injected_fields(&self) -> Vec<&dyn InjectedField> {
    ///         vec![&self.store]
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container.register("service:store", Definition::factory(|| Store)).unwrap();
    /// container.register(
    ///     "action:post",
    ///     Definition::injectable(|| PostAction {
    ///         store: Injected::parse("service:store").unwrap(),
    ///     }),
    /// ).unwrap();
    ///
    /// let action = container.lookup::<PostAction>("action:post").unwrap();
    /// assert!(action.store.try_get().is_some());
    /// ```
    #[inline]
    pub fn injectable<T, F>(ctor: F) -> Self
    where
        T: Inject + Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            kind: DefinitionKind::Constructor(Arc::new(move |container| {
                let instance = ctor();
                for field in instance.injected_fields() {
                    let Some(target) = field.target() else {
                        continue;
                    };
                    #[cfg(feature = "logging")]
                    trace!(
                        target: "strata_di",
                        service = std::any::type_name::<T>(),
                        field = %target,
                        "Filling injected field"
                    );
                    let resolved = container.lookup_specifier(target)?;
                    field.fill(resolved)?;
                }
                Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
            })),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Whether this definition can be instantiated (is a constructor).
    #[inline]
    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, DefinitionKind::Constructor(_))
    }

    /// Registered Rust type name, for diagnostics.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Produce an instance: clone the value, or run the constructor.
    #[inline]
    pub(crate) fn resolve(&self, container: &Container) -> Result<Arc<dyn Any + Send + Sync>> {
        match &self.kind {
            DefinitionKind::Value(value) => Ok(Arc::clone(value)),
            DefinitionKind::Constructor(ctor) => ctor(container),
        }
    }

    /// The raw payload for `instantiate = false` lookups: a value's inner
    /// `Arc`, or the `Definition` handle itself for a constructor (callers
    /// can downcast to `Definition` and instantiate later by hand).
    #[inline]
    pub(crate) fn payload(&self) -> Arc<dyn Any + Send + Sync> {
        match &self.kind {
            DefinitionKind::Value(value) => Arc::clone(value),
            DefinitionKind::Constructor(_) => Arc::new(self.clone()) as Arc<dyn Any + Send + Sync>,
        }
    }
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("type_name", &self.type_name)
            .field("constructor", &self.is_constructor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone)]
    struct TestService {
        id: u32,
    }

    #[test]
    fn test_value_definition_resolves_same_instance() {
        let container = Container::new();
        let def = Definition::value(TestService { id: 7 });

        let a = def.resolve(&container).unwrap();
        let b = def.resolve(&container).unwrap();

        let a = a.downcast::<TestService>().unwrap();
        let b = b.downcast::<TestService>().unwrap();

        assert_eq!(a.id, 7);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_factory_definition_constructs_fresh() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        let def = Definition::factory(|| TestService {
            id: COUNTER.fetch_add(1, Ordering::SeqCst),
        });

        let a = def.resolve(&container).unwrap().downcast::<TestService>().unwrap();
        let b = def.resolve(&container).unwrap().downcast::<TestService>().unwrap();

        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_is_constructor() {
        assert!(!Definition::value(TestService { id: 0 }).is_constructor());
        assert!(Definition::factory(|| TestService { id: 0 }).is_constructor());
    }

    #[test]
    fn test_payload_of_value_is_the_value() {
        let def = Definition::value(TestService { id: 3 });
        let payload = def.payload().downcast::<TestService>().unwrap();
        assert_eq!(payload.id, 3);
    }

    #[test]
    fn test_payload_of_constructor_is_the_definition() {
        let def = Definition::factory(|| TestService { id: 3 });
        let payload = def.payload().downcast::<Definition>().unwrap();
        assert!(payload.is_constructor());
    }
}
