//! Declarative field injection
//!
//! A type opts in to injection by holding [`Injected<T>`] slots and
//! implementing [`Inject`] (by hand or via `#[derive(Inject)]` with the
//! `derive` feature). When the container constructs such a type through
//! [`Definition::injectable`](crate::Definition::injectable), every declared
//! slot is resolved and filled before the instance is returned - injection is
//! eager, never deferred.
//!
//! The declaration list is explicit and ordered; a struct embedding another
//! `Inject` type concatenates the inner list into its own to inherit its
//! markers.

use crate::{ContainerError, Result, Specifier};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

/// A property slot populated from the container at construction time.
///
/// Created empty with a target specifier ([`Injected::new`] /
/// [`Injected::parse`]), or pre-filled for manual wiring and tests
/// ([`Injected::resolved`]).
///
/// # Examples
///
/// ```rust
/// use strata_di::Injected;
///
/// struct Store;
///
/// let slot: Injected<Store> = Injected::parse("service:store").unwrap();
/// assert!(slot.try_get().is_none());
/// assert!(slot.get().is_err());
///
/// let filled = Injected::resolved(Store);
/// assert!(filled.get().is_ok());
/// ```
pub struct Injected<T> {
    /// Target specifier; `None` only for pre-filled slots
    target: Option<Specifier>,
    slot: OnceCell<Arc<T>>,
}

impl<T: Send + Sync + 'static> Injected<T> {
    /// An empty slot targeting the given specifier.
    pub fn new(target: Specifier) -> Self {
        Self {
            target: Some(target),
            slot: OnceCell::new(),
        }
    }

    /// An empty slot targeting a `"type:name"` string.
    pub fn parse(target: &str) -> Result<Self> {
        Ok(Self::new(Specifier::parse(target)?))
    }

    /// A pre-filled slot, bypassing the container entirely.
    pub fn resolved(value: T) -> Self {
        let slot = OnceCell::new();
        let _ = slot.set(Arc::new(value));
        Self { target: None, slot }
    }

    /// A pre-filled slot from a shared value.
    pub fn resolved_arc(value: Arc<T>) -> Self {
        let slot = OnceCell::new();
        let _ = slot.set(value);
        Self { target: None, slot }
    }

    /// The resolved value.
    ///
    /// Fails with [`ContainerError::InjectionUnresolved`] if no container
    /// ever filled this slot - injection markers are meaningless outside
    /// container-mediated construction.
    pub fn get(&self) -> Result<&Arc<T>> {
        match self.slot.get() {
            Some(value) => Ok(value),
            // An unfilled slot always carries its target: resolved() fills
            // eagerly and new()/parse() store one.
            None => Err(ContainerError::InjectionUnresolved {
                specifier: self
                    .target
                    .clone()
                    .expect("unfilled injection slot without a target"),
            }),
        }
    }

    /// The resolved value, or `None` if unfilled.
    #[inline]
    pub fn try_get(&self) -> Option<&Arc<T>> {
        self.slot.get()
    }
}

impl<T> std::fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injected")
            .field("target", &self.target)
            .field("resolved", &self.slot.get().is_some())
            .finish()
    }
}

/// Object-safe view of one injection slot, as seen by the container.
pub trait InjectedField: Send + Sync {
    /// The specifier to resolve, or `None` for pre-filled slots.
    fn target(&self) -> Option<&Specifier>;

    /// Fill the slot with a resolved value. A slot that is already filled
    /// keeps its value.
    fn fill(&self, value: Arc<dyn Any + Send + Sync>) -> Result<()>;
}

impl<T: Send + Sync + 'static> InjectedField for Injected<T> {
    fn target(&self) -> Option<&Specifier> {
        self.target.as_ref()
    }

    fn fill(&self, value: Arc<dyn Any + Send + Sync>) -> Result<()> {
        let typed = value.downcast::<T>().map_err(|_| {
            let specifier = self
                .target
                .clone()
                .unwrap_or_else(|| Specifier::parse("injected:field").unwrap());
            ContainerError::type_mismatch::<T>(specifier, "a differently-typed entry")
        })?;
        let _ = self.slot.set(typed);
        Ok(())
    }
}

/// Declares which fields the container must populate at construction time.
///
/// The list is ordered; fields are filled in the order returned. Composition
/// stands in for inheritance: a type embedding another `Inject` type appends
/// the embedded type's fields to its own list.
///
/// # Examples
///
/// ```rust
/// use strata_di::{Inject, Injected, InjectedField};
///
/// struct Store;
/// struct Session;
///
/// struct BaseAction {
///     store: Injected<Store>,
/// }
///
/// impl Inject for BaseAction {
///     fn injected_fields(&self) -> Vec<&dyn InjectedField> {
///         vec![&self.store]
///     }
/// }
///
/// struct LoginAction {
///     base: BaseAction,
///     session: Injected<Session>,
/// }
///
/// impl Inject for LoginAction {
///     fn injected_fields(&self) -> Vec<&dyn InjectedField> {
///         let mut fields = self.base.injected_fields();
///         fields.push(&self.session);
///         fields
///     }
/// }
/// ```
pub trait Inject {
    /// The injection slots to fill, in order.
    fn injected_fields(&self) -> Vec<&dyn InjectedField>;
}

thread_local! {
    /// Specifiers currently being constructed on this thread. Lookup is
    /// synchronous, so recursion through constructors is the only way a
    /// specifier can appear here twice.
    static RESOLUTION_STACK: RefCell<Vec<Specifier>> = const { RefCell::new(Vec::new()) };
}

/// RAII frame on the thread-local resolution stack.
///
/// Entering a specifier that is already on the stack means an injection
/// cycle; the lookup fails instead of overflowing the stack.
pub(crate) struct ResolutionGuard;

impl ResolutionGuard {
    pub fn enter(specifier: &Specifier) -> Result<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(specifier) {
                let mut chain: Vec<String> = stack.iter().map(ToString::to_string).collect();
                chain.push(specifier.to_string());
                return Err(ContainerError::CircularInjection {
                    specifier: specifier.clone(),
                    chain,
                });
            }
            stack.push(specifier.clone());
            Ok(Self)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
