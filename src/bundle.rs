//! Bundles: units of discoverable code
//!
//! A bundle is the root application or one add-on package. Each bundle owns
//! exactly one resolver, and bundles form a directed acyclic graph (an
//! application depends on add-ons, which may depend on further add-ons).
//! [`Container::load_bundle`](crate::Container::load_bundle) walks this graph
//! breadth-first to build the resolver chain.

use crate::resolver::Resolver;
use std::sync::Arc;

/// Descriptor for one bundle: the only contract the container needs from the
/// packaging layer.
///
/// `load` produces the bundle's resolver; `children` lists its direct add-on
/// dependencies in declaration order. The graph handed to `load_bundle` must
/// be acyclic; bundles sharing a name are visited once (diamond dependencies
/// collapse to the first encounter).
pub trait Bundle: Send + Sync {
    /// Unique bundle name. Doubles as the resolver name in diagnostics.
    fn name(&self) -> &str;

    /// Build this bundle's resolver.
    ///
    /// Called exactly once per `load_bundle`; the returned resolver is the
    /// bundle's sole representation in the chain from then on.
    fn load(&self) -> Resolver;

    /// Direct add-on dependencies, in declaration order.
    fn children(&self) -> Vec<Arc<dyn Bundle>> {
        Vec::new()
    }
}

type SetupFn = Box<dyn Fn(&Resolver) + Send + Sync>;

/// An explicit, pre-computed bundle definition.
///
/// Where the surrounding framework derives bundles from a package manager's
/// dependency graph, tests and embedders can declare the same structure
/// directly: a name, registration closures that populate the resolver, and
/// child bundles.
///
/// # Examples
///
/// ```rust
/// use strata_di::{BundleDef, Container, Definition};
/// use std::sync::Arc;
///
/// let addon = BundleDef::new("session-addon").setup(|resolver| {
///     resolver.register(
///         "service:session".parse().unwrap(),
///         Definition::value("addon-session"),
///     );
/// });
///
/// let app = BundleDef::new("app").child(Arc::new(addon));
///
/// let container = Container::new();
/// container.load_bundle(&app).unwrap();
/// assert_eq!(
///     *container.lookup::<&str>("service:session").unwrap(),
///     "addon-session"
/// );
/// ```
pub struct BundleDef {
    name: String,
    setup: Vec<SetupFn>,
    children: Vec<Arc<dyn Bundle>>,
}

impl BundleDef {
    /// Start an empty bundle definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            setup: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a closure run against the resolver when the bundle loads.
    ///
    /// Several closures may be added; they run in order.
    pub fn setup<F>(mut self, f: F) -> Self
    where
        F: Fn(&Resolver) + Send + Sync + 'static,
    {
        self.setup.push(Box::new(f));
        self
    }

    /// Append a direct child dependency.
    pub fn child(mut self, child: Arc<dyn Bundle>) -> Self {
        self.children.push(child);
        self
    }

    /// Append several direct children, preserving order.
    pub fn children(mut self, children: impl IntoIterator<Item = Arc<dyn Bundle>>) -> Self {
        self.children.extend(children);
        self
    }
}

impl Bundle for BundleDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Resolver {
        let resolver = Resolver::new(self.name.clone());
        for setup in &self.setup {
            setup(&resolver);
        }
        resolver
    }

    fn children(&self) -> Vec<Arc<dyn Bundle>> {
        self.children.clone()
    }
}

impl std::fmt::Debug for BundleDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleDef")
            .field("name", &self.name)
            .field("children", &self.children.iter().map(|c| c.name().to_owned()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Definition;

    #[test]
    fn test_load_runs_setup_closures_in_order() {
        let bundle = BundleDef::new("app")
            .setup(|resolver| {
                resolver.register("foo:a".parse().unwrap(), Definition::value(1u32));
            })
            .setup(|resolver| {
                resolver.register("foo:a".parse().unwrap(), Definition::value(2u32));
                resolver.register("foo:b".parse().unwrap(), Definition::value(3u32));
            });

        let resolver = bundle.load();
        assert_eq!(resolver.name(), "app");
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_children_declaration_order() {
        let app = BundleDef::new("app")
            .child(Arc::new(BundleDef::new("first")))
            .child(Arc::new(BundleDef::new("second")));

        // Fully qualified: the builder method of the same name shadows the
        // trait accessor
        let names: Vec<_> = Bundle::children(&app)
            .iter()
            .map(|c| c.name().to_owned())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
