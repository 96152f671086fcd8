//! # Strata DI - Layered, String-Keyed Dependency Injection for Rust
//!
//! A lookup container for modular applications: logical `"type:name"`
//! specifiers resolve through an ordered chain of per-bundle resolvers, so an
//! application can silently override anything an add-on provides.
//!
//! ## Features
//!
//! - 🗂️ **String-keyed** - Entries addressed by `"type:name"` specifiers, no
//!   hard imports between application code and framework internals
//! - 🧅 **Layered resolution** - One resolver per bundle, ordered by
//!   breadth-first discovery from the root application outward
//! - ♻️ **Lifecycle policy** - Per-type or per-entry `singleton` /
//!   `instantiate` options, with cached singletons stable for the
//!   container's lifetime
//! - 🪂 **Fallback chains** - Ordered alternate specifiers tried when the
//!   primary entry is absent
//! - 💉 **Eager injection** - Declared fields are populated from the
//!   container before `lookup` returns
//! - ⚡ **Lock-free internals** - `DashMap`-backed state; the container is
//!   `Send + Sync` and cheap to clone
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty
//!   output
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_di::{Container, Definition, LookupOption};
//!
//! #[derive(Clone)]
//! struct OrmAdapter { table: String }
//!
//! let container = Container::new();
//!
//! // Every orm-adapter is a singleton; unknown models fall back to the
//! // application adapter
//! container.set_option("orm-adapter", LookupOption::Singleton(true)).unwrap();
//! container
//!     .set_option(
//!         "orm-adapter",
//!         LookupOption::Fallbacks(vec!["orm-adapter:application".parse().unwrap()]),
//!     )
//!     .unwrap();
//!
//! container
//!     .register(
//!         "orm-adapter:application",
//!         Definition::factory(|| OrmAdapter { table: "default".into() }),
//!     )
//!     .unwrap();
//!
//! // Resolves through the fallback
//! let adapter = container.lookup::<OrmAdapter>("orm-adapter:comment").unwrap();
//! assert_eq!(adapter.table, "default");
//! ```
//!
//! ## Bundles
//!
//! ```rust
//! use strata_di::{BundleDef, Container, Definition};
//! use std::sync::Arc;
//!
//! let addon = BundleDef::new("auth-addon").setup(|resolver| {
//!     resolver.register(
//!         "service:session".parse().unwrap(),
//!         Definition::value("addon session"),
//!     );
//! });
//!
//! // The application bundle shadows anything the addon defines
//! let app = BundleDef::new("app")
//!     .setup(|resolver| {
//!         resolver.register(
//!             "service:session".parse().unwrap(),
//!             Definition::value("app session"),
//!         );
//!     })
//!     .child(Arc::new(addon));
//!
//! let container = Container::new();
//! container.load_bundle(&app).unwrap();
//! assert_eq!(*container.lookup::<&str>("service:session").unwrap(), "app session");
//! ```

// `#[derive(Inject)]` expands to `::strata_di::` paths; alias the crate to
// its own name so the expansion also resolves inside this crate's tests
#[cfg(all(test, feature = "derive"))]
extern crate self as strata_di;

mod bundle;
mod container;
mod definition;
mod entries;
mod error;
mod inject;
#[cfg(feature = "logging")]
pub mod logging;
mod options;
mod resolver;
mod specifier;

pub use bundle::{Bundle, BundleDef};
pub use container::{Container, RegistrationOptions};
pub use definition::Definition;
pub use error::{ContainerError, Result};
pub use inject::{Inject, Injected, InjectedField};
pub use options::{LookupOption, OptionKey};
pub use resolver::{Resolver, TypeStrategy};
pub use specifier::Specifier;

/// Derive macro generating an [`Inject`] implementation from fields marked
/// `#[inject]`.
#[cfg(feature = "derive")]
pub use strata_di_derive::Inject;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Bundle, BundleDef, Container, ContainerError, Definition, Inject, Injected,
        InjectedField, LookupOption, OptionKey, RegistrationOptions, Resolver, Result,
        Specifier, TypeStrategy,
    };
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Config {
        environment: &'static str,
    }

    struct Store {
        adapter: &'static str,
    }

    struct PostAction {
        store: Injected<Store>,
        config: Injected<Config>,
    }

    impl Inject for PostAction {
        fn injected_fields(&self) -> Vec<&dyn InjectedField> {
            vec![&self.store, &self.config]
        }
    }

    fn boot_container() -> Container {
        let orm_addon = BundleDef::new("orm-addon").setup(|resolver| {
            resolver.register(
                "service:store".parse().unwrap(),
                Definition::factory(|| Store { adapter: "sql" }),
            );
            resolver.register(
                "serializer:application".parse().unwrap(),
                Definition::value("json serializer"),
            );
        });
        let app = BundleDef::new("app")
            .setup(|resolver| {
                resolver.register(
                    "config:environment".parse().unwrap(),
                    Definition::value(Config {
                        environment: "test",
                    }),
                );
            })
            .child(Arc::new(orm_addon));

        let container = Container::new();
        container.load_bundle(&app).unwrap();
        container
            .set_option("service", LookupOption::Singleton(true))
            .unwrap();
        container
    }

    #[test]
    fn test_boot_and_lookup_across_bundles() {
        let container = boot_container();

        let config = container.lookup::<Config>("config:environment").unwrap();
        assert_eq!(config.environment, "test");

        let store = container.lookup::<Store>("service:store").unwrap();
        assert_eq!(store.adapter, "sql");
    }

    #[test]
    fn test_injected_fields_resolved_before_lookup_returns() {
        let container = boot_container();
        container
            .register(
                "action:post",
                Definition::injectable(|| PostAction {
                    store: Injected::parse("service:store").unwrap(),
                    config: Injected::parse("config:environment").unwrap(),
                }),
            )
            .unwrap();

        let action = container.lookup::<PostAction>("action:post").unwrap();

        // Eager: both fields are already filled
        assert_eq!(action.store.get().unwrap().adapter, "sql");
        assert_eq!(action.config.get().unwrap().environment, "test");
    }

    #[test]
    fn test_injection_shares_singleton_instances() {
        let container = boot_container();
        container
            .register_injectable("action:post", || PostAction {
                store: Injected::parse("service:store").unwrap(),
                config: Injected::parse("config:environment").unwrap(),
            })
            .unwrap();

        let action = container.lookup::<PostAction>("action:post").unwrap();
        let store = container.lookup::<Store>("service:store").unwrap();

        // `service` is singleton-typed, so the injected field and the direct
        // lookup share one instance
        assert!(Arc::ptr_eq(action.store.get().unwrap(), &store));
    }

    #[test]
    fn test_circular_injection_errors_instead_of_overflowing() {
        struct Ouro {
            other: Injected<Ouro>,
        }

        impl Inject for Ouro {
            fn injected_fields(&self) -> Vec<&dyn InjectedField> {
                vec![&self.other]
            }
        }

        let container = Container::new();
        container
            .register_injectable("service:ouro", || Ouro {
                other: Injected::parse("service:ouro").unwrap(),
            })
            .unwrap();

        assert!(matches!(
            container.lookup::<Ouro>("service:ouro"),
            Err(ContainerError::CircularInjection { .. })
        ));
    }

    #[test]
    fn test_unresolved_injection_outside_container() {
        let action = PostAction {
            store: Injected::parse("service:store").unwrap(),
            config: Injected::parse("config:environment").unwrap(),
        };

        assert!(matches!(
            action.store.get(),
            Err(ContainerError::InjectionUnresolved { .. })
        ));
    }

    #[test]
    fn test_lookup_all_serializers() {
        let container = boot_container();
        container
            .register_value("serializer:post", "post serializer")
            .unwrap();

        let serializers = container.lookup_all::<&str>("serializer").unwrap();
        assert_eq!(serializers.len(), 2);
        assert_eq!(*serializers["application"], "json serializer");
        assert_eq!(*serializers["post"], "post serializer");
    }

    #[test]
    fn test_available_for_type_union() {
        let container = boot_container();
        container
            .register_value("serializer:post", "post serializer")
            .unwrap();

        // Direct registrations precede chain entries
        assert_eq!(
            container.available_for_type("serializer").unwrap(),
            vec!["post", "application"]
        );
    }

    #[cfg(feature = "derive")]
    mod derive_macro {
        use super::*;

        #[derive(Inject)]
        struct BaseRoute {
            #[inject]
            store: Injected<Store>,
        }

        #[derive(Inject)]
        struct PostsRoute {
            #[inject(nested)]
            base: BaseRoute,
            #[inject]
            config: Injected<Config>,
            page_size: usize,
        }

        fn posts_route() -> PostsRoute {
            PostsRoute {
                base: BaseRoute {
                    store: Injected::parse("service:store").unwrap(),
                },
                config: Injected::parse("config:environment").unwrap(),
                page_size: 10,
            }
        }

        #[test]
        fn test_derived_field_list_concatenates_nested_markers() {
            let route = posts_route();

            let targets: Vec<String> = route
                .injected_fields()
                .iter()
                .filter_map(|field| field.target())
                .map(ToString::to_string)
                .collect();
            assert_eq!(targets, vec!["service:store", "config:environment"]);
        }

        #[test]
        fn test_derive_round_trips_through_register_injectable() {
            let container = boot_container();
            container
                .register_injectable("route:posts", posts_route)
                .unwrap();

            let route = container.lookup::<PostsRoute>("route:posts").unwrap();

            // Both the nested slot and the direct slot are filled eagerly;
            // the unmarked field is untouched
            assert_eq!(route.base.store.get().unwrap().adapter, "sql");
            assert_eq!(route.config.get().unwrap().environment, "test");
            assert_eq!(route.page_size, 10);
        }
    }
}
