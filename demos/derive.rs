//! Example demonstrating the #[derive(Inject)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use strata_di::{Container, Inject, Injected, LookupOption};

// Dependencies
#[allow(dead_code)]
struct Store {
    backend: String,
}

#[allow(dead_code)]
struct Session {
    user: Option<String>,
}

// Base type whose injection markers are inherited via composition
#[derive(Inject)]
struct BaseRoute {
    #[inject]
    store: Injected<Store>,
}

// Route composing the base and adding its own marker
#[derive(Inject)]
struct PostsRoute {
    #[inject(nested)]
    base: BaseRoute,
    #[inject]
    session: Injected<Session>,
    // Plain field, untouched by the container
    page_size: usize,
}

impl PostsRoute {
    fn describe(&self) -> String {
        let store = self.base.store.get().unwrap();
        let session = self.session.get().unwrap();
        format!(
            "PostsRoute over {} backend, user={:?}, page_size={}",
            store.backend, session.user, self.page_size
        )
    }
}

fn main() {
    println!("=== Strata DI Derive Macro Demo ===\n");

    let container = Container::new();
    container
        .set_option("service", LookupOption::Singleton(true))
        .unwrap();
    container
        .register_factory("service:store", || Store {
            backend: "rest".into(),
        })
        .unwrap();
    container
        .register_factory("service:session", || Session {
            user: Some("alice".into()),
        })
        .unwrap();

    // The constructor declares targets; the container fills them eagerly
    // when the route is looked up.
    container
        .register_injectable("route:posts", || PostsRoute {
            base: BaseRoute {
                store: Injected::parse("service:store").unwrap(),
            },
            session: Injected::parse("service:session").unwrap(),
            page_size: 25,
        })
        .unwrap();

    println!("Looking up route:posts...");
    let route = container.lookup::<PostsRoute>("route:posts").unwrap();
    println!("  {}", route.describe());

    println!("\n=== Demo Complete ===");
    println!("\nThe #[derive(Inject)] macro generated `injected_fields()` so that:");
    println!("  - #[inject] slots are filled from the container before the instance is returned");
    println!("  - #[inject(nested)] fields contribute their own markers via composition");
}
