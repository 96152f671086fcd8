//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use strata_di::{Container, LookupOption};

// Example services
#[allow(dead_code)]
#[derive(Clone)]
struct Store {
    backend: String,
}

#[derive(Clone)]
struct Serializer {
    format: &'static str,
}

fn main() {
    // Uses JSON if logging-json is enabled, pretty if logging-pretty is
    #[cfg(feature = "logging")]
    {
        strata_di::logging::init();
    }

    println!("=== Strata DI Logging Demo ===\n");

    let container = Container::new();

    // Register entries (logs: "Registering on container")
    container
        .register_value(
            "serializer:application",
            Serializer { format: "json-api" },
        )
        .unwrap();
    container
        .register_factory("service:store", || Store {
            backend: "rest".into(),
        })
        .unwrap();

    container
        .set_option("service:store", LookupOption::Singleton(true))
        .unwrap();

    // First lookup constructs and caches (logs: "Caching singleton instance")
    let _store = container.lookup::<Store>("service:store").unwrap();

    // Second lookup is a cache hit (logs: "Returning cached singleton")
    let _store_again = container.lookup::<Store>("service:store").unwrap();

    // A miss walks the chain and fails (logs: "Entry not found after
    // exhausting chain and fallbacks")
    let missing = container.lookup::<Serializer>("serializer:missing");
    assert!(missing.is_err());

    // Fallbacks rescue the miss (logs: "Primary specifier unresolved,
    // trying fallback")
    container
        .set_option(
            "serializer",
            LookupOption::Fallbacks(vec!["serializer:application".parse().unwrap()]),
        )
        .unwrap();
    let rescued = container.lookup::<Serializer>("serializer:missing").unwrap();
    assert_eq!(rescued.format, "json-api");

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
