//! Example demonstrating bundle loading and the resolver chain
//!
//! Run with:
//!   cargo run --example bundles

use std::sync::Arc;
use strata_di::{Bundle, BundleDef, Container, Definition, LookupOption};

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
    println!("=== Strata DI Bundle Demo ===\n");

    // An addon bundle contributing a fallback serializer
    let orm_addon = BundleDef::new("orm-addon").setup(|resolver| {
        resolver.register(
            "serializer:application".parse().unwrap(),
            Definition::value(Serializer { format: "json-api" }),
        );
        resolver.register(
            "service:store".parse().unwrap(),
            Definition::factory(|| Store {
                backend: "rest".into(),
            }),
        );
    });

    // The application bundle shadows nothing yet, but its resolver is
    // consulted before any addon's
    let app: Arc<dyn Bundle> = Arc::new(
        BundleDef::new("app")
            .setup(|resolver| {
                resolver.register(
                    "serializer:post".parse().unwrap(),
                    Definition::value(Serializer { format: "custom" }),
                );
            })
            .child(Arc::new(orm_addon)),
    );

    let container = Container::new();
    container.load_bundle(app.as_ref()).unwrap();

    println!("Resolver chain: {:?}\n", container.resolver_names());

    // Direct hit in the app bundle
    let post = container.lookup::<Serializer>("serializer:post").unwrap();
    println!("serializer:post        -> {}", post.format);

    // Falls through to the addon bundle
    let application = container
        .lookup::<Serializer>("serializer:application")
        .unwrap();
    println!("serializer:application -> {}", application.format);

    // Fallbacks: any unknown serializer degrades to the application one
    container
        .set_option(
            "serializer",
            LookupOption::Fallbacks(vec!["serializer:application".parse().unwrap()]),
        )
        .unwrap();
    let comment = container.lookup::<Serializer>("serializer:comment").unwrap();
    println!("serializer:comment     -> {} (via fallback)", comment.format);

    // Runtime registrations shadow every bundle
    container
        .register_value("serializer:post", Serializer { format: "override" })
        .unwrap();
    let post = container.lookup::<Serializer>("serializer:post").unwrap();
    println!("serializer:post        -> {} (after override)\n", post.format);

    // Enumerate everything of one type across the whole chain
    let names = container.available_for_type("serializer").unwrap();
    println!("Known serializers: {names:?}");

    // Singleton services are constructed once and shared
    container
        .set_option("service:store", LookupOption::Singleton(true))
        .unwrap();
    let first = container.lookup::<Store>("service:store").unwrap();
    let second = container.lookup::<Store>("service:store").unwrap();
    println!(
        "service:store singleton shared: {}",
        Arc::ptr_eq(&first, &second)
    );

    println!("\n=== Demo Complete ===");
}
