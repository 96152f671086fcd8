#![no_main]

//! Fuzz target for lifecycle options
//!
//! Mixes option mutation with lookups over a fixed specifier universe and
//! checks the singleton invariant: once an instance is cached, later lookups
//! of the same specifier return the identical instance until the entry is
//! re-registered or the cache is cleared.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;
use std::sync::Arc;
use strata_di::{Container, Definition, LookupOption};

#[allow(dead_code)]
#[derive(Clone, Debug)]
struct Service {
    generation: u32,
}

/// Small fixed universe so operations actually collide
const SPECIFIERS: [&str; 4] = ["service:a", "service:b", "service:c", "service:d"];

#[derive(Debug, Arbitrary)]
enum LifecycleOp {
    Register { slot: u8, generation: u32 },
    SetSingleton { slot: u8, value: bool },
    SetInstantiate { slot: u8, value: bool },
    SetTypeFallbackToA,
    Lookup { slot: u8 },
    Unregister { slot: u8 },
    ClearCache,
}

fn specifier(slot: u8) -> &'static str {
    SPECIFIERS[slot as usize % SPECIFIERS.len()]
}

fuzz_target!(|ops: Vec<LifecycleOp>| {
    let container = Container::new();
    // Instances observed under singleton policy, keyed by specifier.
    // Cleared wholesale on any mutation: fallbacks can alias one cached
    // instance under several specifiers, so per-key eviction is unsound.
    let mut observed: HashMap<&'static str, Arc<Service>> = HashMap::new();

    for op in ops {
        match op {
            LifecycleOp::Register { slot, generation } => {
                container
                    .register(
                        specifier(slot),
                        Definition::factory(move || Service { generation }),
                    )
                    .unwrap();
                observed.clear();
            }
            LifecycleOp::SetSingleton { slot, value } => {
                container
                    .set_option(specifier(slot), LookupOption::Singleton(value))
                    .unwrap();
                observed.clear();
            }
            LifecycleOp::SetInstantiate { slot, value } => {
                container
                    .set_option(specifier(slot), LookupOption::Instantiate(value))
                    .unwrap();
            }
            LifecycleOp::SetTypeFallbackToA => {
                container
                    .set_option(
                        "service",
                        LookupOption::Fallbacks(vec!["service:a".parse().unwrap()]),
                    )
                    .unwrap();
            }
            LifecycleOp::Lookup { slot } => {
                let spec = specifier(slot);
                if let Ok(instance) = container.lookup::<Service>(spec) {
                    // A repeated lookup returning the identical instance means
                    // the entry is being served from the singleton cache.
                    let cached = container
                        .lookup_erased(spec)
                        .ok()
                        .and_then(|second| second.downcast::<Service>().ok())
                        .is_some_and(|second| Arc::ptr_eq(&second, &instance));
                    if cached {
                        if let Some(prior) = observed.get(spec) {
                            assert!(Arc::ptr_eq(prior, &instance));
                        } else {
                            observed.insert(spec, instance);
                        }
                    }
                }
            }
            LifecycleOp::Unregister { slot } => {
                container.unregister(specifier(slot)).unwrap();
                observed.clear();
            }
            LifecycleOp::ClearCache => {
                container.clear_cache();
                observed.clear();
            }
        }
    }
});
