#![no_main]

//! Fuzz target for container operation sequences
//!
//! Drives registration, lookup, enumeration, and unregistration with
//! arbitrary specifier strings. No operation sequence may panic.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use strata_di::{Container, Definition};

#[derive(Clone, Debug, Arbitrary)]
struct Payload {
    id: u32,
    name: String,
}

/// Operations to perform on the container
#[derive(Debug, Arbitrary)]
enum ContainerOp {
    RegisterValue { specifier: String, payload: Payload },
    RegisterFactory { specifier: String },
    Lookup { specifier: String },
    LookupErased { specifier: String },
    Has { specifier: String },
    DefinitionFor { specifier: String },
    AvailableForType { type_name: String },
    LookupAll { type_name: String },
    Unregister { specifier: String },
    ClearCache,
    ResolverNames,
}

fuzz_target!(|ops: Vec<ContainerOp>| {
    let container = Container::new();

    for op in ops {
        match op {
            ContainerOp::RegisterValue { specifier, payload } => {
                let _ = container.register(&specifier, Definition::value(payload));
            }
            ContainerOp::RegisterFactory { specifier } => {
                let _ = container.register(
                    &specifier,
                    Definition::factory(|| Payload {
                        id: 0,
                        name: String::new(),
                    }),
                );
            }
            ContainerOp::Lookup { specifier } => {
                let _ = container.lookup::<Payload>(&specifier);
            }
            ContainerOp::LookupErased { specifier } => {
                let _ = container.lookup_erased(&specifier);
            }
            ContainerOp::Has { specifier } => {
                let _ = container.has(&specifier);
            }
            ContainerOp::DefinitionFor { specifier } => {
                let _ = container.definition_for(&specifier);
            }
            ContainerOp::AvailableForType { type_name } => {
                let _ = container.available_for_type(&type_name);
            }
            ContainerOp::LookupAll { type_name } => {
                let _ = container.lookup_all::<Payload>(&type_name);
            }
            ContainerOp::Unregister { specifier } => {
                let _ = container.unregister(&specifier);
            }
            ContainerOp::ClearCache => {
                container.clear_cache();
            }
            ContainerOp::ResolverNames => {
                let _ = container.resolver_names();
            }
        }
    }
});
