#![no_main]

//! Fuzz target for specifier parsing
//!
//! Parsing must never panic, and accepted input must round-trip through
//! Display.

use libfuzzer_sys::fuzz_target;
use strata_di::Specifier;

fuzz_target!(|raw: &str| {
    match Specifier::parse(raw) {
        Ok(spec) => {
            // Accepted input round-trips exactly
            let rendered = spec.to_string();
            assert_eq!(rendered, raw);
            let reparsed = Specifier::parse(&rendered).expect("round-trip must parse");
            assert_eq!(reparsed, spec);

            // Tokens are non-empty and colon-free
            assert!(!spec.type_name().is_empty());
            assert!(!spec.name().is_empty());
            assert!(!spec.type_name().contains(':'));
            assert!(!spec.name().contains(':'));
        }
        Err(_) => {
            // Rejection is fine; panics are not
        }
    }
});
