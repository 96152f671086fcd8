//! Derive macros for strata-di
//!
//! This crate provides `#[derive(Inject)]`, which generates the
//! `injected_fields` declaration list from struct fields marked `#[inject]`.
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_di::{Container, Inject, Injected};
//!
//! struct Store;
//! struct Session;
//!
//! #[derive(Inject)]
//! struct LoginAction {
//!     #[inject]
//!     store: Injected<Store>,
//!     #[inject]
//!     session: Injected<Session>,
//!     // Unmarked fields are ignored
//!     attempts: u32,
//! }
//!
//! let container = Container::new();
//! container.register_injectable("action:login", || LoginAction {
//!     store: Injected::parse("service:store").unwrap(),
//!     session: Injected::parse("service:session").unwrap(),
//!     attempts: 0,
//! }).unwrap();
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Type};

/// Derive macro for the `Inject` trait.
///
/// Generates `injected_fields()` returning, in declaration order:
///
/// - each field marked `#[inject]` (the field type must be `Injected<T>`)
/// - the fields of each embedded type marked `#[inject(nested)]` (the field
///   type must itself implement `Inject`)
///
/// Unmarked fields are ignored.
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Only support structs with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "Inject can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Inject can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    // Collect field accessors in declaration order
    let mut collectors = Vec::new();

    for field in fields.iter() {
        let field_name = field.ident.as_ref().unwrap();
        let field_type = &field.ty;

        match find_inject_attr(&field.attrs) {
            Some(InjectAttr::Slot) => {
                if !is_injected_type(field_type) {
                    return syn::Error::new_spanned(
                        field_type,
                        "Fields marked with #[inject] must have type Injected<T>",
                    )
                    .to_compile_error()
                    .into();
                }
                collectors.push(quote! {
                    fields.push(&self.#field_name as &dyn ::strata_di::InjectedField);
                });
            }
            Some(InjectAttr::Nested) => {
                collectors.push(quote! {
                    fields.extend(::strata_di::Inject::injected_fields(&self.#field_name));
                });
            }
            None => {}
        }
    }

    let expanded = quote! {
        impl #impl_generics ::strata_di::Inject for #name #ty_generics #where_clause {
            fn injected_fields(&self) -> ::std::vec::Vec<&dyn ::strata_di::InjectedField> {
                let mut fields = ::std::vec::Vec::new();
                #(#collectors)*
                fields
            }
        }
    };

    TokenStream::from(expanded)
}

/// Kinds of inject attributes
enum InjectAttr {
    /// `#[inject]` - an `Injected<T>` slot
    Slot,
    /// `#[inject(nested)]` - an embedded `Inject` type whose fields are
    /// concatenated into this list
    Nested,
}

/// Find and parse the #[inject] attribute
fn find_inject_attr(attrs: &[Attribute]) -> Option<InjectAttr> {
    for attr in attrs {
        if attr.path().is_ident("inject") {
            // Bare #[inject]
            if attr.meta.require_path_only().is_ok() {
                return Some(InjectAttr::Slot);
            }

            // Parse inject(nested)
            if let Ok(nested) = attr.parse_args::<syn::Ident>() {
                if nested == "nested" {
                    return Some(InjectAttr::Nested);
                }
            }

            // Default to a plain slot
            return Some(InjectAttr::Slot);
        }
    }
    None
}

/// Check that a type path ends in `Injected<T>`
fn is_injected_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Injected" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    return matches!(args.args.first(), Some(syn::GenericArgument::Type(_)));
                }
            }
        }
    }
    false
}
