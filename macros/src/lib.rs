//! Derive macros for Tidy Redux
//!
//! This crate provides procedural macros to reduce boilerplate when writing
//! action enums for a Tidy Redux store.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `ActionName`, including async markers
//!
//! # Example
//!
//! ```ignore
//! use tidy_redux_core::action::ActionName;
//! use tidy_redux_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     AddTodo { text: String },
//!
//!     #[async_action]
//!     FetchTodo { delay_ms: u64 },
//! }
//!
//! // Generated trait methods:
//! assert_eq!(TodoAction::AddTodo { text: "x".into() }.action_name(), "AddTodo");
//! assert!(TodoAction::FetchTodo { delay_ms: 10 }.is_async());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Variant, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates:
/// - an implementation of `tidy_redux_core::action::ActionName`:
///   `action_name()` returns the variant name and `is_async()` returns true
///   for variants marked `#[async_action]`
///
/// # Attributes
///
/// - `#[async_action]` - Mark a variant as a request for async work, to be
///   intercepted by a middleware before it reaches the reducer
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - `#[async_action]` is given arguments
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum SessionAction {
///     LoggedIn { user: String },
///
///     #[async_action]
///     Login { user: String, password: String },
///
///     LoggedOut,
/// }
///
/// let action = SessionAction::LoggedOut;
/// assert_eq!(action.action_name(), "LoggedOut");
/// assert!(!action.is_async());
/// ```
#[proc_macro_derive(Action, attributes(async_action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(
            &input,
            "#[derive(Action)] can only be used on enums"
        )
        .to_compile_error()
        .into();
    };

    for variant in &data_enum.variants {
        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("async_action")) {
            if attr.meta.require_path_only().is_err() {
                return syn::Error::new_spanned(attr, "#[async_action] takes no arguments")
                    .to_compile_error()
                    .into();
            }
        }
    }

    // Generate action_name() match arms
    let name_arms = data_enum.variants.iter().map(|variant| {
        let pattern = variant_pattern(variant);
        let variant_name = variant.ident.to_string();
        quote! { #pattern => #variant_name, }
    });

    // Generate is_async() match arms
    let async_arms = data_enum
        .variants
        .iter()
        .filter(|variant| has_attribute(&variant.attrs, "async_action"))
        .map(|variant| {
            let pattern = variant_pattern(variant);
            quote! { #pattern => true, }
        });

    // An empty enum has no values to match on
    let action_name_body = if data_enum.variants.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(#name_arms)*
            }
        }
    };

    let expanded = quote! {
        impl #impl_generics ::tidy_redux_core::action::ActionName for #name #ty_generics #where_clause {
            fn action_name(&self) -> &'static str {
                #action_name_body
            }

            #[allow(unreachable_patterns)]
            fn is_async(&self) -> bool {
                match self {
                    #(#async_arms)*
                    _ => false,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Match pattern for a variant, ignoring its fields
fn variant_pattern(variant: &Variant) -> proc_macro2::TokenStream {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident(name)
    })
}
