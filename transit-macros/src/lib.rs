//! Procedural macros for Transit.
//!
//! - `#[derive(Message)]` - implement the `Message` marker trait
//! - `#[derive(Action)]` - key an enum or struct on its variant / type name
//! - `#[generator]` - turn a function into a marked `Thunk` factory
//!
//! Generated code refers to the `transit` facade crate.

use proc_macro::TokenStream;

mod action;
mod generator;

/// Derive macro for implementing `Message` trait.
#[proc_macro_derive(Message)]
pub fn derive_message(input: TokenStream) -> TokenStream {
    action::derive_message_impl(input)
}

/// Derive macro for implementing `Action` trait.
///
/// The kind of a variant (or struct) is its name unless overridden with
/// `#[action(kind = "...")]`. `#[action(stop_propagation)]` marks it so the
/// middleware swallows it after listeners ran.
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    action::derive_action_impl(input)
}

/// Turn a function into a generator factory.
///
/// The function's return type is the action the generator produces; the
/// rewritten function returns a `Thunk` of it, tagged with the function's
/// path or with `#[generator(tag = "...")]`.
#[proc_macro_attribute]
pub fn generator(attr: TokenStream, item: TokenStream) -> TokenStream {
    generator::generator_impl(attr, item)
}
