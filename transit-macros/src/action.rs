//! Action-related macros.
//!
//! This module contains:
//! - `#[derive(Message)]` - Derive macro for implementing the `Message` trait
//! - `#[derive(Action)]` - Derive macro for implementing the `Action` trait

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, LitStr, parse_macro_input};

/// Derive macro for implementing `Message` trait.
pub fn derive_message_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::transit::Message for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// `#[action(...)]` options of a type or variant.
#[derive(Default)]
struct ActionArgs {
    kind: Option<String>,
    stop_propagation: bool,
}

impl ActionArgs {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut args = ActionArgs::default();
        for attr in attrs {
            if !attr.path().is_ident("action") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("kind") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(meta.error("action kind must not be empty"));
                    }
                    args.kind = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("stop_propagation") {
                    args.stop_propagation = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown action attribute, expected `kind` or `stop_propagation`"))
                }
            })?;
        }
        Ok(args)
    }
}

/// Implementation of `#[derive(Action)]`.
pub fn derive_action_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_action(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_action(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (kind_body, flags_body) = match &input.data {
        Data::Enum(data_enum) => {
            if data_enum.variants.is_empty() {
                (quote! { match *self {} }, quote! { match *self {} })
            } else {
                let mut kind_arms = Vec::new();
                let mut flag_arms = Vec::new();
                for variant in &data_enum.variants {
                    let args = ActionArgs::from_attrs(&variant.attrs)?;
                    let variant_name = &variant.ident;
                    let kind = args.kind.unwrap_or_else(|| variant_name.to_string());
                    let flags = flags_tokens(args.stop_propagation);
                    kind_arms.push(quote! {
                        Self::#variant_name { .. } => ::core::option::Option::Some(#kind)
                    });
                    flag_arms.push(quote! {
                        Self::#variant_name { .. } => #flags
                    });
                }
                (
                    quote! { match self { #(#kind_arms),* } },
                    quote! { match self { #(#flag_arms),* } },
                )
            }
        }
        Data::Struct(_) => {
            let args = ActionArgs::from_attrs(&input.attrs)?;
            let kind = args.kind.unwrap_or_else(|| name.to_string());
            let flags = flags_tokens(args.stop_propagation);
            (quote! { ::core::option::Option::Some(#kind) }, flags)
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "#[derive(Action)] can only be used on enums and structs",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::transit::Action for #name #ty_generics #where_clause {
            fn kind(&self) -> ::core::option::Option<&str> {
                #kind_body
            }

            fn flags(&self) -> ::transit::ActionFlags {
                #flags_body
            }
        }
    })
}

fn flags_tokens(stop_propagation: bool) -> proc_macro2::TokenStream {
    if stop_propagation {
        quote! { ::transit::ActionFlags::STOP_PROPAGATION }
    } else {
        quote! { ::transit::ActionFlags::empty() }
    }
}
