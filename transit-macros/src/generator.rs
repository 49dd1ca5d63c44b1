//! `#[generator]` attribute macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    FnArg, Ident, ItemFn, LitStr, Pat, ReturnType, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[generator]` macro.
pub(crate) struct GeneratorArgs {
    pub tag: Option<LitStr>,
}

impl Parse for GeneratorArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut tag = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "tag" => {
                    let lit: LitStr = input.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "generator tag must not be empty"));
                    }
                    tag = Some(lit);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(GeneratorArgs { tag })
    }
}

/// Implementation of the `#[generator]` attribute macro.
pub fn generator_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as GeneratorArgs);
    let input = parse_macro_input!(item as ItemFn);

    let fn_name = &input.sig.ident;

    if let Some(asyncness) = &input.sig.asyncness {
        return syn::Error::new_spanned(asyncness, "generator function must not be async")
            .to_compile_error()
            .into();
    }

    let action_type = match &input.sig.output {
        ReturnType::Type(_, ty) => ty,
        ReturnType::Default => {
            return syn::Error::new_spanned(
                &input.sig,
                "generator function must return the action it produces",
            )
            .to_compile_error()
            .into();
        }
    };

    // Arguments are captured by the generator and cloned on every run.
    let mut rebinds = Vec::new();
    for arg in &input.sig.inputs {
        match arg {
            FnArg::Typed(pat_type) => match &*pat_type.pat {
                Pat::Ident(pat_ident) => {
                    let ident = &pat_ident.ident;
                    rebinds.push(quote! {
                        let #ident = ::core::clone::Clone::clone(&#ident);
                    });
                }
                other => {
                    return syn::Error::new_spanned(
                        other,
                        "generator arguments must be plain identifiers",
                    )
                    .to_compile_error()
                    .into();
                }
            },
            FnArg::Receiver(receiver) => {
                return syn::Error::new_spanned(receiver, "generator cannot have self parameter")
                    .to_compile_error()
                    .into();
            }
        }
    }

    let tag = match &args.tag {
        Some(tag) => quote! { #tag },
        None => quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#fn_name)) },
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let mut sig = input.sig.clone();
    sig.output = syn::parse_quote! { -> ::transit::Thunk<#action_type> };
    let block = &input.block;

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            ::transit::Thunk::marked(#tag, move || -> #action_type {
                #(#rebinds)*
                #block
            })
        }
    };

    TokenStream::from(expanded)
}
