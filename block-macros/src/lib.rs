//! Procedural macros for Block DI.
//!
//! `#[derive(Injectable)]` turns a struct's fields into constructor
//! parameters:
//!
//! - `Arc<T>` — required, resolved from the identifier of `T`
//! - `Option<Arc<T>>` — nullable, `None` when `T` is not registered
//! - `#[inject(id = "...")]` — resolve from an explicit identifier
//! - `#[inject(skip)]` — not a parameter, filled with `Default::default()`
//!
//! Generated code refers to `::block`. Crates using `block-container`
//! directly set `#[inject(crate = "::block_container")]` on the struct.

use darling::ast::{Data, Style};
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(inject), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), InjectableField>,
    #[darling(default, rename = "crate")]
    krate: Option<syn::Path>,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectableField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    #[darling(default)]
    id: Option<String>,
    #[darling(default)]
    skip: bool,
}

#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match InjectableInput::from_derive_input(&input) {
        Ok(parsed) => expand(parsed).into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: InjectableInput) -> TokenStream2 {
    let krate = input.krate.unwrap_or_else(|| syn::parse_quote!(::block));
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match input.data {
        Data::Struct(fields) => fields,
        Data::Enum(_) => unreachable!("darling rejects enums"),
    };

    let mut parameters = Vec::new();
    let mut initializers = Vec::new();

    for field in &fields.fields {
        // named or unit only, see `supports`
        let Some(name) = field.ident.as_ref() else { continue };
        let ty = &field.ty;

        if field.skip {
            if field.id.is_some() {
                return darling::Error::custom("`skip` and `id` cannot be combined")
                    .with_span(name)
                    .write_errors();
            }
            initializers.push(quote! { #name: ::std::default::Default::default() });
            continue;
        }

        let parameter_name = name.to_string();
        let identifier = match &field.id {
            Some(id) => quote! {
                ::std::option::Option::Some(#krate::identifier::Identifier::new(#id))
            },
            None => quote! { ::std::option::Option::None },
        };

        parameters.push(quote! {
            <#ty as #krate::definition::Inject>::parameter(#parameter_name, #identifier)
        });
        initializers.push(quote! { #name: arguments.take::<#ty>()? });
    }

    let construct = match fields.style {
        Style::Unit => quote! { Self },
        _ => quote! { Self { #(#initializers),* } },
    };

    quote! {
        impl #impl_generics #krate::definition::Injectable for #ident #ty_generics #where_clause {
            fn parameters() -> ::std::vec::Vec<#krate::definition::Parameter> {
                ::std::vec![#(#parameters),*]
            }

            #[allow(unused_variables)]
            fn construct(
                arguments: &mut #krate::definition::Arguments,
            ) -> #krate::error::Result<Self> {
                ::std::result::Result::Ok(#construct)
            }
        }
    }
}
