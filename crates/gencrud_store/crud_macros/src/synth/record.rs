//! The `Record` impl.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;

use super::Context;

pub(super) fn render(cx: &Context<'_>) -> TokenStream {
    let Context {
        model,
        schema,
        transient,
        store,
        ..
    } = cx;

    let type_name = model.unraw().to_string();

    let entries = schema.iter().map(|field| {
        let name = &field.name;
        let signature = field.signature.to_string();
        let primary_key = field.primary_key;
        let indexed = field.indexed;
        quote! {
            #store::FieldSchema::new(#name, #signature, #primary_key, #indexed)
        }
    });

    let inserts = schema.iter().map(|field| {
        let ident = &field.ident;
        let name = &field.name;
        quote! {
            __gencrud_values.insert(
                ::std::string::String::from(#name),
                #store::to_value(&self.#ident)?,
            );
        }
    });

    let reads = schema.iter().map(|field| {
        let ident = &field.ident;
        let name = &field.name;
        quote! {
            #ident: #store::field(__gencrud_values, #type_name, #name)?
        }
    });

    quote! {
        impl #store::Record for #model {
            const TYPE_NAME: &'static str = #type_name;

            const SCHEMA: &'static [#store::FieldSchema] = &[
                #(#entries),*
            ];

            fn to_values(&self) -> ::core::result::Result<#store::Values, #store::StoreError> {
                let mut __gencrud_values = #store::Values::new();
                #(#inserts)*
                ::core::result::Result::Ok(__gencrud_values)
            }

            fn from_values(
                __gencrud_values: &#store::Values,
            ) -> ::core::result::Result<Self, #store::StoreError> {
                ::core::result::Result::Ok(Self {
                    #(#reads,)*
                    #(#transient: ::core::default::Default::default(),)*
                })
            }
        }
    }
}
