//! Code synthesis for `#[derive(GenCrud)]`.
//!
//! Output consists of three parts, always in the same order:
//!
//! 1. The `Record` impl describing the persisted fields.
//! 2. An inherent impl on the model with one forwarder per [`Operation`].
//! 3. The `<Model>Actor` peer type carrying the real implementations.

mod member;
mod operation;
mod peer;
mod record;

pub(crate) use operation::Operation;

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Ident, Visibility};

use crate::declaration::Declaration;
use crate::schema::FieldSchema;

/// Everything a renderer needs to know about the model.
pub(crate) struct Context<'a> {
    pub model: &'a Ident,
    pub actor: Ident,
    pub vis: &'a Visibility,
    pub schema: &'a [FieldSchema],
    pub transient: Vec<&'a Ident>,
    /// Path to the storage runtime, e.g. `::gencrud_store`.
    pub store: &'a TokenStream,
}

impl Context<'_> {
    /// Persisted field identifiers, in order.
    fn idents(&self) -> impl Iterator<Item = &Ident> {
        self.schema.iter().map(|field| &field.ident)
    }

    /// `name: Type` for every persisted field.
    fn params(&self) -> Vec<TokenStream> {
        self.schema
            .iter()
            .map(|FieldSchema { ident, ty, .. }| quote! { #ident: #ty })
            .collect()
    }

    /// `name: Option<Type>` for every persisted field.
    fn optional_params(&self) -> Vec<TokenStream> {
        self.schema
            .iter()
            .map(|FieldSchema { ident, ty, .. }| quote! { #ident: ::core::option::Option<#ty> })
            .collect()
    }

    /// An identifier based on `base` that no persisted field uses.
    fn free_ident(&self, base: &str) -> Ident {
        if self.schema.iter().any(|field| field.name == base) {
            format_ident!("__gencrud_{}", base)
        } else {
            format_ident!("{}", base)
        }
    }
}

/// The complete expansion for one model.
pub(crate) struct GeneratedArtifact {
    pub record: TokenStream,
    pub members: Vec<(Operation, TokenStream)>,
    pub peer: TokenStream,
    model: Ident,
}

impl ToTokens for GeneratedArtifact {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let model = &self.model;
        let record = &self.record;
        let members = self.members.iter().map(|(_, body)| body);
        let peer = &self.peer;

        tokens.extend(quote! {
            #record

            impl #model {
                #(#members)*
            }

            #peer
        });
    }
}

/// Synthesizes the record impl, the member forwarders and the actor peer.
pub(crate) fn synthesize(
    declaration: &Declaration<'_>,
    schema: &[FieldSchema],
    store: &TokenStream,
) -> GeneratedArtifact {
    let context = Context {
        model: declaration.name,
        actor: format_ident!("{}Actor", declaration.name),
        vis: declaration.vis,
        schema,
        transient: declaration
            .transient_members()
            .map(|member| member.ident)
            .collect(),
        store,
    };

    let members = Operation::ALL
        .iter()
        .map(|op| (*op, (op.renderer().member)(&context)))
        .collect();

    GeneratedArtifact {
        record: record::render(&context),
        members,
        peer: peer::render(&context),
        model: declaration.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use syn::{DeriveInput, ImplItem, Item, parse_quote};

    fn expand(input: DeriveInput) -> TokenStream {
        let declaration = Declaration::from_derive_input(&input).unwrap();
        let schema = schema::extract(&declaration).unwrap();
        synthesize(&declaration, &schema, &quote!(::gencrud_store)).to_token_stream()
    }

    fn todo() -> DeriveInput {
        parse_quote! {
            pub struct Todo {
                #[persisted(primary_key)]
                _id: ObjectId,
                #[persisted]
                name: String,
                #[persisted]
                owner: String,
                #[persisted]
                status: String,
                scratch: Option<String>,
            }
        }
    }

    fn file(tokens: TokenStream) -> syn::File {
        syn::parse2(tokens).unwrap()
    }

    fn impl_fns<'a>(file: &'a syn::File, self_ty: &str) -> Vec<&'a syn::ImplItemFn> {
        file.items
            .iter()
            .filter_map(|item| match item {
                Item::Impl(imp) if imp.trait_.is_none() => Some(imp),
                _ => None,
            })
            .filter(|imp| imp.self_ty.to_token_stream().to_string() == self_ty)
            .flat_map(|imp| imp.items.iter())
            .filter_map(|item| match item {
                ImplItem::Fn(func) => Some(func),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn expansion_is_deterministic() {
        assert_eq!(expand(todo()).to_string(), expand(todo()).to_string());
    }

    #[test]
    fn members_are_the_five_operations_in_order() {
        let file = file(expand(todo()));
        let names: Vec<_> = impl_fns(&file, "Todo")
            .iter()
            .map(|func| func.sig.ident.to_string())
            .collect();
        assert_eq!(names, ["create", "update", "delete", "list", "observe"]);
    }

    #[test]
    fn exactly_one_actor_type_is_emitted() {
        let file = file(expand(todo()));
        let structs: Vec<_> = file
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Struct(item) => Some(item.ident.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(structs, ["TodoActor"]);
    }

    #[test]
    fn actor_implements_every_operation() {
        let file = file(expand(todo()));
        let names: Vec<_> = impl_fns(&file, "TodoActor")
            .iter()
            .map(|func| func.sig.ident.to_string())
            .collect();
        for op in Operation::ALL {
            assert!(names.contains(&op.name().to_string()), "missing {}", op.name());
        }
    }

    #[test]
    fn create_takes_every_persisted_field() {
        let file = file(expand(todo()));
        let create = impl_fns(&file, "Todo")
            .into_iter()
            .find(|func| func.sig.ident == "create")
            .unwrap();
        let params: Vec<_> = create
            .sig
            .inputs
            .iter()
            .map(|arg| arg.to_token_stream().to_string())
            .collect();
        assert_eq!(
            params,
            [
                "_id : ObjectId",
                "name : String",
                "owner : String",
                "status : String"
            ]
        );
    }

    #[test]
    fn update_takes_optional_fields() {
        let file = file(expand(todo()));
        let update = impl_fns(&file, "Todo")
            .into_iter()
            .find(|func| func.sig.ident == "update")
            .unwrap();
        let params: Vec<_> = update
            .sig
            .inputs
            .iter()
            .map(|arg| arg.to_token_stream().to_string())
            .collect();
        assert_eq!(params[0], "& mut self");
        assert_eq!(params[2], "name : :: core :: option :: Option < String >");
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn observe_docs_name_the_default_context() {
        let file = file(expand(todo()));
        for self_ty in ["Todo", "TodoActor"] {
            let observe = impl_fns(&file, self_ty)
                .into_iter()
                .find(|func| func.sig.ident == "observe")
                .unwrap();
            let docs: String = observe
                .attrs
                .iter()
                .filter(|attr| attr.path().is_ident("doc"))
                .map(|attr| attr.to_token_stream().to_string())
                .collect();
            assert!(docs.contains("ExecutionContext::default()"), "{self_ty}: {docs}");
        }
    }

    #[test]
    fn actor_params_spell_self_as_the_model() {
        let file = file(expand(parse_quote! {
            struct Node {
                #[persisted]
                children: Vec<Self>,
            }
        }));
        let create = impl_fns(&file, "NodeActor")
            .into_iter()
            .find(|func| func.sig.ident == "create")
            .unwrap();
        let params: Vec<_> = create
            .sig
            .inputs
            .iter()
            .map(|arg| arg.to_token_stream().to_string())
            .collect();
        assert_eq!(params[1], "children : Vec < Node >");
    }

    #[test]
    fn object_parameter_avoids_field_names() {
        let tokens = expand(parse_quote! {
            struct Link {
                #[persisted]
                object: String,
            }
        });
        let file = file(tokens);
        let update = impl_fns(&file, "LinkActor")
            .into_iter()
            .find(|func| func.sig.ident == "update")
            .unwrap();
        let params: Vec<_> = update
            .sig
            .inputs
            .iter()
            .map(|arg| arg.to_token_stream().to_string())
            .collect();
        assert_eq!(params[1], "__gencrud_object : & Link");
        assert_eq!(params[2], "object : :: core :: option :: Option < String >");
    }

    #[test]
    fn schema_records_rendered_signatures() {
        let tokens = expand(parse_quote! {
            struct User {
                #[persisted]
                name: String,
                #[persisted]
                posts: Vec<Post>,
            }
        })
        .to_string();
        assert!(tokens.contains("\"Vec<Post>\""));
        assert!(tokens.contains("\"User\""));
    }
}
