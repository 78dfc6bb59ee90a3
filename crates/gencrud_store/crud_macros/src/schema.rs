//! Schema extraction: the persisted fields of a declaration, in order.

use quote::ToTokens;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{Ident, Type, TypePath};

use crate::declaration::{Declaration, Shape};
use crate::error::ExpansionError;
use crate::signature::TypeSignature;

/// One persisted field.
#[derive(Debug, Clone)]
pub(crate) struct FieldSchema {
    /// The field identifier as written, raw prefix included.
    pub ident: Ident,
    /// Stored name: the identifier without any `r#` prefix.
    pub name: String,
    /// Declared type with `Self` spelled as the model name, emitted into
    /// generated signatures.
    pub ty: Type,
    /// Rendered type, recorded in the runtime schema.
    pub signature: TypeSignature,
    pub primary_key: bool,
    pub indexed: bool,
}

/// Extracts the persisted fields of `declaration` in declaration order.
///
/// Declarations that are not structs with named fields have no schema;
/// the caller reports them. Fails on the first persisted field whose type
/// cannot be resolved, and on a second primary key.
pub(crate) fn extract(declaration: &Declaration<'_>) -> Result<Vec<FieldSchema>, ExpansionError> {
    let Shape::Struct(members) = &declaration.shape else {
        return Ok(Vec::new());
    };

    let mut schema = Vec::new();
    let mut primary_key: Option<&Ident> = None;

    for member in members {
        let Some(marker) = member.marker else {
            continue;
        };

        let ty = name_self(member.ty, declaration.name, member.ident)?;
        let signature = TypeSignature::resolve(&ty, member.ident)?;

        if marker.primary_key {
            if let Some(first) = primary_key {
                return Err(ExpansionError::DuplicatePrimaryKey {
                    member: member.ident.clone(),
                    first: first.clone(),
                });
            }
            primary_key = Some(member.ident);
        }

        schema.push(FieldSchema {
            ident: member.ident.clone(),
            name: member.ident.unraw().to_string(),
            ty,
            signature,
            primary_key: marker.primary_key,
            indexed: marker.indexed,
        });
    }

    Ok(schema)
}

/// Rewrites `Self` in `ty` to the model name.
///
/// Generated code also places field types inside `impl <Model>Actor`, where
/// `Self` names the actor. Paths through `Self`, such as `Self::Id`, are
/// rejected.
fn name_self(ty: &Type, model: &Ident, member: &Ident) -> Result<Type, ExpansionError> {
    let mut ty = ty.clone();
    let mut renamer = SelfRenamer {
        model,
        rejected: None,
    };
    renamer.visit_type_mut(&mut ty);
    match renamer.rejected {
        Some(path) => Err(ExpansionError::UnsupportedType {
            member: member.clone(),
            ty: path.to_token_stream().to_string(),
            span: path.span(),
        }),
        None => Ok(ty),
    }
}

struct SelfRenamer<'a> {
    model: &'a Ident,
    rejected: Option<TypePath>,
}

impl VisitMut for SelfRenamer<'_> {
    fn visit_type_path_mut(&mut self, path: &mut TypePath) {
        let names_self = path.qself.is_none()
            && path.path.leading_colon.is_none()
            && path
                .path
                .segments
                .first()
                .is_some_and(|segment| segment.ident == "Self");

        if names_self {
            if path.path.segments.len() > 1 {
                self.rejected.get_or_insert_with(|| path.clone());
                return;
            }
            if let Some(segment) = path.path.segments.first_mut() {
                let mut model = self.model.clone();
                model.set_span(segment.ident.span());
                segment.ident = model;
            }
        }
        visit_mut::visit_type_path_mut(self, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{DeriveInput, parse_quote};

    fn schema_of(input: DeriveInput) -> Result<Vec<FieldSchema>, ExpansionError> {
        let declaration = Declaration::from_derive_input(&input)?;
        extract(&declaration)
    }

    #[test]
    fn only_marked_fields_in_declaration_order() {
        let schema = schema_of(parse_quote! {
            struct Todo {
                #[persisted(primary_key)]
                _id: ObjectId,
                scratch: String,
                #[persisted]
                name: String,
                #[persisted]
                owner: String,
                ignored: Option<String>,
                #[persisted]
                status: String,
            }
        })
        .unwrap();

        let names: Vec<_> = schema.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, ["_id", "name", "owner", "status"]);
        assert!(schema[0].primary_key);
        assert!(schema[1..].iter().all(|field| !field.primary_key));
    }

    #[test]
    fn signatures_include_generic_arguments() {
        let schema = schema_of(parse_quote! {
            struct User {
                #[persisted]
                posts: Vec<Post>,
                #[persisted]
                name: String,
            }
        })
        .unwrap();

        assert_eq!(schema[0].signature.to_string(), "Vec<Post>");
        assert_eq!(schema[1].signature.to_string(), "String");
    }

    #[test]
    fn self_is_spelled_as_the_model() {
        let schema = schema_of(parse_quote! {
            struct Node {
                #[persisted]
                label: String,
                #[persisted]
                children: Vec<Self>,
                #[persisted]
                parent: Option<Box<Self>>,
            }
        })
        .unwrap();

        assert_eq!(schema[1].signature.to_string(), "Vec<Node>");
        assert_eq!(schema[2].signature.to_string(), "Option<Box<Node>>");
        let expected: Type = parse_quote!(Vec<Node>);
        assert_eq!(schema[1].ty, expected);
    }

    #[test]
    fn paths_through_self_are_rejected() {
        let err = schema_of(parse_quote! {
            struct Node {
                #[persisted]
                id: Self::Id,
            }
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ExpansionError::UnsupportedType { member, .. } if member == "id"
        ));
    }

    #[test]
    fn raw_identifiers_are_stored_unraw() {
        let schema = schema_of(parse_quote! {
            struct Item {
                #[persisted]
                r#type: String,
            }
        })
        .unwrap();

        assert_eq!(schema[0].name, "type");
        assert_eq!(schema[0].ident.to_string(), "r#type");
    }

    #[test]
    fn missing_type_annotation_names_the_member() {
        let err = schema_of(parse_quote! {
            struct Todo {
                #[persisted]
                name: String,
                #[persisted]
                owner: _,
            }
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ExpansionError::MissingTypeAnnotation { member } if member == "owner"
        ));
    }

    #[test]
    fn unmarked_inferred_fields_are_ignored() {
        let schema = schema_of(parse_quote! {
            struct Todo {
                #[persisted]
                name: String,
                later: _,
            }
        })
        .unwrap();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn second_primary_key_is_rejected() {
        let err = schema_of(parse_quote! {
            struct Todo {
                #[persisted(primary_key)]
                id: u64,
                #[persisted(primary_key)]
                slug: String,
            }
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ExpansionError::DuplicatePrimaryKey { member, first } if member == "slug" && first == "id"
        ));
    }

    #[test]
    fn non_structs_have_an_empty_schema() {
        let schema = schema_of(parse_quote! {
            enum Status { Open, Closed }
        })
        .unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn no_marked_fields_is_an_empty_schema() {
        let schema = schema_of(parse_quote! {
            struct Empty { note: String }
        })
        .unwrap();
        assert!(schema.is_empty());
    }
}
