//! Adapter from the parsed derive input to the declaration model.
//!
//! The rest of the macro never looks at `syn::DeriveInput` directly: it sees a
//! [`Declaration`] whose members carry an already-parsed persistence marker.

use darling::FromMeta;
use darling::ast::NestedMeta;
use syn::{Attribute, Data, DeriveInput, Fields, Generics, Ident, Meta, Type, Visibility};

use crate::error::ExpansionError;

/// Path of the persistence marker attribute.
pub(crate) const MARKER: &str = "persisted";

/// Arguments of a `#[persisted]` / `#[persisted(primary_key, indexed)]` marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromMeta)]
#[darling(default)]
pub(crate) struct PersistedAttr {
    /// The field identifies the record.
    pub primary_key: bool,
    /// The field is recorded as indexed in the schema.
    pub indexed: bool,
}

impl PersistedAttr {
    /// Parses the marker out of a field's attributes.
    ///
    /// Returns `Ok(None)` for fields without the marker.
    pub(crate) fn from_attributes(attrs: &[Attribute]) -> darling::Result<Option<Self>> {
        let mut found = None;
        for attr in attrs.iter().filter(|attr| attr.path().is_ident(MARKER)) {
            if found.is_some() {
                return Err(darling::Error::custom("duplicate #[persisted] attribute").with_span(attr));
            }
            let parsed = match &attr.meta {
                Meta::Path(_) => Self::default(),
                Meta::List(list) => {
                    let items = NestedMeta::parse_meta_list(list.tokens.clone())?;
                    Self::from_list(&items).map_err(|err| err.with_span(attr))?
                }
                Meta::NameValue(_) => {
                    return Err(darling::Error::unsupported_format("name-value").with_span(attr));
                }
            };
            found = Some(parsed);
        }
        Ok(found)
    }
}

/// One named field of the declaration.
#[derive(Debug)]
pub(crate) struct Member<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub marker: Option<PersistedAttr>,
}

impl Member<'_> {
    /// Whether the field carries the persistence marker.
    pub(crate) fn is_persisted(&self) -> bool {
        self.marker.is_some()
    }
}

/// Shape of the annotated item.
#[derive(Debug)]
pub(crate) enum Shape<'a> {
    /// A struct with named fields, the only shape the derive supports.
    Struct(Vec<Member<'a>>),
    TupleStruct,
    UnitStruct,
    Enum,
    Union,
}

impl Shape<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Self::Struct(_) => "a struct",
            Self::TupleStruct => "a tuple struct",
            Self::UnitStruct => "a unit struct",
            Self::Enum => "an enum",
            Self::Union => "a union",
        }
    }
}

/// The annotated declaration as the extractor and synthesizer see it.
#[derive(Debug)]
pub(crate) struct Declaration<'a> {
    pub name: &'a Ident,
    pub vis: &'a Visibility,
    pub generics: &'a Generics,
    pub shape: Shape<'a>,
}

impl<'a> Declaration<'a> {
    /// Builds the declaration model, parsing every field's marker.
    pub(crate) fn from_derive_input(input: &'a DeriveInput) -> Result<Self, ExpansionError> {
        let shape = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(fields) => Shape::Struct(
                    fields
                        .named
                        .iter()
                        .filter_map(|field| field.ident.as_ref().map(|ident| (ident, field)))
                        .map(|(ident, field)| {
                            Ok(Member {
                                ident,
                                ty: &field.ty,
                                marker: PersistedAttr::from_attributes(&field.attrs)?,
                            })
                        })
                        .collect::<Result<_, ExpansionError>>()?,
                ),
                Fields::Unnamed(_) => Shape::TupleStruct,
                Fields::Unit => Shape::UnitStruct,
            },
            Data::Enum(_) => Shape::Enum,
            Data::Union(_) => Shape::Union,
        };

        Ok(Self {
            name: &input.ident,
            vis: &input.vis,
            generics: &input.generics,
            shape,
        })
    }

    /// Checks the structural preconditions of the derive.
    pub(crate) fn require_model(&self) -> Result<&[Member<'a>], ExpansionError> {
        let Shape::Struct(members) = &self.shape else {
            return Err(ExpansionError::StructuralMismatch {
                name: self.name.clone(),
                found: self.shape.describe(),
            });
        };
        if !self.generics.params.is_empty() {
            return Err(ExpansionError::UnsupportedGenerics {
                name: self.name.clone(),
                span: syn::spanned::Spanned::span(&self.generics),
            });
        }
        Ok(members)
    }

    /// Named fields that do not carry the persistence marker.
    pub(crate) fn transient_members(&self) -> impl Iterator<Item = &Member<'a>> {
        let members: &[Member<'a>] = match &self.shape {
            Shape::Struct(members) => members,
            _ => &[],
        };
        members.iter().filter(|member| !member.is_persisted())
    }
}
