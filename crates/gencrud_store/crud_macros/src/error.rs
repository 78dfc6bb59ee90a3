//! Expansion errors and their conversion into compiler diagnostics.

use proc_macro2::{Span, TokenStream};
use syn::Ident;

/// Why a `#[derive(GenCrud)]` expansion produced no code.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ExpansionError {
    /// The input is not a struct with named fields.
    #[error("#[derive(GenCrud)] requires a struct with named fields, but `{name}` is {found}")]
    StructuralMismatch { name: Ident, found: &'static str },

    /// A persisted field's type is the inferred placeholder `_`.
    #[error("persisted field `{member}` needs an explicit type annotation")]
    MissingTypeAnnotation { member: Ident },

    /// A generic argument of a persisted field's type is not a type.
    #[error("generic argument `{argument}` of persisted field `{member}` cannot be resolved to a type")]
    UnresolvedGenericArgument {
        member: Ident,
        argument: String,
        span: Span,
    },

    /// A persisted field's type cannot be stored by value.
    #[error("persisted field `{member}` has unsupported type `{ty}`")]
    UnsupportedType {
        member: Ident,
        ty: String,
        span: Span,
    },

    /// More than one field is marked `primary_key`.
    #[error("`{member}` cannot be a primary key: `{first}` already is")]
    DuplicatePrimaryKey { member: Ident, first: Ident },

    /// The model declares generic parameters.
    #[error("#[derive(GenCrud)] does not support generic parameters on `{name}`")]
    UnsupportedGenerics { name: Ident, span: Span },

    /// A `#[persisted(...)]` attribute could not be parsed.
    #[error("invalid #[persisted] attribute")]
    InvalidAttribute(#[from] darling::Error),
}

impl ExpansionError {
    /// Span the diagnostic points at.
    fn span(&self) -> Span {
        match self {
            Self::StructuralMismatch { name, .. } => name.span(),
            Self::MissingTypeAnnotation { member } => member.span(),
            Self::DuplicatePrimaryKey { member, .. } => member.span(),
            Self::UnresolvedGenericArgument { span, .. }
            | Self::UnsupportedType { span, .. }
            | Self::UnsupportedGenerics { span, .. } => *span,
            Self::InvalidAttribute(_) => Span::call_site(),
        }
    }

    /// Renders the error as `compile_error!` invocations.
    pub(crate) fn into_compile_error(self) -> TokenStream {
        match self {
            Self::InvalidAttribute(err) => err.write_errors(),
            other => syn::Error::new(other.span(), other.to_string()).to_compile_error(),
        }
    }
}
