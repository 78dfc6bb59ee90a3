//! Rendering of persisted field types into schema signatures.

use core::fmt;
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Expr, GenericArgument, Ident, PathArguments, Type, TypePath};

use crate::error::ExpansionError;

/// Resolved shape of a persisted field's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeSignature {
    /// `a::b::Base<Arg, ...>`.
    Path {
        base: String,
        arguments: Vec<GenericSignature>,
    },
    /// `(A, B)`.
    Tuple(Vec<TypeSignature>),
    /// `[T; N]`.
    Array {
        element: Box<TypeSignature>,
        len: String,
    },
    /// `[T]`, as in `Box<[T]>`.
    Slice(Box<TypeSignature>),
}

/// A resolved generic argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GenericSignature {
    Type(TypeSignature),
    /// A literal const argument such as the `16` in `ArrayString<16>`.
    Const(String),
}

impl TypeSignature {
    /// Resolves the declared type of `member`.
    ///
    /// Fails on the inferred placeholder `_`, on borrowed or otherwise
    /// non-owned types, and on generic arguments that are not types.
    pub(crate) fn resolve(ty: &Type, member: &Ident) -> Result<Self, ExpansionError> {
        match ty {
            Type::Infer(_) => Err(ExpansionError::MissingTypeAnnotation {
                member: member.clone(),
            }),
            Type::Group(group) => Self::resolve(&group.elem, member),
            Type::Paren(paren) => Self::resolve(&paren.elem, member),
            Type::Path(path) => Self::resolve_path(path, member),
            Type::Tuple(tuple) => tuple
                .elems
                .iter()
                .map(|elem| Self::resolve(elem, member))
                .collect::<Result<_, _>>()
                .map(Self::Tuple),
            Type::Array(array) => Ok(Self::Array {
                element: Box::new(Self::resolve(&array.elem, member)?),
                len: array.len.to_token_stream().to_string(),
            }),
            Type::Slice(slice) => Ok(Self::Slice(Box::new(Self::resolve(&slice.elem, member)?))),
            other => Err(unsupported(other, member)),
        }
    }

    fn resolve_path(path: &TypePath, member: &Ident) -> Result<Self, ExpansionError> {
        if path.qself.is_some() {
            return Err(unsupported(path, member));
        }

        let segments = &path.path.segments;
        let mut base = String::new();
        if path.path.leading_colon.is_some() {
            base.push_str("::");
        }
        let mut arguments = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 {
                base.push_str("::");
            }
            base.push_str(&segment.ident.to_string());

            let is_last = index + 1 == segments.len();
            match &segment.arguments {
                PathArguments::None => {}
                PathArguments::AngleBracketed(args) if is_last => {
                    arguments = args
                        .args
                        .iter()
                        .map(|arg| GenericSignature::resolve(arg, member))
                        .collect::<Result<_, _>>()?;
                }
                PathArguments::AngleBracketed(_) | PathArguments::Parenthesized(_) => {
                    return Err(unsupported(path, member));
                }
            }
        }

        Ok(Self::Path { base, arguments })
    }
}

impl GenericSignature {
    fn resolve(arg: &GenericArgument, member: &Ident) -> Result<Self, ExpansionError> {
        match arg {
            GenericArgument::Type(Type::Infer(_)) => Err(unresolved(arg, member)),
            GenericArgument::Type(ty) => TypeSignature::resolve(ty, member).map(Self::Type),
            GenericArgument::Const(Expr::Lit(lit)) => Ok(Self::Const(lit.to_token_stream().to_string())),
            _ => Err(unresolved(arg, member)),
        }
    }
}

fn unsupported(ty: &impl ToTokens, member: &Ident) -> ExpansionError {
    ExpansionError::UnsupportedType {
        member: member.clone(),
        ty: ty.to_token_stream().to_string(),
        span: ty.span(),
    }
}

fn unresolved(arg: &GenericArgument, member: &Ident) -> ExpansionError {
    ExpansionError::UnresolvedGenericArgument {
        member: member.clone(),
        argument: arg.to_token_stream().to_string(),
        span: arg.span(),
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { base, arguments } => {
                f.write_str(base)?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    join(f, arguments)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Tuple(elems) if elems.len() == 1 => write!(f, "({},)", elems[0]),
            Self::Tuple(elems) => {
                f.write_str("(")?;
                join(f, elems)?;
                f.write_str(")")
            }
            Self::Array { element, len } => write!(f, "[{element}; {len}]"),
            Self::Slice(element) => write!(f, "[{element}]"),
        }
    }
}

impl fmt::Display for GenericSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(ty) => fmt::Display::fmt(ty, f),
            Self::Const(value) => f.write_str(value),
        }
    }
}
