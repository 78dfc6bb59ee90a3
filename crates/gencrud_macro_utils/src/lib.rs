//! Shared utilities for gencrud procedural macro crates.
//!
//! Provides crate-path resolution so that generated code emits correct
//! fully-qualified paths regardless of whether the consumer depends on
//! `gencrud_store` directly or on the `gencrud` umbrella re-export.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// A gencrud crate that macro-generated code may reference.
pub enum GencrudCrate {
    /// `gencrud_store`
    Store,
}

impl GencrudCrate {
    /// Returns the `Cargo.toml` package name for this crate.
    fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "gencrud_store",
        }
    }

    /// Returns the module under which the `gencrud` umbrella re-exports this crate.
    fn umbrella_module(&self) -> &'static str {
        match self {
            Self::Store => "store",
        }
    }
}

/// Returns a [`TokenStream`] path for the given gencrud crate.
///
/// Resolution order:
/// 1. Direct dependency (possibly renamed in `Cargo.toml`).
/// 2. Indirect access via the `gencrud` umbrella crate (`gencrud::store`).
/// 3. Fallback to the literal crate name (compile error will point the user
///    to the missing dependency).
pub fn resolve_crate_path(krate: GencrudCrate) -> TokenStream {
    let name = krate.as_str();

    match crate_name(name) {
        Ok(FoundCrate::Itself) => {
            let ident = format_ident!("{}", name);
            quote!(::#ident)
        }
        Ok(FoundCrate::Name(found)) => {
            let ident = format_ident!("{}", found);
            quote!(::#ident)
        }
        Err(_) => match crate_name("gencrud") {
            Ok(FoundCrate::Name(found)) => {
                let umbrella = format_ident!("{}", found);
                let module = format_ident!("{}", krate.umbrella_module());
                quote!(::#umbrella::#module)
            }
            Ok(FoundCrate::Itself) => {
                let module = format_ident!("{}", krate.umbrella_module());
                quote!(::gencrud::#module)
            }
            Err(_) => {
                let ident = format_ident!("{}", name);
                quote!(::#ident)
            }
        },
    }
}
