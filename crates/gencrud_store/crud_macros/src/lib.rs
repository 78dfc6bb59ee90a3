//! Procedural macros for `gencrud_store`.
//!
//! This crate provides `#[derive(GenCrud)]`, which turns a plain struct into
//! a persisted model with create, update, delete, list and observe
//! operations plus a peer `<Model>Actor` type that serializes them.

mod declaration;
mod error;
mod schema;
mod signature;
mod synth;

use proc_macro::TokenStream;
use quote::ToTokens;
use syn::{DeriveInput, parse_macro_input};

use crate::declaration::Declaration;
use crate::error::ExpansionError;

/// Derive macro generating CRUD operations for a model.
///
/// Fields marked `#[persisted]` make up the stored schema. Unmarked fields
/// are left alone and come back as their `Default` when a record is read.
///
/// # Attributes
///
/// - `#[persisted]`: the field is stored.
/// - `#[persisted(primary_key)]`: the field is stored and identifies the
///   record. At most one field may carry it.
/// - `#[persisted(indexed)]`: the field is stored and flagged as indexed in
///   the schema.
///
/// # Generated items
///
/// - An implementation of `gencrud_store::Record`.
/// - `create`, `update`, `delete`, `list` and `observe` on the model, each
///   forwarding to a fresh actor on the default configuration.
/// - `<Model>Actor`, with the same five operations plus `new`, `state`,
///   `configuration` and `close`.
///
/// # Example
///
/// ```
/// use gencrud_store::{GenCrud, ObjectId, Record};
///
/// #[derive(Debug, GenCrud)]
/// pub struct Todo {
///     #[persisted(primary_key)]
///     pub id: ObjectId,
///     #[persisted]
///     pub name: String,
///     #[persisted]
///     pub status: String,
/// }
///
/// assert_eq!(Todo::primary_key_field(), Some("id"));
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut todo = Todo::create(ObjectId::generate(), "Ship".into(), "open".into()).await?;
/// todo.update(None, None, Some("done".into())).await?;
/// assert_eq!(todo.status, "done");
/// todo.delete().await?;
/// # Ok::<(), gencrud_store::StoreError>(())
/// # }).unwrap();
/// ```
#[proc_macro_derive(GenCrud, attributes(persisted))]
pub fn derive_gen_crud(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Runs the adapter, the extractor and the synthesizer in order.
///
/// Any failure aborts the whole expansion; no partial output is produced.
fn expand(input: &DeriveInput) -> Result<proc_macro2::TokenStream, ExpansionError> {
    let declaration = Declaration::from_derive_input(input)?;
    declaration.require_model()?;
    let schema = schema::extract(&declaration)?;
    let store = gencrud_macro_utils::resolve_crate_path(gencrud_macro_utils::GencrudCrate::Store);
    Ok(synth::synthesize(&declaration, &schema, &store).to_token_stream())
}
