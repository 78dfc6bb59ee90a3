//! Derive CRUD operations for plain Rust structs.
//!
//! `#[derive(GenCrud)]` turns a struct whose stored fields carry
//! `#[persisted]` into a model with `create`, `update`, `delete`, `list`
//! and `observe`, and emits a peer `<Model>Actor` that runs those
//! operations against a [`store::Store`] one at a time.
//!
//! ```
//! use gencrud::prelude::*;
//!
//! #[derive(Debug, GenCrud)]
//! pub struct Todo {
//!     #[persisted(primary_key)]
//!     pub id: ObjectId,
//!     #[persisted]
//!     pub name: String,
//! }
//!
//! assert_eq!(<Todo as Record>::SCHEMA[1].type_signature, "String");
//! ```

pub use gencrud_store as store;
pub use gencrud_store::GenCrud;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use gencrud_store::prelude::*;
}
