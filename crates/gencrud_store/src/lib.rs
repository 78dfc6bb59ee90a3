//! Storage runtime for `#[derive(GenCrud)]` models.
//!
//! This crate provides:
//!
//! - [`Record`]: The model contract the derive implements, covering the persisted-field
//!   schema plus conversions to and from name→value maps.
//! - [`Store`] and [`Transaction`]: An in-memory store with scoped,
//!   all-or-nothing write transactions and point-in-time reads.
//! - [`ModelActor`]: The serialization boundary wrapped by every generated
//!   `<Model>Actor`.
//! - [`Observation`] and [`CollectionChange`]: Live change notifications.
//! - [`GenCrud`]: The derive macro itself.
//!
//! # Derive Macro
//!
//! ```
//! use gencrud_store::{Configuration, GenCrud, ObjectId};
//!
//! #[derive(Debug, GenCrud)]
//! pub struct Todo {
//!     #[persisted(primary_key)]
//!     pub id: ObjectId,
//!     #[persisted]
//!     pub name: String,
//!     #[persisted]
//!     pub status: String,
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let actor = TodoActor::new(Configuration::in_memory("docs")).await?;
//! let todo = actor.create(ObjectId::generate(), "Write docs".into(), "open".into()).await?;
//! let todo = actor.update(&todo, None, None, Some("done".into())).await?;
//! assert_eq!(todo.status, "done");
//! assert_eq!(actor.list().await?.len(), 1);
//! # Ok::<(), gencrud_store::StoreError>(())
//! # }).unwrap();
//! ```

extern crate self as gencrud_store;

mod actor;
mod config;
mod error;
mod notification;
mod record;
mod results;
mod store;
mod table;
mod transaction;
mod value;

pub use actor::{ActorState, ModelActor};
pub use config::{Configuration, DEFAULT_IDENTIFIER};
pub use error::StoreError;
pub use notification::{CollectionChange, ExecutionContext, NotificationToken, Observation};
pub use record::{FieldSchema, Record, ThreadSafeReference};
pub use results::Results;
pub use store::Store;
pub use transaction::Transaction;
pub use value::{ObjectId, Values, field, to_value};

// Re-export the derive macro.
pub use gencrud_macros::GenCrud;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::{
        ActorState, CollectionChange, Configuration, ExecutionContext, GenCrud, ObjectId,
        Observation, Record, Results, StoreError,
    };
}
