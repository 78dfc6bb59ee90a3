//! The model contract implemented by `#[derive(GenCrud)]`.

use crate::error::StoreError;
use crate::value::Values;
use core::marker::PhantomData;
use serde_json::Value;

/// Schema entry of one persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    /// Field name as stored (raw identifier prefixes removed).
    pub name: &'static str,
    /// Rendered type signature, e.g. `Vec<Post>`.
    pub type_signature: &'static str,
    /// Whether the field is the record's primary key.
    pub primary_key: bool,
    /// Whether the field was marked `indexed`.
    pub indexed: bool,
}

impl FieldSchema {
    /// Creates a schema entry.
    pub const fn new(
        name: &'static str,
        type_signature: &'static str,
        primary_key: bool,
        indexed: bool,
    ) -> Self {
        Self {
            name,
            type_signature,
            primary_key,
            indexed,
        }
    }
}

/// A model type the store can persist.
///
/// Usually derived:
///
/// ```
/// use gencrud_store::{GenCrud, ObjectId, Record};
///
/// #[derive(Debug, GenCrud)]
/// struct Todo {
///     #[persisted(primary_key)]
///     id: ObjectId,
///     #[persisted]
///     name: String,
///     draft: bool,
/// }
///
/// assert_eq!(Todo::TYPE_NAME, "Todo");
/// assert_eq!(Todo::primary_key_field(), Some("id"));
/// ```
pub trait Record: Sized + Send + 'static {
    /// Name of the model type; one table per name.
    const TYPE_NAME: &'static str;

    /// Persisted fields in declaration order.
    const SCHEMA: &'static [FieldSchema];

    /// Collects the persisted fields into a value map.
    ///
    /// Each field goes through [`to_value`](crate::to_value), so non-finite
    /// floats are stored as `null`.
    fn to_values(&self) -> Result<Values, StoreError>;

    /// Builds a record from a value map. Fields that are not persisted are
    /// filled with their `Default`.
    fn from_values(values: &Values) -> Result<Self, StoreError>;

    /// Name of the primary-key field, if the model declares one.
    fn primary_key_field() -> Option<&'static str> {
        Self::SCHEMA
            .iter()
            .find(|field| field.primary_key)
            .map(|field| field.name)
    }
}

/// How a [`ThreadSafeReference`] finds its record again.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Identity {
    /// The stored value of the primary-key field.
    PrimaryKey(Value),
    /// All persisted values, for models without a primary key.
    Snapshot(Values),
}

/// A handoff token for a record, valid across actors and tasks.
///
/// Records are plain values owned by whoever fetched them. Before an actor
/// writes to a record that came from elsewhere it captures a reference and
/// resolves it inside its own transaction, so it always acts on the stored
/// state rather than on the caller's copy.
pub struct ThreadSafeReference<T> {
    identity: Identity,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> ThreadSafeReference<T> {
    /// Captures a reference to `record`.
    pub fn new(record: &T) -> Result<Self, StoreError> {
        let values = record.to_values()?;
        let identity = match T::primary_key_field() {
            Some(field) => Identity::PrimaryKey(values.get(field).cloned().unwrap_or(Value::Null)),
            None => Identity::Snapshot(values),
        };
        Ok(Self {
            identity,
            _marker: PhantomData,
        })
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl<T> Clone for ThreadSafeReference<T> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> core::fmt::Debug for ThreadSafeReference<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadSafeReference")
            .field("identity", &self.identity)
            .finish()
    }
}
