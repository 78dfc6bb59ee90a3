//! Error type for storage operations.

/// Errors returned by the store, its transactions, and model actors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A value could not be converted to or from its stored representation.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value map did not contain a persisted field the record requires.
    #[error("`{type_name}` is missing persisted field `{field}`")]
    MissingField {
        /// Model type being materialized.
        type_name: &'static str,
        /// The absent field.
        field: &'static str,
    },

    /// A record with the same primary key already exists.
    #[error("a `{type_name}` with primary key {key} already exists")]
    DuplicatePrimaryKey {
        /// Model type being written.
        type_name: &'static str,
        /// JSON rendering of the conflicting key.
        key: String,
    },

    /// A write tried to change the primary key of an existing record.
    #[error("primary key of `{type_name}` cannot change from {from} to {to}")]
    PrimaryKeyChanged {
        /// Model type being written.
        type_name: &'static str,
        /// The stored key.
        from: String,
        /// The key the write attempted to set.
        to: String,
    },

    /// A reference could not be resolved to a stored record.
    #[error("`{type_name}` object does not exist in the store")]
    ObjectNotFound {
        /// Model type being resolved.
        type_name: &'static str,
    },

    /// A write was attempted through a read-only configuration.
    #[error("store `{identifier}` is opened read-only")]
    ReadOnly {
        /// Identifier of the store.
        identifier: String,
    },

    /// The model actor was closed before the operation was issued.
    #[error("actor for `{type_name}` is closed")]
    Closed {
        /// Model type the actor serves.
        type_name: &'static str,
    },

    /// The subscription backing an observation was invalidated.
    #[error("notification token was invalidated")]
    Invalidated,
}

impl StoreError {
    /// Returns `true` if the error means the targeted record is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}
