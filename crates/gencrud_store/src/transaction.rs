//! Scoped write transactions.

use crate::error::StoreError;
use crate::record::{Record, ThreadSafeReference};
use crate::results::Results;
use crate::store::Tables;
use crate::table::{RowId, Table};
use crate::value::Values;
use hashbrown::HashMap;

/// A write transaction, handed to the closure passed to [`Store::write`].
///
/// Reads inside the transaction see its own uncommitted writes. Nothing is
/// visible to other readers until the closure returns `Ok`.
///
/// [`Store::write`]: crate::Store::write
pub struct Transaction<'s> {
    base: &'s Tables,
    staged: HashMap<&'static str, Table>,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(base: &'s Tables) -> Self {
        Self {
            base,
            staged: HashMap::new(),
        }
    }

    pub(crate) fn into_staged(self) -> HashMap<&'static str, Table> {
        self.staged
    }

    fn table(&self, type_name: &'static str) -> Option<&Table> {
        self.staged
            .get(type_name)
            .or_else(|| self.base.get(type_name).map(|table| table.as_ref()))
    }

    fn table_mut(&mut self, type_name: &'static str) -> &mut Table {
        let base = self.base;
        self.staged.entry(type_name).or_insert_with(|| {
            base.get(type_name)
                .map(|table| Table::clone(table))
                .unwrap_or_default()
        })
    }

    fn locate<T: Record>(&self, reference: &ThreadSafeReference<T>) -> Result<RowId, StoreError> {
        self.table(T::TYPE_NAME)
            .and_then(|table| table.locate(reference.identity()))
            .ok_or(StoreError::ObjectNotFound {
                type_name: T::TYPE_NAME,
            })
    }

    /// Creates a record of type `T` from a name→value map.
    ///
    /// Keys that are not persisted fields of `T` are ignored. Fails if a
    /// required field is missing or the primary key is already taken.
    pub fn create<T: Record>(&mut self, values: Values) -> Result<T, StoreError> {
        let record = T::from_values(&values)?;
        let normalized = record.to_values()?;
        self.table_mut(T::TYPE_NAME)
            .insert(T::TYPE_NAME, T::primary_key_field(), normalized)?;
        Ok(record)
    }

    /// Adds an already constructed record.
    pub fn add<T: Record>(&mut self, record: &T) -> Result<(), StoreError> {
        let values = record.to_values()?;
        self.table_mut(T::TYPE_NAME)
            .insert(T::TYPE_NAME, T::primary_key_field(), values)?;
        Ok(())
    }

    /// Resolves a reference to the record as currently stored.
    pub fn resolve<T: Record>(&self, reference: &ThreadSafeReference<T>) -> Result<T, StoreError> {
        let row = self.locate(reference)?;
        let values = self
            .table(T::TYPE_NAME)
            .and_then(|table| table.get(row))
            .ok_or(StoreError::ObjectNotFound {
                type_name: T::TYPE_NAME,
            })?;
        T::from_values(values)
    }

    /// Resolves a reference, applies `f` to the stored record and writes the
    /// result back. Returns the record as written.
    ///
    /// The primary key cannot be changed this way.
    pub fn modify<T, F>(&mut self, reference: &ThreadSafeReference<T>, f: F) -> Result<T, StoreError>
    where
        T: Record,
        F: FnOnce(&mut T),
    {
        let row = self.locate(reference)?;
        let mut record = self.resolve(reference)?;
        f(&mut record);
        let values = record.to_values()?;
        self.table_mut(T::TYPE_NAME)
            .replace(T::TYPE_NAME, T::primary_key_field(), row, values)?;
        Ok(record)
    }

    /// Removes the referenced record.
    pub fn delete<T: Record>(&mut self, reference: &ThreadSafeReference<T>) -> Result<(), StoreError> {
        let row = self.locate(reference)?;
        self.table_mut(T::TYPE_NAME).remove(T::primary_key_field(), row);
        Ok(())
    }

    /// Returns every record of type `T`, including uncommitted writes.
    pub fn objects<T: Record>(&self) -> Result<Results<T>, StoreError> {
        Results::from_table(self.table(T::TYPE_NAME))
    }
}
