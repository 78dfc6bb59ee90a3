//! Point-in-time query results.

use crate::error::StoreError;
use crate::record::Record;
use crate::table::Table;

/// An ordered snapshot of every record of one model type.
///
/// Results are owned values: later writes never change a snapshot that was
/// already returned, and nothing in it borrows from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Results<T> {
    items: Vec<T>,
}

impl<T: Record> Results<T> {
    pub(crate) fn from_table(table: Option<&Table>) -> Result<Self, StoreError> {
        let items = table
            .into_iter()
            .flat_map(Table::rows)
            .map(T::from_values)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }
}

impl<T> Results<T> {
    /// Number of records in the snapshot.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the record at `index`, in insertion order.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the oldest record.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Returns the newest record.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Returns the records as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consumes the snapshot, returning its records.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> IntoIterator for Results<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Results<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> Default for Results<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> core::ops::Index<usize> for Results<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}
