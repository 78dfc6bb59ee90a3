//! Row storage for a single model type.

use crate::error::StoreError;
use crate::record::Identity;
use crate::value::Values;
use hashbrown::HashMap;
use indexmap::IndexMap;

pub(crate) type RowId = u64;

/// Insertion-ordered rows of one model type plus its primary-key index.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    rows: IndexMap<RowId, Values>,
    primary_keys: HashMap<String, RowId>,
    next_row: RowId,
}

/// Index sets describing how a table changed between two versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ChangeIndices {
    pub deletions: Vec<usize>,
    pub insertions: Vec<usize>,
    pub modifications: Vec<usize>,
}

impl ChangeIndices {
    pub(crate) fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.insertions.is_empty() && self.modifications.is_empty()
    }
}

fn key_of(values: &Values, primary_key: &str) -> String {
    values
        .get(primary_key)
        .map_or_else(|| "null".to_owned(), ToString::to_string)
}

impl Table {
    pub(crate) fn rows(&self) -> impl Iterator<Item = &Values> {
        self.rows.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn get(&self, row: RowId) -> Option<&Values> {
        self.rows.get(&row)
    }

    pub(crate) fn locate(&self, identity: &Identity) -> Option<RowId> {
        match identity {
            Identity::PrimaryKey(key) => self.primary_keys.get(&key.to_string()).copied(),
            Identity::Snapshot(values) => self
                .rows
                .iter()
                .find(|(_, row)| *row == values)
                .map(|(id, _)| *id),
        }
    }

    pub(crate) fn insert(
        &mut self,
        type_name: &'static str,
        primary_key: Option<&str>,
        values: Values,
    ) -> Result<RowId, StoreError> {
        let row = self.next_row;
        if let Some(field) = primary_key {
            let key = key_of(&values, field);
            if self.primary_keys.contains_key(&key) {
                return Err(StoreError::DuplicatePrimaryKey { type_name, key });
            }
            self.primary_keys.insert(key, row);
        }
        self.next_row += 1;
        self.rows.insert(row, values);
        Ok(row)
    }

    pub(crate) fn replace(
        &mut self,
        type_name: &'static str,
        primary_key: Option<&str>,
        row: RowId,
        values: Values,
    ) -> Result<(), StoreError> {
        let Some(slot) = self.rows.get_mut(&row) else {
            return Err(StoreError::ObjectNotFound { type_name });
        };
        if let Some(field) = primary_key {
            let from = key_of(slot, field);
            let to = key_of(&values, field);
            if from != to {
                return Err(StoreError::PrimaryKeyChanged {
                    type_name,
                    from,
                    to,
                });
            }
        }
        *slot = values;
        Ok(())
    }

    pub(crate) fn remove(&mut self, primary_key: Option<&str>, row: RowId) -> Option<Values> {
        let values = self.rows.shift_remove(&row)?;
        if let Some(field) = primary_key {
            self.primary_keys.remove(&key_of(&values, field));
        }
        Some(values)
    }

    /// Diffs `self` (the new version) against `old`.
    ///
    /// Deletions index into `old`; insertions and modifications index into `self`.
    pub(crate) fn changes_since(&self, old: Option<&Self>) -> ChangeIndices {
        let Some(old) = old else {
            return ChangeIndices {
                insertions: (0..self.rows.len()).collect(),
                ..ChangeIndices::default()
            };
        };

        let deletions = old
            .rows
            .keys()
            .enumerate()
            .filter(|(_, row)| !self.rows.contains_key(*row))
            .map(|(index, _)| index)
            .collect();

        let mut insertions = Vec::new();
        let mut modifications = Vec::new();
        for (index, (row, values)) in self.rows.iter().enumerate() {
            match old.rows.get(row) {
                None => insertions.push(index),
                Some(previous) if previous != values => modifications.push(index),
                Some(_) => {}
            }
        }

        ChangeIndices {
            deletions,
            insertions,
            modifications,
        }
    }
}
