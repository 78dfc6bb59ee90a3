//! The in-memory store.
//!
//! A [`Store`] handle gives access to a set of typed tables. Reads clone an
//! immutable version of a table and never wait for writers. Writes are
//! serialized by an async writer lock, run against a copy-on-write view and
//! are published atomically when the transaction closure succeeds.

use crate::config::Configuration;
use crate::error::StoreError;
use crate::notification::{CollectionChange, ExecutionContext, NotificationToken, Observation};
use crate::record::Record;
use crate::results::Results;
use crate::table::{ChangeIndices, Table};
use crate::transaction::Transaction;
use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, LazyLock, Weak};
use tokio::sync::mpsc;

pub(crate) type Tables = HashMap<&'static str, Arc<Table>>;

/// Stores currently open in this process, by identifier.
static OPEN_STORES: LazyLock<Mutex<HashMap<String, Weak<StoreInner>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Stores kept open for the life of the process.
static RETAINED_STORES: LazyLock<Mutex<HashMap<String, Arc<StoreInner>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Pushes a new table version to one observer. Returns `false` once the
/// observer is gone or delivery failed for good.
type Deliver = Box<dyn Fn(&Table, ChangeIndices) -> bool + Send + Sync>;

struct Subscription {
    id: u64,
    type_name: &'static str,
    deliver: Deliver,
}

pub(crate) struct StoreInner {
    identifier: String,
    tables: RwLock<Tables>,
    writer: tokio::sync::Mutex<()>,
    subscriptions: Mutex<Vec<Subscription>>,
    next_subscription: AtomicU64,
}

impl StoreInner {
    fn new(identifier: String) -> Self {
        Self {
            identifier,
            tables: RwLock::new(HashMap::new()),
            writer: tokio::sync::Mutex::new(()),
            subscriptions: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        self.subscriptions.lock().retain(|subscription| subscription.id != id);
    }

    fn notify(&self, before: &Tables, committed: &[(&'static str, Arc<Table>)]) {
        let mut subscriptions = self.subscriptions.lock();
        for (type_name, table) in committed {
            let changes = table.changes_since(before.get(type_name).map(Arc::as_ref));
            if changes.is_empty() {
                continue;
            }
            subscriptions.retain(|subscription| {
                if subscription.type_name != *type_name {
                    return true;
                }
                let delivered = (subscription.deliver)(table, changes.clone());
                if !delivered {
                    tracing::warn!(
                        subscription = subscription.id,
                        type_name,
                        "dropping subscription whose observer is gone"
                    );
                }
                delivered
            });
        }
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut open = OPEN_STORES.lock();
        if open
            .get(&self.identifier)
            .is_some_and(|weak| weak.strong_count() == 0)
        {
            open.remove(&self.identifier);
        }
    }
}

/// Handle to an open store.
///
/// Cheap to clone; clones share the same data and configuration.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
    configuration: Configuration,
}

impl Store {
    /// Opens the store selected by `configuration`, joining it if another
    /// handle already has it open.
    ///
    /// Unless the configuration is [in-memory], the store stays open after
    /// the last handle is dropped.
    ///
    /// [in-memory]: Configuration::in_memory
    pub async fn open(configuration: &Configuration) -> Result<Self, StoreError> {
        let identifier = configuration.identifier();
        let inner = {
            let mut open = OPEN_STORES.lock();
            match open.get(identifier).and_then(Weak::upgrade) {
                Some(inner) => inner,
                None => {
                    let inner = Arc::new(StoreInner::new(identifier.to_owned()));
                    open.insert(identifier.to_owned(), Arc::downgrade(&inner));
                    tracing::debug!(
                        identifier,
                        in_memory = configuration.is_in_memory(),
                        "opened store"
                    );
                    inner
                }
            }
        };
        if !configuration.is_in_memory() {
            RETAINED_STORES
                .lock()
                .entry(identifier.to_owned())
                .or_insert_with(|| Arc::clone(&inner));
        }
        Ok(Self {
            inner,
            configuration: configuration.clone(),
        })
    }

    /// The configuration this handle was opened with.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Runs `f` inside a write transaction.
    ///
    /// Waits for any write in progress on the same store. If `f` returns
    /// `Ok` every change it made becomes visible at once; if it returns
    /// `Err` none of them do.
    pub async fn write<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<R, StoreError>,
    {
        if self.configuration.read_only() {
            return Err(StoreError::ReadOnly {
                identifier: self.inner.identifier.clone(),
            });
        }

        let _writer = self.inner.writer.lock().await;
        let before = self.inner.tables.read().clone();

        let mut transaction = Transaction::new(&before);
        let output = f(&mut transaction)?;
        let committed: Vec<_> = transaction
            .into_staged()
            .into_iter()
            .map(|(type_name, table)| (type_name, Arc::new(table)))
            .collect();

        if committed.is_empty() {
            return Ok(output);
        }

        {
            let mut tables = self.inner.tables.write();
            for (type_name, table) in &committed {
                tables.insert(*type_name, Arc::clone(table));
            }
        }
        tracing::debug!(
            identifier = %self.inner.identifier,
            tables = committed.len(),
            "committed write transaction"
        );

        // Still under the writer lock, so observers see commits in order.
        self.inner.notify(&before, &committed);
        Ok(output)
    }

    /// Returns a snapshot of every record of type `T`.
    pub fn objects<T: Record>(&self) -> Result<Results<T>, StoreError> {
        let table = self.inner.tables.read().get(T::TYPE_NAME).cloned();
        Results::from_table(table.as_deref())
    }

    /// Subscribes to changes of every record of type `T`.
    ///
    /// The returned observation yields the current snapshot first. Changes
    /// committed after this call returns are delivered in commit order.
    pub async fn observe<T: Record>(
        &self,
        context: ExecutionContext,
    ) -> Result<Observation<T>, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();

        // Holding the writer lock keeps commits from slipping in between
        // the initial snapshot and the registration.
        let _writer = self.inner.writer.lock().await;
        let table = self.inner.tables.read().get(T::TYPE_NAME).cloned();
        let initial = Results::<T>::from_table(table.as_deref())?;
        // The receiver is alive until this function returns.
        let _ = sender.send(CollectionChange::Initial(initial));

        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        let deliver: Deliver = Box::new(move |table, changes| {
            let change = match Results::<T>::from_table(Some(table)) {
                Ok(results) => CollectionChange::Update {
                    results,
                    deletions: changes.deletions,
                    insertions: changes.insertions,
                    modifications: changes.modifications,
                },
                Err(err) => {
                    let _ = sender.send(CollectionChange::Error(err));
                    return false;
                }
            };
            tracing::trace!(subscription = id, type_name = T::TYPE_NAME, "delivering change");
            sender.send(change).is_ok()
        });
        self.inner.subscriptions.lock().push(Subscription {
            id,
            type_name: T::TYPE_NAME,
            deliver,
        });
        tracing::debug!(subscription = id, type_name = T::TYPE_NAME, "subscribed to changes");

        let token = NotificationToken::new(id, Arc::downgrade(&self.inner));
        Ok(Observation::new(receiver, token, context))
    }

    /// Number of live subscriptions on this store.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.lock().len()
    }
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store")
            .field("identifier", &self.inner.identifier)
            .field("read_only", &self.configuration.read_only())
            .finish_non_exhaustive()
    }
}
