//! Change notifications and observation streams.
//!
//! An observation starts with one [`CollectionChange::Initial`] snapshot and
//! then yields one [`CollectionChange::Update`] per committed write that
//! touched the observed type, in commit order. A
//! [`CollectionChange::Error`] ends the stream.
//!
//! Every observation owns a [`NotificationToken`]. Dropping the
//! observation, or invalidating the token, removes the subscription from
//! the store.

use crate::error::StoreError;
use crate::results::Results;
use crate::store::StoreInner;
use core::any::Any;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};
use futures::Stream;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// A change delivered to an observer.
#[derive(Debug)]
pub enum CollectionChange<T> {
    /// The collection as it was when the subscription started.
    Initial(Results<T>),
    /// The collection after a committed write.
    Update {
        /// The collection after the write.
        results: Results<T>,
        /// Positions removed, relative to the previous snapshot.
        deletions: Vec<usize>,
        /// Positions added, relative to `results`.
        insertions: Vec<usize>,
        /// Positions changed in place, relative to `results`.
        modifications: Vec<usize>,
    },
    /// Delivery failed; no further changes follow.
    Error(StoreError),
}

impl<T> CollectionChange<T> {
    /// Returns the snapshot carried by the change, if any.
    pub fn results(&self) -> Option<&Results<T>> {
        match self {
            Self::Initial(results) | Self::Update { results, .. } => Some(results),
            Self::Error(_) => None,
        }
    }

    /// Consumes the change, returning its snapshot, if any.
    pub fn into_results(self) -> Option<Results<T>> {
        match self {
            Self::Initial(results) | Self::Update { results, .. } => Some(results),
            Self::Error(_) => None,
        }
    }
}

/// Where change notifications are relayed before the observer sees them.
#[derive(Debug, Clone, Default)]
pub enum ExecutionContext {
    /// Changes are handed to the observer directly by the committing task.
    #[default]
    Inline,
    /// Changes are relayed by a task spawned on the given runtime.
    Runtime(Handle),
}

impl ExecutionContext {
    /// Relays through a task on the runtime of the calling task.
    ///
    /// Falls back to [`ExecutionContext::Inline`] outside a runtime.
    pub fn current() -> Self {
        Handle::try_current().map_or(Self::Inline, Self::Runtime)
    }
}

struct TokenInner {
    subscription: u64,
    invalidated: AtomicBool,
    store: Weak<StoreInner>,
}

/// Handle to a live subscription.
///
/// Clones share the same subscription; invalidating any of them ends it.
#[derive(Clone)]
pub struct NotificationToken {
    inner: Arc<TokenInner>,
}

impl NotificationToken {
    pub(crate) fn new(subscription: u64, store: Weak<StoreInner>) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                subscription,
                invalidated: AtomicBool::new(false),
                store,
            }),
        }
    }

    /// Ends the subscription.
    ///
    /// Returns `true` for the call that actually ended it; every later call
    /// is a no-op returning `false`.
    pub fn invalidate(&self) -> bool {
        if self.inner.invalidated.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(store) = self.inner.store.upgrade() {
            store.unsubscribe(self.inner.subscription);
        }
        tracing::debug!(subscription = self.inner.subscription, "notification token invalidated");
        true
    }

    /// Returns `true` once the subscription has ended.
    pub fn is_invalidated(&self) -> bool {
        self.inner.invalidated.load(Ordering::Acquire)
    }

    /// Identifier of the subscription within its store.
    pub fn subscription(&self) -> u64 {
        self.inner.subscription
    }
}

impl core::fmt::Debug for NotificationToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NotificationToken")
            .field("subscription", &self.inner.subscription)
            .field("invalidated", &self.is_invalidated())
            .finish()
    }
}

/// A cancellable stream of collection snapshots.
///
/// Implements [`Stream`]; [`Observation::recv`] is available without
/// importing stream extension traits. Dropping the observation cancels it.
pub struct Observation<T> {
    receiver: mpsc::UnboundedReceiver<CollectionChange<T>>,
    token: NotificationToken,
    finished: bool,
    keep_alive: Option<Box<dyn Any + Send + Sync>>,
}

impl<T: Send + 'static> Observation<T> {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<CollectionChange<T>>,
        token: NotificationToken,
        context: ExecutionContext,
    ) -> Self {
        let receiver = match context {
            ExecutionContext::Inline => receiver,
            ExecutionContext::Runtime(handle) => relay(receiver, &handle),
        };
        Self {
            receiver,
            token,
            finished: false,
            keep_alive: None,
        }
    }
}

fn relay<T: Send + 'static>(
    mut upstream: mpsc::UnboundedReceiver<CollectionChange<T>>,
    handle: &Handle,
) -> mpsc::UnboundedReceiver<CollectionChange<T>> {
    let (sender, receiver) = mpsc::unbounded_channel();
    handle.spawn(async move {
        while let Some(change) = upstream.recv().await {
            if sender.send(change).is_err() {
                break;
            }
        }
    });
    receiver
}

impl<T> Observation<T> {
    /// Keeps `owner` alive for as long as the observation exists.
    pub(crate) fn retain(mut self, owner: impl Any + Send + Sync) -> Self {
        self.keep_alive = Some(Box::new(owner));
        self
    }

    /// The token controlling this observation's subscription.
    pub fn token(&self) -> &NotificationToken {
        &self.token
    }

    /// Stops the observation. Changes already queued are discarded.
    pub fn cancel(&mut self) {
        self.finish();
        self.receiver.close();
    }

    /// Waits for the next change; `None` once the observation has ended.
    pub async fn recv(&mut self) -> Option<CollectionChange<T>> {
        if self.finished {
            return None;
        }
        let change = self.receiver.recv().await;
        self.after_receive(change)
    }

    fn after_receive(&mut self, change: Option<CollectionChange<T>>) -> Option<CollectionChange<T>> {
        match change {
            Some(CollectionChange::Error(err)) => {
                self.finish();
                Some(CollectionChange::Error(err))
            }
            Some(change) => Some(change),
            None => {
                self.finish();
                None
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.token.invalidate();
    }
}

impl<T> Unpin for Observation<T> {}

impl<T> Stream for Observation<T> {
    type Item = CollectionChange<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.receiver.poll_recv(cx) {
            Poll::Ready(change) => Poll::Ready(this.after_receive(change)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for Observation<T> {
    fn drop(&mut self) {
        self.token.invalidate();
    }
}

impl<T> core::fmt::Debug for Observation<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observation")
            .field("token", &self.token)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
