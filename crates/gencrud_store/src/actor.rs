//! The serialization boundary behind every generated `<Model>Actor`.
//!
//! A [`ModelActor`] owns a store handle and runs every operation issued
//! through it one at a time. Two actors on the same store are not
//! serialized against each other; the store's writer lock keeps their
//! transactions apart.

use crate::config::Configuration;
use crate::error::StoreError;
use crate::notification::{ExecutionContext, NotificationToken, Observation};
use crate::record::Record;
use crate::results::Results;
use crate::store::Store;
use crate::transaction::Transaction;
use core::marker::PhantomData;
use parking_lot::Mutex;
use std::sync::Arc;

/// Lifecycle of a model actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// The store handle is still being acquired.
    Uninitialized,
    /// Operations are accepted.
    Ready,
    /// The actor was closed; every subscription it started is invalidated.
    Closed,
}

struct ActorCore<T> {
    store: Store,
    serial: tokio::sync::Mutex<()>,
    state: Mutex<ActorState>,
    tokens: Mutex<Vec<NotificationToken>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> ActorCore<T> {
    fn ensure_ready(&self) -> Result<(), StoreError> {
        match *self.state.lock() {
            ActorState::Ready => Ok(()),
            ActorState::Uninitialized | ActorState::Closed => Err(StoreError::Closed {
                type_name: T::TYPE_NAME,
            }),
        }
    }

    fn invalidate_tokens(&self) {
        let tokens = core::mem::take(&mut *self.tokens.lock());
        for token in tokens {
            token.invalidate();
        }
    }
}

impl<T> Drop for ActorCore<T> {
    fn drop(&mut self) {
        for token in self.tokens.get_mut().drain(..) {
            token.invalidate();
        }
    }
}

/// Generic model actor; generated `<Model>Actor` types wrap one.
///
/// Clones share the same serialization boundary. Observations started by
/// an actor keep it alive until they end.
pub struct ModelActor<T> {
    core: Arc<ActorCore<T>>,
}

impl<T> Clone for ModelActor<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Record> ModelActor<T> {
    /// Opens the store selected by `configuration` and returns a ready actor.
    pub async fn open(configuration: Configuration) -> Result<Self, StoreError> {
        let store = Store::open(&configuration).await?;
        let core = ActorCore {
            store,
            serial: tokio::sync::Mutex::new(()),
            state: Mutex::new(ActorState::Uninitialized),
            tokens: Mutex::new(Vec::new()),
            _marker: PhantomData,
        };
        *core.state.lock() = ActorState::Ready;
        tracing::debug!(
            type_name = T::TYPE_NAME,
            identifier = configuration.identifier(),
            "model actor ready"
        );
        Ok(Self {
            core: Arc::new(core),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ActorState {
        *self.core.state.lock()
    }

    /// Configuration of the underlying store handle.
    pub fn configuration(&self) -> &Configuration {
        self.core.store.configuration()
    }

    /// Closes the actor and invalidates every subscription it started.
    ///
    /// Later operations fail with [`StoreError::Closed`]. Closing twice is a
    /// no-op.
    pub fn close(&self) {
        {
            let mut state = self.core.state.lock();
            if *state == ActorState::Closed {
                return;
            }
            *state = ActorState::Closed;
        }
        self.core.invalidate_tokens();
        tracing::debug!(type_name = T::TYPE_NAME, "model actor closed");
    }

    /// Runs a write transaction through this actor.
    pub async fn write<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<R, StoreError>,
    {
        let _serial = self.core.serial.lock().await;
        self.core.ensure_ready()?;
        self.core.store.write(f).await
    }

    /// Returns a snapshot of every record of type `T`.
    pub async fn objects(&self) -> Result<Results<T>, StoreError> {
        let _serial = self.core.serial.lock().await;
        self.core.ensure_ready()?;
        self.core.store.objects::<T>()
    }

    /// Starts observing every record of type `T`.
    pub async fn observe(&self, context: ExecutionContext) -> Result<Observation<T>, StoreError> {
        let _serial = self.core.serial.lock().await;
        self.core.ensure_ready()?;
        let observation = self.core.store.observe::<T>(context).await?;

        let mut tokens = self.core.tokens.lock();
        tokens.retain(|token| !token.is_invalidated());
        tokens.push(observation.token().clone());
        drop(tokens);

        Ok(observation.retain(self.clone()))
    }
}

impl<T> core::fmt::Debug for ModelActor<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelActor")
            .field("store", &self.core.store)
            .field("state", &*self.core.state.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenCrud;

    #[derive(Debug, GenCrud)]
    struct Widget {
        #[persisted]
        label: String,
    }

    #[tokio::test]
    async fn open_close_lifecycle() {
        let actor = ModelActor::<Widget>::open(Configuration::in_memory("unit-actor-lifecycle"))
            .await
            .unwrap();
        assert_eq!(actor.state(), ActorState::Ready);

        let clone = actor.clone();
        clone.close();
        assert_eq!(actor.state(), ActorState::Closed);
        assert!(matches!(
            actor.objects().await,
            Err(StoreError::Closed { type_name: "Widget" })
        ));
    }

    #[tokio::test]
    async fn dropping_the_last_handle_invalidates_tokens() {
        let actor = ModelActor::<Widget>::open(Configuration::in_memory("unit-actor-drop"))
            .await
            .unwrap();
        let observation = actor.observe(ExecutionContext::Inline).await.unwrap();
        let token = observation.token().clone();

        drop(actor);
        assert!(!token.is_invalidated(), "the observation keeps the actor alive");
        drop(observation);
        assert!(token.is_invalidated());
    }

    #[tokio::test]
    async fn operations_through_one_actor_run_one_at_a_time() {
        let actor = ModelActor::<Widget>::open(Configuration::in_memory("unit-actor-serial"))
            .await
            .unwrap();
        let serial = actor.core.serial.lock().await;

        let pending = tokio::spawn({
            let actor = actor.clone();
            async move { actor.objects().await.map(|results| results.len()) }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        drop(serial);
        assert_eq!(pending.await.unwrap().unwrap(), 0);
    }
}
