//! Integration tests for observations and notification tokens.

use futures::StreamExt;
use gencrud_store::{
    CollectionChange, Configuration, ExecutionContext, GenCrud, ObjectId, Store, StoreError,
};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, GenCrud)]
pub struct Task {
    #[persisted(primary_key)]
    pub id: ObjectId,
    #[persisted]
    pub title: String,
    #[persisted]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, GenCrud)]
pub struct Tag {
    #[persisted]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, GenCrud)]
pub struct Reminder {
    #[persisted]
    pub text: String,
}

async fn actor(identifier: &str) -> TaskActor {
    TaskActor::new(Configuration::in_memory(identifier))
        .await
        .unwrap()
}

async fn subscriptions(identifier: &str) -> usize {
    Store::open(&Configuration::in_memory(identifier))
        .await
        .unwrap()
        .subscription_count()
}

async fn next<T>(observation: &mut gencrud_store::Observation<T>) -> CollectionChange<T> {
    tokio::time::timeout(Duration::from_secs(5), observation.recv())
        .await
        .expect("change within timeout")
        .expect("observation still open")
}

#[tokio::test]
async fn initial_snapshot_comes_first() {
    let actor = actor("observe-initial").await;
    let existing = actor
        .create(ObjectId::generate(), "existing".into(), false)
        .await
        .unwrap();

    let mut observation = actor.observe(ExecutionContext::Inline).await.unwrap();
    match next(&mut observation).await {
        CollectionChange::Initial(results) => assert_eq!(results.as_slice(), &[existing]),
        other => panic!("expected initial snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn updates_arrive_in_commit_order_with_indices() {
    let actor = actor("observe-order").await;
    let mut observation = actor.observe(ExecutionContext::Inline).await.unwrap();
    assert!(matches!(
        next(&mut observation).await,
        CollectionChange::Initial(results) if results.is_empty()
    ));

    let first = actor
        .create(ObjectId::generate(), "first".into(), false)
        .await
        .unwrap();
    let second = actor
        .create(ObjectId::generate(), "second".into(), false)
        .await
        .unwrap();
    actor.update(&first, None, None, Some(true)).await.unwrap();
    actor.delete(&second).await.unwrap();

    match next(&mut observation).await {
        CollectionChange::Update {
            results,
            insertions,
            ..
        } => {
            assert_eq!(results.len(), 1);
            assert_eq!(insertions, [0]);
        }
        other => panic!("unexpected {other:?}"),
    }
    match next(&mut observation).await {
        CollectionChange::Update { insertions, .. } => assert_eq!(insertions, [1]),
        other => panic!("unexpected {other:?}"),
    }
    match next(&mut observation).await {
        CollectionChange::Update {
            results,
            modifications,
            ..
        } => {
            assert_eq!(modifications, [0]);
            assert!(results.first().unwrap().done);
        }
        other => panic!("unexpected {other:?}"),
    }
    match next(&mut observation).await {
        CollectionChange::Update {
            results, deletions, ..
        } => {
            assert_eq!(deletions, [1]);
            assert_eq!(results.len(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn writes_to_other_types_are_not_delivered() {
    let identifier = "observe-other-types";
    let tags = TagActor::new(Configuration::in_memory(identifier))
        .await
        .unwrap();
    let reminders = ReminderActor::new(Configuration::in_memory(identifier))
        .await
        .unwrap();

    let mut observation = tags.observe(ExecutionContext::Inline).await.unwrap();
    next(&mut observation).await;

    reminders.create("call back".into()).await.unwrap();
    tags.create("urgent".into()).await.unwrap();

    match next(&mut observation).await {
        CollectionChange::Update { results, .. } => {
            assert_eq!(results.first().map(|tag| tag.label.as_str()), Some("urgent"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn dropping_the_observation_unsubscribes() {
    let identifier = "observe-drop";
    let actor = actor(identifier).await;

    let observation = actor.observe(ExecutionContext::Inline).await.unwrap();
    let token = observation.token().clone();
    assert_eq!(subscriptions(identifier).await, 1);

    drop(observation);
    assert!(token.is_invalidated());
    assert!(!token.invalidate(), "already invalidated by the drop");
    assert_eq!(subscriptions(identifier).await, 0);
}

#[tokio::test]
async fn token_invalidates_exactly_once() {
    let identifier = "observe-token";
    let actor = actor(identifier).await;
    let mut observation = actor.observe(ExecutionContext::Inline).await.unwrap();
    next(&mut observation).await;

    let token = observation.token().clone();
    assert!(token.invalidate());
    assert!(!token.invalidate());
    assert_eq!(subscriptions(identifier).await, 0);

    actor
        .create(ObjectId::generate(), "unseen".into(), false)
        .await
        .unwrap();
    // The subscription is gone, so the stream ends without new changes.
    assert!(observation.recv().await.is_none());
}

#[tokio::test]
async fn cancel_ends_the_stream() {
    let actor = actor("observe-cancel").await;
    let mut observation = actor.observe(ExecutionContext::Inline).await.unwrap();

    observation.cancel();
    assert!(observation.token().is_invalidated());
    assert!(observation.next().await.is_none());
}

#[tokio::test]
async fn closing_the_actor_ends_its_observations() {
    let identifier = "observe-close";
    let actor = actor(identifier).await;
    let mut observation = actor.observe(ExecutionContext::Inline).await.unwrap();
    next(&mut observation).await;

    actor.close();
    assert!(observation.token().is_invalidated());
    assert_eq!(subscriptions(identifier).await, 0);
    assert!(observation.recv().await.is_none());

    let err = actor.observe(ExecutionContext::Inline).await.unwrap_err();
    assert!(matches!(err, StoreError::Closed { .. }));
}

#[tokio::test]
async fn member_observation_outlives_its_actor() {
    let mut observation = Tag::observe(ExecutionContext::Inline).await.unwrap();
    assert!(matches!(
        next(&mut observation).await,
        CollectionChange::Initial(_)
    ));

    let tag = Tag::create("from member".into()).await.unwrap();
    match next(&mut observation).await {
        CollectionChange::Update { results, .. } => {
            assert!(results.iter().any(|stored| *stored == tag));
        }
        other => panic!("unexpected {other:?}"),
    }
    tag.delete().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runtime_context_relays_changes() {
    let actor = actor("observe-runtime").await;
    let mut observation = actor.observe(ExecutionContext::current()).await.unwrap();

    let writer = actor.clone();
    let created = tokio::spawn(async move {
        writer
            .create(ObjectId::generate(), "relayed".into(), false)
            .await
    })
    .await
    .unwrap()
    .unwrap();

    let changes: Vec<_> = observation.by_ref().take(2).collect().await;
    assert!(matches!(changes[0], CollectionChange::Initial(_)));
    assert_eq!(
        changes[1].results().and_then(|results| results.first()),
        Some(&created)
    );
}
