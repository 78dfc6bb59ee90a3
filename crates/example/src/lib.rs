//! Example models built with `#[derive(GenCrud)]`.
//!
//! [`Todo`] is a flat record keyed by a generated [`ObjectId`]. [`User`] and
//! [`Post`] model a small social feed where every user embeds the posts
//! they wrote.

use gencrud_store::{GenCrud, ObjectId, StoreError};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A todo item.
#[derive(Debug, Clone, PartialEq, GenCrud)]
pub struct Todo {
    /// Store-generated identifier.
    #[persisted(primary_key)]
    pub id: ObjectId,
    /// What needs doing.
    #[persisted]
    pub name: String,
    /// Who is doing it.
    #[persisted(indexed)]
    pub owner: String,
    /// Free-form status such as `open` or `done`.
    #[persisted]
    pub status: String,
    /// Not stored; always `None` when read back.
    pub ignored: Option<String>,
}

/// A post, stored on its own and embedded in its author's [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, GenCrud)]
pub struct Post {
    /// Post identifier.
    #[persisted(primary_key)]
    pub id: ObjectId,
    /// `user_id` of the author.
    #[persisted(indexed)]
    pub sender_id: String,
    /// Body text.
    #[persisted]
    pub content: String,
    /// Seconds since the Unix epoch.
    #[persisted]
    pub posted_at: u64,
}

/// A member of the feed.
#[derive(Debug, Clone, PartialEq, GenCrud)]
pub struct User {
    /// Record identifier.
    #[persisted(primary_key)]
    pub id: ObjectId,
    /// Public handle.
    #[persisted(indexed)]
    pub user_id: String,
    /// Display name.
    #[persisted]
    pub user_name: String,
    /// Seconds since the Unix epoch.
    #[persisted]
    pub signed_up_at: u64,
    /// Seconds since the Unix epoch.
    #[persisted]
    pub signed_in_at: u64,
    /// Posts written by this user, oldest first.
    #[persisted]
    pub posts: Vec<Post>,
}

/// Seconds since the Unix epoch.
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl User {
    /// Signs up a new user with no posts.
    pub async fn sign_up(user_id: &str, user_name: &str) -> Result<Self, StoreError> {
        let at = now();
        Self::create(
            ObjectId::generate(),
            user_id.to_owned(),
            user_name.to_owned(),
            at,
            at,
            Vec::new(),
        )
        .await
    }

    /// Publishes `content` as a new post and appends it to this user's posts.
    pub async fn publish(&mut self, content: &str) -> Result<Post, StoreError> {
        let post = Post::create(
            ObjectId::generate(),
            self.user_id.clone(),
            content.to_owned(),
            now(),
        )
        .await?;

        let mut posts = self.posts.clone();
        posts.push(post.clone());
        self.update(None, None, None, None, Some(now()), Some(posts))
            .await?;
        Ok(post)
    }
}
