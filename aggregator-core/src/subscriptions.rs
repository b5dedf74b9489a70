use std::collections::HashSet;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Ack, Post};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
    NotLoggedIn,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Unsubscribed,
    NotLoggedIn,
    Failed(String),
}

impl SubscribeOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Subscribed => "Subscribed",
            Self::AlreadySubscribed => "Already subscribed",
            Self::NotLoggedIn => "You are not logged in",
            Self::Failed(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::NotLoggedIn | Self::Failed(_))
    }
}

impl UnsubscribeOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Unsubscribed => "Unsubscribed",
            Self::NotLoggedIn => "You are not logged in",
            Self::Failed(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Unsubscribed)
    }
}

/// Feeds the user follows, as far as the client can tell.
///
/// The backend has no endpoint listing subscriptions, so the base set is
/// projected from the `feed_id`s of the last personal-feed response. Local
/// subscribe/unsubscribe results sit in an overlay on top of it until the
/// next [`rebuild`](Self::rebuild) throws the overlay away.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    projected: HashSet<i64>,
    added: HashSet<i64>,
    removed: HashSet<i64>,
}

impl SubscriptionSet {
    pub fn from_posts(posts: &[Post]) -> Self {
        let mut set = Self::default();
        set.rebuild(posts);
        set
    }

    pub fn rebuild(&mut self, posts: &[Post]) {
        self.projected = posts.iter().map(|p| p.feed_id).collect();
        self.added.clear();
        self.removed.clear();
    }

    pub fn contains(&self, feed_id: i64) -> bool {
        !self.removed.contains(&feed_id)
            && (self.added.contains(&feed_id) || self.projected.contains(&feed_id))
    }

    pub fn len(&self) -> usize {
        self.projected
            .union(&self.added)
            .filter(|id| !self.removed.contains(id))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mark_subscribed(&mut self, feed_id: i64) {
        self.removed.remove(&feed_id);
        self.added.insert(feed_id);
    }

    fn mark_unsubscribed(&mut self, feed_id: i64) {
        self.added.remove(&feed_id);
        self.removed.insert(feed_id);
    }

    /// Folds the result of `POST /subscriptions` into the set. A duplicate
    /// rejection means the subscription already exists, so it counts as one.
    pub fn record_subscribe(
        &mut self,
        feed_id: i64,
        result: &Result<Ack, ApiError>,
    ) -> SubscribeOutcome {
        match result {
            Ok(_) => {
                self.mark_subscribed(feed_id);
                SubscribeOutcome::Subscribed
            }
            Err(err) if err.is_duplicate() => {
                self.mark_subscribed(feed_id);
                SubscribeOutcome::AlreadySubscribed
            }
            Err(err) if err.is_auth_rejection() => SubscribeOutcome::NotLoggedIn,
            Err(err) => SubscribeOutcome::Failed(err.describe("Failed to subscribe")),
        }
    }

    pub fn record_unsubscribe(
        &mut self,
        feed_id: i64,
        result: &Result<Ack, ApiError>,
    ) -> UnsubscribeOutcome {
        match result {
            Ok(_) => {
                self.mark_unsubscribed(feed_id);
                UnsubscribeOutcome::Unsubscribed
            }
            Err(err) => UnsubscribeOutcome::Failed(err.describe("Failed to unsubscribe")),
        }
    }
}

/// Subscribes the logged-in user and reconciles `set` with the answer.
/// Without a session nothing is sent.
pub async fn subscribe(
    api: &ApiClient,
    set: &mut SubscriptionSet,
    feed_id: i64,
) -> SubscribeOutcome {
    let Some(user) = api.session().user().await else {
        return SubscribeOutcome::NotLoggedIn;
    };
    let result = api.subscribe(user.id, feed_id).await;
    set.record_subscribe(feed_id, &result)
}

pub async fn unsubscribe(
    api: &ApiClient,
    set: &mut SubscriptionSet,
    feed_id: i64,
) -> UnsubscribeOutcome {
    let Some(user) = api.session().user().await else {
        return UnsubscribeOutcome::NotLoggedIn;
    };
    let result = api.unsubscribe(user.id, feed_id).await;
    set.record_unsubscribe(feed_id, &result)
}
