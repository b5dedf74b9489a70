use tracing::debug;

use super::{ActionState, Phase, Status};
use crate::api::ApiClient;
use crate::models::Feed;
use crate::subscriptions::{self, SubscriptionSet};

/// Every feed known to the backend, with create/refresh/subscribe controls.
#[derive(Debug, Clone)]
pub struct FeedsPage {
    pub phase: Phase,
    pub feeds: Vec<Feed>,
    pub subscriptions: SubscriptionSet,
    pub new_title: String,
    pub new_url: String,
    pub action: ActionState,
    probe_limit: u32,
}

impl Default for FeedsPage {
    fn default() -> Self {
        Self::new(50)
    }
}

impl FeedsPage {
    pub fn new(probe_limit: u32) -> Self {
        Self {
            phase: Phase::Loading,
            feeds: Vec::new(),
            subscriptions: SubscriptionSet::default(),
            new_title: String::new(),
            new_url: String::new(),
            action: ActionState::default(),
            probe_limit,
        }
    }

    /// Mount: fetch the feed list, then infer subscriptions from the first
    /// page of the personal feed when someone is logged in.
    pub async fn load(&mut self, api: &ApiClient) {
        if !self.action.begin() {
            return;
        }
        self.phase = Phase::Loading;
        let status = self.reload_feeds(api).await.err().map(Status::error);
        self.load_subscriptions(api).await;
        self.phase = Phase::Ready;
        self.action.finish(status);
    }

    async fn reload_feeds(&mut self, api: &ApiClient) -> Result<(), String> {
        match api.list_feeds().await {
            Ok(feeds) => {
                self.feeds = feeds;
                Ok(())
            }
            Err(err) => Err(err.describe("Failed to load feeds")),
        }
    }

    pub async fn load_subscriptions(&mut self, api: &ApiClient) {
        let Some(user) = api.session().user().await else {
            return;
        };
        match api.user_feed(user.id, 1, self.probe_limit).await {
            Ok(page) => self.subscriptions.rebuild(&page.posts),
            Err(err) => debug!(error = %err, "could not infer subscriptions"),
        }
    }

    pub async fn create(&mut self, api: &ApiClient) {
        if !self.action.begin() {
            return;
        }
        let status = match api.create_feed(self.new_title.trim(), self.new_url.trim()).await {
            Ok(_) => {
                self.new_title.clear();
                self.new_url.clear();
                match self.reload_feeds(api).await {
                    Ok(()) => Status::info("Feed created"),
                    Err(msg) => Status::error(msg),
                }
            }
            Err(err) => Status::error(err.describe("Failed to create feed")),
        };
        self.action.finish(Some(status));
    }

    pub async fn refresh(&mut self, api: &ApiClient, feed_id: i64) {
        if !self.action.begin() {
            return;
        }
        let status = match api.refresh_feed(feed_id).await {
            Ok(_) => Status::info("Refresh requested"),
            Err(err) => Status::error(err.describe("Failed to refresh")),
        };
        self.action.finish(Some(status));
    }

    pub async fn subscribe(&mut self, api: &ApiClient, feed_id: i64) {
        if !self.action.begin() {
            return;
        }
        let outcome = subscriptions::subscribe(api, &mut self.subscriptions, feed_id).await;
        self.action.finish(Some(outcome.into()));
    }

    pub async fn unsubscribe(&mut self, api: &ApiClient, feed_id: i64) {
        if !self.action.begin() {
            return;
        }
        let outcome = subscriptions::unsubscribe(api, &mut self.subscriptions, feed_id).await;
        self.action.finish(Some(outcome.into()));
    }

    pub fn is_subscribed(&self, feed_id: i64) -> bool {
        self.subscriptions.contains(feed_id)
    }
}
