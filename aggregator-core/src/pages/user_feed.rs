use tracing::debug;

use super::{ActionState, Phase, Status};
use crate::api::ApiClient;
use crate::models::{Feed, Post};
use crate::subscriptions::{self, SubscribeOutcome, SubscriptionSet};

/// 1-based page cursor. The backend never reports a total, so a short page
/// is taken as the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
    exhausted: bool,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            exhausted: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        !self.exhausted
    }

    /// Moves back one page, or returns `None` on the first page.
    pub fn prev(&mut self) -> Option<u32> {
        if !self.has_prev() {
            return None;
        }
        self.page -= 1;
        self.exhausted = false;
        Some(self.page)
    }

    pub fn next(&mut self) -> Option<u32> {
        if !self.has_next() {
            return None;
        }
        self.page += 1;
        Some(self.page)
    }

    pub fn record_page_len(&mut self, len: usize) {
        self.exhausted = len < self.limit as usize;
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Personal feed of the logged-in user, plus the catalogue of feeds to
/// subscribe to and an "add and subscribe" form.
#[derive(Debug, Clone, Default)]
pub struct UserFeedPage {
    pub phase: Phase,
    pub pagination: Pagination,
    pub posts: Vec<Post>,
    pub feeds: Vec<Feed>,
    pub subscriptions: SubscriptionSet,
    pub new_title: String,
    pub new_url: String,
    pub action: ActionState,
}

impl UserFeedPage {
    pub fn new(page_size: u32) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            ..Self::default()
        }
    }

    /// Mount: current page of posts, then the feed catalogue.
    pub async fn mount(&mut self, api: &ApiClient) {
        self.load(api).await;
        self.load_feeds(api).await;
    }

    /// Fetches the current page and rebuilds the inferred subscriptions from it.
    pub async fn load(&mut self, api: &ApiClient) {
        if !self.action.begin() {
            return;
        }
        let status = self.fetch_page(api).await.err().map(Status::error);
        self.action.finish(status);
    }

    async fn fetch_page(&mut self, api: &ApiClient) -> Result<(), String> {
        self.phase = Phase::Loading;
        let result = match api.session().user().await {
            None => Err("You are not logged in".to_string()),
            Some(user) => match api
                .user_feed(user.id, self.pagination.page(), self.pagination.limit())
                .await
            {
                Ok(response) => {
                    self.pagination.record_page_len(response.posts.len());
                    self.subscriptions.rebuild(&response.posts);
                    self.posts = response.posts;
                    Ok(())
                }
                Err(err) if err.is_auth_rejection() => Err("You are not logged in".to_string()),
                Err(err) => Err(err.describe("Failed to load your feed")),
            },
        };
        self.phase = Phase::Ready;
        result
    }

    pub async fn load_feeds(&mut self, api: &ApiClient) {
        match api.list_feeds().await {
            Ok(feeds) => self.feeds = feeds,
            Err(err) => debug!(error = %err, "could not load feed catalogue"),
        }
    }

    pub async fn next_page(&mut self, api: &ApiClient) {
        let previous = self.pagination;
        if self.pagination.next().is_some() {
            self.turn_page(api, previous).await;
        }
    }

    pub async fn prev_page(&mut self, api: &ApiClient) {
        let previous = self.pagination;
        if self.pagination.prev().is_some() {
            self.turn_page(api, previous).await;
        }
    }

    /// Loads the page the cursor just moved to. The cursor goes back to
    /// `previous` when the fetch is refused or fails, so it always matches
    /// the posts on screen.
    async fn turn_page(&mut self, api: &ApiClient, previous: Pagination) {
        if !self.action.begin() {
            self.pagination = previous;
            return;
        }
        let result = self.fetch_page(api).await;
        if result.is_err() {
            self.pagination = previous;
        }
        self.action.finish(result.err().map(Status::error));
    }

    pub async fn subscribe(&mut self, api: &ApiClient, feed_id: i64) {
        if !self.action.begin() {
            return;
        }
        let status = self.subscribe_and_reload(api, feed_id).await;
        self.action.finish(Some(status));
    }

    async fn subscribe_and_reload(&mut self, api: &ApiClient, feed_id: i64) -> Status {
        let outcome = subscriptions::subscribe(api, &mut self.subscriptions, feed_id).await;
        if outcome == SubscribeOutcome::Subscribed {
            if let Err(msg) = self.fetch_page(api).await {
                return Status::error(msg);
            }
        }
        outcome.into()
    }

    /// Creates a feed, refreshes the catalogue and subscribes to the new feed.
    pub async fn add_and_subscribe(&mut self, api: &ApiClient) {
        if !self.action.begin() {
            return;
        }
        let created = match api
            .create_feed(self.new_title.trim(), self.new_url.trim())
            .await
        {
            Ok(feed) => feed,
            Err(err) => {
                self.action
                    .finish(Some(Status::error(err.describe("Failed to add feed"))));
                return;
            }
        };
        self.new_title.clear();
        self.new_url.clear();
        self.load_feeds(api).await;
        let status = self.subscribe_and_reload(api, created.id).await;
        self.action.finish(Some(status));
    }

    pub fn is_subscribed(&self, feed_id: i64) -> bool {
        self.subscriptions.contains(feed_id)
    }
}
