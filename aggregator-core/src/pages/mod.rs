//! State and actions behind each view. Rendering lives in the GUI crate;
//! everything here only talks to [`ApiClient`](crate::ApiClient).

pub mod feeds;
pub mod login;
pub mod posts;
pub mod register;
pub mod user_feed;

pub use feeds::FeedsPage;
pub use login::LoginPage;
pub use posts::PostsPage;
pub use register::RegisterPage;
pub use user_feed::{Pagination, UserFeedPage};

use crate::subscriptions::{SubscribeOutcome, UnsubscribeOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<SubscribeOutcome> for Status {
    fn from(outcome: SubscribeOutcome) -> Self {
        if outcome.is_error() {
            Self::error(outcome.message())
        } else {
            Self::info(outcome.message())
        }
    }
}

impl From<UnsubscribeOutcome> for Status {
    fn from(outcome: UnsubscribeOutcome) -> Self {
        if outcome.is_error() {
            Self::error(outcome.message())
        } else {
            Self::info(outcome.message())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Ready,
}

/// Status line plus an in-flight flag shared by every action of a view.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    status: Option<Status>,
    pending: bool,
}

impl ActionState {
    /// Starts an action: clears the previous status. Returns `false` when
    /// another action of the same view is still running.
    pub fn begin(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        self.status = None;
        true
    }

    pub fn finish(&mut self, status: Option<Status>) {
        self.pending = false;
        self.status = status;
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
