pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pages;
pub mod routes;
pub mod session;
pub mod subscriptions;

pub use api::ApiClient;
pub use config::{app_config_dir, ApiConfig, AppConfig, ThemeConfig, UiConfig};
pub use error::{ApiError, ConfigError, ErrorKind, StoreError};
pub use models::{excerpt, Ack, Feed, LoginResponse, Post, User, UserFeedResponse};
pub use pages::{
    ActionState, FeedsPage, LoginPage, Pagination, Phase, PostsPage, RegisterPage, Status,
    UserFeedPage,
};
pub use routes::Route;
pub use session::{SessionData, SessionStore, SESSION_FILE_NAME};
pub use subscriptions::{SubscribeOutcome, SubscriptionSet, UnsubscribeOutcome};
