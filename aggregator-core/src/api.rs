use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{Ack, Feed, LoginResponse, Post, User, UserFeedResponse};
use crate::session::SessionStore;

const USER_AGENT: &str = concat!("blog-aggregator-client/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct NewFeed<'a> {
    title: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct FeedRef {
    feed_id: i64,
}

#[derive(Serialize)]
struct SubscriptionRef {
    user_id: i64,
    feed_id: i64,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Typed wrapper over the aggregator REST API.
///
/// Every request carries `Authorization: Bearer <token>` while the injected
/// session holds a token. Errors are handed back untouched; callers decide
/// how to present them.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self, ApiError> {
        let http = ClientBuilder::new().user_agent(USER_AGENT).build()?;
        Self::with_client(http, &config.base_url, session)
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/'))?;
        Ok(Self {
            http,
            base,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", self.base.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&joined)?)
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%method, %url, "sending request");
        let builder = self.http.request(method, url);
        Ok(match self.session.token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let req = self
            .request(Method::POST, "/login")
            .await?
            .json(&Credentials { username, password });
        decode(send(req).await?).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let req = self
            .request(Method::POST, "/users/register")
            .await?
            .json(&Registration {
                username,
                email,
                password,
            });
        decode(send(req).await?).await
    }

    pub async fn list_feeds(&self) -> Result<Vec<Feed>, ApiError> {
        let req = self.request(Method::GET, "/feeds").await?;
        decode(send(req).await?).await
    }

    pub async fn create_feed(&self, title: &str, url: &str) -> Result<Feed, ApiError> {
        let req = self
            .request(Method::POST, "/feeds")
            .await?
            .json(&NewFeed { title, url });
        decode(send(req).await?).await
    }

    pub async fn refresh_feed(&self, feed_id: i64) -> Result<Ack, ApiError> {
        let req = self
            .request(Method::POST, "/feeds/refresh")
            .await?
            .json(&FeedRef { feed_id });
        ack(send(req).await?).await
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let req = self.request(Method::GET, "/posts").await?;
        decode(send(req).await?).await
    }

    pub async fn subscribe(&self, user_id: i64, feed_id: i64) -> Result<Ack, ApiError> {
        let req = self
            .request(Method::POST, "/subscriptions")
            .await?
            .json(&SubscriptionRef { user_id, feed_id });
        ack(send(req).await?).await
    }

    pub async fn unsubscribe(&self, user_id: i64, feed_id: i64) -> Result<Ack, ApiError> {
        let req = self
            .request(Method::DELETE, "/subscriptions")
            .await?
            .json(&SubscriptionRef { user_id, feed_id });
        ack(send(req).await?).await
    }

    pub async fn user_feed(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<UserFeedResponse, ApiError> {
        let req = self
            .request(Method::GET, &format!("/users/{user_id}/feed"))
            .await?
            .query(&[("page", page), ("limit", limit)]);
        decode(send(req).await?).await
    }
}

async fn send(req: RequestBuilder) -> Result<Response, ApiError> {
    let response = req.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let bytes = response.bytes().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
    let message = body.error.or(body.message).or_else(|| {
        let text = String::from_utf8_lossy(&bytes).trim().to_string();
        (!text.is_empty()).then_some(text)
    });
    warn!(%status, %url, message = message.as_deref().unwrap_or(""), "request failed");
    Err(ApiError::Status {
        status,
        message,
        code: body.code,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn ack(response: Response) -> Result<Ack, ApiError> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Ack::default());
    }
    Ok(serde_json::from_slice(&bytes)?)
}
