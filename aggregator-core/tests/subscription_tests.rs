use aggregator_core::{
    Ack, ApiClient, ApiError, ErrorKind, FeedsPage, Post, SessionStore, Status, SubscribeOutcome,
    SubscriptionSet, UnsubscribeOutcome, User,
};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post(id: i64, feed_id: i64) -> Post {
    Post {
        id,
        feed_id,
        title: format!("Post {id}"),
        link: format!("https://example.com/{id}"),
        published: None,
        content: String::new(),
    }
}

fn status_error(status: StatusCode, message: &str) -> Result<Ack, ApiError> {
    Err(ApiError::status(status, Some(message.to_string())))
}

async fn logged_in_client(server: &MockServer) -> ApiClient {
    let session = SessionStore::in_memory();
    session
        .login(
            "t1".into(),
            User {
                id: 1,
                username: "alice".into(),
                email: None,
            },
        )
        .await
        .unwrap();
    ApiClient::with_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        session,
    )
    .unwrap()
}

#[test]
fn set_is_projected_from_personal_feed() {
    let set = SubscriptionSet::from_posts(&[post(1, 5), post(2, 5), post(3, 8)]);
    assert!(set.contains(5));
    assert!(set.contains(8));
    assert!(!set.contains(9));
    assert_eq!(set.len(), 2);
}

#[test]
fn subscribe_success_and_conflict_both_mark_subscribed() {
    let mut set = SubscriptionSet::default();

    let outcome = set.record_subscribe(5, &Ok(Ack::default()));
    assert_eq!(outcome, SubscribeOutcome::Subscribed);
    assert!(set.contains(5));

    let outcome = set.record_subscribe(6, &status_error(StatusCode::CONFLICT, "exists"));
    assert_eq!(outcome, SubscribeOutcome::AlreadySubscribed);
    assert_eq!(outcome.message(), "Already subscribed");
    assert!(set.contains(6));

    // The reference backend reports duplicates as a 500 carrying the SQL error
    let outcome = set.record_subscribe(
        7,
        &status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "UNIQUE constraint failed: subscriptions.user_id",
        ),
    );
    assert_eq!(outcome, SubscribeOutcome::AlreadySubscribed);
    assert!(set.contains(7));
}

#[test]
fn other_subscribe_errors_leave_set_unchanged() {
    let mut set = SubscriptionSet::default();

    let outcome = set.record_subscribe(
        5,
        &status_error(StatusCode::INTERNAL_SERVER_ERROR, "database is locked"),
    );
    assert_eq!(outcome, SubscribeOutcome::Failed("database is locked".into()));
    assert!(!set.contains(5));

    let outcome = set.record_subscribe(5, &status_error(StatusCode::UNAUTHORIZED, "invalid token"));
    assert_eq!(outcome, SubscribeOutcome::NotLoggedIn);
    assert!(!set.contains(5));

    let outcome = set.record_subscribe(5, &Err(ApiError::status(StatusCode::BAD_GATEWAY, None::<String>)));
    assert_eq!(outcome, SubscribeOutcome::Failed("Failed to subscribe".into()));
    assert!(set.is_empty());
}

#[test]
fn unsubscribe_removes_only_on_success() {
    let mut set = SubscriptionSet::from_posts(&[post(1, 5), post(2, 8)]);

    let outcome = set.record_unsubscribe(
        5,
        &status_error(StatusCode::NOT_FOUND, "subscription not found"),
    );
    assert_eq!(outcome, UnsubscribeOutcome::Failed("subscription not found".into()));
    assert!(set.contains(5));

    let outcome = set.record_unsubscribe(5, &Ok(Ack::default()));
    assert_eq!(outcome, UnsubscribeOutcome::Unsubscribed);
    assert!(!set.contains(5));
    assert!(set.contains(8));
}

#[test]
fn rebuild_discards_optimistic_changes() {
    let mut set = SubscriptionSet::from_posts(&[post(1, 5)]);
    set.record_subscribe(9, &Ok(Ack::default()));
    set.record_unsubscribe(5, &Ok(Ack::default()));
    assert!(set.contains(9));
    assert!(!set.contains(5));
    assert_eq!(set.len(), 1);

    set.rebuild(&[post(1, 5), post(2, 8)]);
    assert!(set.contains(5));
    assert!(set.contains(8));
    assert!(!set.contains(9));
}

#[test]
fn structured_code_takes_precedence_over_message_matching() {
    let dup = ApiError::Status {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: Some("nope".into()),
        code: Some("already_subscribed".into()),
    };
    assert!(dup.is_duplicate());

    let not_dup = ApiError::Status {
        status: StatusCode::CONFLICT,
        message: Some("duplicate request id".into()),
        code: Some("rate_limited".into()),
    };
    assert!(!not_dup.is_duplicate());
    assert_eq!(not_dup.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn conflict_on_subscribe_shows_already_subscribed_without_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "title": "Rust Blog", "url": "https://blog.rust-lang.org/feed.xml" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/1/feed"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "posts": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/subscriptions"))
        .and(body_json(json!({ "user_id": 1, "feed_id": 5 })))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "error": "conflict" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = logged_in_client(&server).await;
    let mut page = FeedsPage::default();
    page.load(&api).await;
    assert!(!page.is_subscribed(5));

    page.subscribe(&api, 5).await;
    assert_eq!(page.action.status(), Some(&Status::info("Already subscribed")));
    assert!(page.is_subscribed(5));
}

#[tokio::test]
async fn unsubscribe_failure_keeps_feed_and_reports_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/subscriptions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "not subscribed" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "unsubscribed" })))
        .mount(&server)
        .await;

    let api = logged_in_client(&server).await;
    let mut page = FeedsPage::default();
    page.subscriptions.rebuild(&[post(1, 5)]);

    page.unsubscribe(&api, 5).await;
    assert_eq!(page.action.status(), Some(&Status::error("not subscribed")));
    assert!(page.is_subscribed(5));

    page.unsubscribe(&api, 5).await;
    assert_eq!(page.action.status(), Some(&Status::info("Unsubscribed")));
    assert!(!page.is_subscribed(5));
}

#[tokio::test]
async fn subscribe_without_session_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/subscriptions"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::with_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        SessionStore::in_memory(),
    )
    .unwrap();
    let mut page = FeedsPage::default();
    page.subscribe(&api, 5).await;

    assert_eq!(page.action.status(), Some(&Status::error("You are not logged in")));
    assert!(!page.is_subscribed(5));
}

#[tokio::test]
async fn create_and_refresh_report_their_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feeds"))
        .and(body_json(json!({ "title": "Rust Blog", "url": "https://blog.rust-lang.org/feed.xml" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5, "title": "Rust Blog", "url": "https://blog.rust-lang.org/feed.xml"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "title": "Rust Blog", "url": "https://blog.rust-lang.org/feed.xml" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/feeds/refresh"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "record not found" })))
        .mount(&server)
        .await;

    let api = logged_in_client(&server).await;
    let mut page = FeedsPage::default();
    page.new_title = "Rust Blog".into();
    page.new_url = " https://blog.rust-lang.org/feed.xml ".into();

    page.create(&api).await;
    assert_eq!(page.action.status(), Some(&Status::info("Feed created")));
    assert!(page.new_title.is_empty() && page.new_url.is_empty());
    assert_eq!(page.feeds.len(), 1);

    page.refresh(&api, 42).await;
    assert_eq!(page.action.status(), Some(&Status::error("record not found")));
    assert!(!page.action.is_pending());
}
