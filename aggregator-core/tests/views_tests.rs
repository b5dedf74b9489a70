use aggregator_core::pages::register::REGISTERED_MESSAGE;
use aggregator_core::{
    ApiClient, LoginPage, Phase, PostsPage, RegisterPage, Route, SessionStore, Status,
    SESSION_FILE_NAME,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::with_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        SessionStore::in_memory(),
    )
    .unwrap()
}

#[tokio::test]
async fn register_success_points_to_login_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3, "username": "carol", "email": "carol@example.com"
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let mut page = RegisterPage {
        username: "carol".into(),
        email: "carol@example.com".into(),
        password: "secret".into(),
        ..RegisterPage::default()
    };

    assert_eq!(page.submit(&api).await, Some(Route::Login));
    assert_eq!(page.action.status(), Some(&Status::info(REGISTERED_MESSAGE)));
    assert!(page.password.is_empty());
    assert!(!api.session().is_authenticated().await);
}

#[tokio::test]
async fn register_failure_keeps_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = client(&server);
    let mut page = RegisterPage {
        username: "carol".into(),
        password: "secret".into(),
        ..RegisterPage::default()
    };

    assert_eq!(page.submit(&api).await, None);
    assert_eq!(page.action.status(), Some(&Status::error("Registration failed")));
    assert_eq!(page.password, "secret");
}

#[tokio::test]
async fn posts_view_lists_everything_without_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "feed_id": 5, "title": "Hello", "link": "https://example.com/1",
              "published": "2024-03-01T12:00:00Z", "content": "<p>hi</p>" },
            { "id": 2, "feed_id": 8, "title": "Undated", "link": "https://example.com/2" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let mut page = PostsPage::default();
    assert_eq!(page.phase, Phase::Loading);
    page.load(&api).await;

    assert_eq!(page.phase, Phase::Ready);
    assert_eq!(page.posts.len(), 2);
    assert!(page.posts[1].published.is_none());
    assert!(page.action.status().is_none());
}

#[tokio::test]
async fn posts_view_reports_load_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = client(&server);
    let mut page = PostsPage::default();
    page.load(&api).await;

    assert_eq!(page.phase, Phase::Ready);
    assert_eq!(page.action.status(), Some(&Status::error("Failed to load posts")));
}

#[tokio::test]
async fn login_with_unsavable_session_stays_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "user": { "id": 1, "username": "alice" }
        })))
        .mount(&server)
        .await;

    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "aggregator_views_unsavable_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let session_path = dir.join(SESSION_FILE_NAME);
    tokio::fs::create_dir_all(&session_path).await.unwrap();

    let session = SessionStore::load_from(&session_path).await;
    let api = ApiClient::with_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        session,
    )
    .unwrap();
    let mut page = LoginPage {
        username: "alice".into(),
        password: "pw".into(),
        ..LoginPage::default()
    };

    assert_eq!(page.submit(&api).await, None);
    assert!(page.action.status().unwrap().is_error());
    assert!(!api.session().is_authenticated().await);
    assert_eq!(Route::MyFeed.resolve(api.session().is_authenticated().await), Route::Login);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
