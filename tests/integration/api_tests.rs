//! API integration tests
//!
//! Each test drives the full router against an in-memory SQLite database and
//! a mock classification service.

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, query_param},
    Mock, MockServer, ResponseTemplate,
};

use bookshelf_server::{
    api,
    config::{AppConfig, DatabaseConfig},
    repository::{self, Backend, Repository},
    services::Services,
    AppState,
};

const WORK_42: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<classify xmlns="http://classify.oclc.org">
  <response code="0"/>
  <work author="Bar" format="Book" hyr="2001" owi="42" title="Foo">42</work>
  <recommendations><ddc><mostPopular holdings="10" nsfa="813" sfa="813"/></ddc></recommendations>
</classify>"#;

const WORK_7: &str = r#"<classify>
  <response code="0"/>
  <work author="Sagan, Carl" owi="7" title="Cosmos"/>
  <recommendations><ddc><mostPopular sfa="520"/></ddc></recommendations>
</classify>"#;

const SEARCH_FOO: &str = r#"<classify>
  <response code="4"/>
  <works>
    <work author="Bar" hyr="2001" owi="42" title="Foo"/>
    <work author="Baz" hyr="1999" owi="43" title="Foo Returns"/>
  </works>
</classify>"#;

struct TestApp {
    router: Router,
    repository: Repository,
    _classify: MockServer,
}

/// Cookie carried between requests, like a browser would
#[derive(Default)]
struct Browser {
    cookie: Option<String>,
}

impl TestApp {
    async fn new() -> Self {
        let classify = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("owi", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WORK_42))
            .mount(&classify)
            .await;
        Mock::given(method("GET"))
            .and(query_param("owi", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WORK_7))
            .mount(&classify)
            .await;
        Mock::given(method("GET"))
            .and(query_param("owi", "999"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&classify)
            .await;
        Mock::given(method("GET"))
            .and(query_param("title", "foo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_FOO))
            .mount(&classify)
            .await;

        let mut config = AppConfig::default();
        config.database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        };
        config.session.secret = Some("0123456789abcdef0123456789abcdef0123456789abcdef".to_string());
        config.classify.base_url = classify.uri();

        let pool = repository::connect(&config.database).await.expect("connect");
        repository::migrate(&pool, Backend::Sqlite).await.expect("migrate");
        let repository = Repository::new(pool);

        let services = Services::new(repository.clone(), &config.classify).expect("services");
        let state = AppState::new(config, services).expect("state");

        Self {
            router: api::create_router(state),
            repository,
            _classify: classify,
        }
    }

    async fn send(
        &self,
        browser: &mut Browser,
        method: Method,
        uri: &str,
        form: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &browser.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
            browser.cookie = if pair.ends_with('=') { None } else { Some(pair) };
        }

        response
    }

    async fn get(&self, browser: &mut Browser, uri: &str) -> Response<Body> {
        self.send(browser, Method::GET, uri, None).await
    }

    /// Register and log in a new user in a fresh browser
    async fn register(&self, username: &str, password: &str) -> Browser {
        let mut browser = Browser::default();
        let form = format!("username={}&password={}&register=Register", username, password);
        let response = self.send(&mut browser, Method::POST, "/login", Some(&form)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert!(browser.cookie.is_some());
        browser
    }
}

fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn titles(books: &Value) -> Vec<String> {
    books
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_anonymous_requests_redirect_to_login() {
    let app = TestApp::new().await;
    let mut browser = Browser::default();

    for uri in ["/", "/books", "/books?filter=fiction", "/logout"] {
        let response = app.get(&mut browser, uri).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{}", uri);
        assert_eq!(location(&response), "/login");
    }

    let response = app.send(&mut browser, Method::POST, "/search", Some("search=foo")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let response = app.get(&mut browser, "/login").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<form"));
}

#[tokio::test]
async fn test_register_add_and_filter() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    let response = app.get(&mut alice, "/books").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, Value::Array(vec![]));

    let response = app.send(&mut alice, Method::PUT, "/books?id=42", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let added = body_json(response).await;
    assert_eq!(added["title"], "Foo");
    assert_eq!(added["author"], "Bar");
    assert_eq!(added["classification"], "813");
    assert_eq!(added["id"], "42");
    assert_eq!(added["user"], "alice");
    assert!(added["pk"].is_i64());

    let response = app.get(&mut alice, "/books?filter=fiction").await;
    assert_eq!(response.status(), StatusCode::OK);
    let fiction = body_json(response).await;
    assert_eq!(fiction.as_array().unwrap().len(), 1);
    assert_eq!(fiction[0], added);
}

#[tokio::test]
async fn test_filter_and_sort_are_remembered() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    app.send(&mut alice, Method::PUT, "/books?id=42", None).await;
    app.send(&mut alice, Method::PUT, "/books?id=7", None).await;

    let response = app.get(&mut alice, "/books?filter=nonfiction").await;
    assert_eq!(titles(&body_json(response).await), vec!["Cosmos"]);

    // Without parameters the remembered filter still applies
    let response = app.get(&mut alice, "/books").await;
    assert_eq!(titles(&body_json(response).await), vec!["Cosmos"]);

    let response = app.get(&mut alice, "/books?filter=all&sortBy=title").await;
    assert_eq!(titles(&body_json(response).await), vec!["Cosmos", "Foo"]);

    // Sort order survives a filter change
    let response = app.get(&mut alice, "/books?filter=all").await;
    assert_eq!(titles(&body_json(response).await), vec!["Cosmos", "Foo"]);

    let response = app.get(&mut alice, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<option value=\"all\" selected>"));
    assert!(html.contains("Cosmos"));
    assert!(html.contains("alice"));
}

#[tokio::test]
async fn test_invalid_list_parameters_are_rejected() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    let response = app.get(&mut alice, "/books?filter=poetry").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get(&mut alice, "/books?sortBy=pk%3B%20DROP%20TABLE%20books").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(&mut alice, Method::DELETE, "/books/abc", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_scoped_to_current_user() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;
    let mut bob = app.register("bob", "hunter2").await;

    let response = app.send(&mut alice, Method::PUT, "/books?id=42", None).await;
    let pk = body_json(response).await["pk"].as_i64().unwrap();
    let uri = format!("/books/{}", pk);

    let response = app.send(&mut bob, Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get(&mut bob, "/books").await;
    assert_eq!(body_json(response).await, Value::Array(vec![]));

    let response = app.send(&mut alice, Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get(&mut alice, "/books").await;
    assert_eq!(body_json(response).await, Value::Array(vec![]));

    let response = app.send(&mut alice, Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_failures_render_form() {
    let app = TestApp::new().await;
    app.register("alice", "pw123").await;

    let mut browser = Browser::default();
    let response = app
        .send(&mut browser, Method::POST, "/login", Some("username=alice&password=wrong&login=Log+in"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let wrong_password = body_text(response).await;
    assert!(wrong_password.contains("Invalid username or password"));
    assert!(browser.cookie.is_none());

    let response = app
        .send(&mut browser, Method::POST, "/login", Some("username=mallory&password=pw123&login=Log+in"))
        .await;
    let unknown_user = body_text(response).await;
    assert!(unknown_user.contains("Invalid username or password"));
    assert!(browser.cookie.is_none());

    let response = app
        .send(&mut browser, Method::POST, "/login", Some("username=alice&password=x&register=Register"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("already taken"));

    let response = app
        .send(&mut browser, Method::POST, "/login", Some("username=&password=x&login=Log+in"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Invalid value for: username"));

    let response = app
        .send(&mut browser, Method::POST, "/login", Some("username=alice&password=pw123&login=Log+in"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(browser.cookie.is_some());

    let response = app.get(&mut browser, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    app.get(&mut alice, "/books?filter=fiction").await;

    let response = app.get(&mut alice, "/logout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(alice.cookie.is_none());

    let response = app.get(&mut alice, "/").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_session_must_name_existing_user() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind("alice")
        .execute(&app.repository.pool)
        .await
        .unwrap();

    let response = app.get(&mut alice, "/").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_tampered_cookie_is_ignored() {
    let app = TestApp::new().await;
    let alice = app.register("alice", "pw123").await;

    let cookie = alice.cookie.unwrap();
    let (name, value) = cookie.split_once('=').unwrap();
    // Flip the last character of the signed payload
    let mut tampered = value.to_string();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let mut mallory = Browser {
        cookie: Some(format!("{}={}", name, tampered)),
    };
    let response = app.get(&mut mallory, "/books").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_search() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    let response = app.send(&mut alice, Method::POST, "/search", Some("search=foo")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    assert_eq!(results.as_array().unwrap().len(), 2);
    assert_eq!(results[0]["title"], "Foo");
    assert_eq!(results[0]["year"], "2001");
    assert_eq!(results[0]["id"], "42");

    let response = app.send(&mut alice, Method::POST, "/search", Some("search=")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Whitespace only never reaches the classification service
    let response = app.send(&mut alice, Method::POST, "/search", Some("search=+++")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_classification_failure_is_server_error() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    let response = app.send(&mut alice, Method::PUT, "/books?id=999", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app.get(&mut alice, "/books").await;
    assert_eq!(body_json(response).await, Value::Array(vec![]));
}

#[tokio::test]
async fn test_openapi_document() {
    let app = TestApp::new().await;
    let mut alice = app.register("alice", "pw123").await;

    let response = app.get(&mut alice, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/books"].is_object());
}
