//! End-to-end API scenarios against a throwaway SQLite database.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use workly_api::{AppState, create_router};
use workly_db::Database;

const PASSWORD: &str = "correct-horse-battery";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

async fn test_app_with_secrets(user_secret: Option<&str>, company_secret: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("workly.db").display());
    let db = Database::new(&url).await.unwrap();
    let state = AppState::new(db, user_secret, company_secret, false);

    TestApp {
        router: create_router(state, None),
        _dir: dir,
    }
}

async fn test_app() -> TestApp {
    test_app_with_secrets(Some("user-secret"), Some("company-secret")).await
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply {
            status,
            set_cookie,
            body,
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Reply {
        self.send(Method::GET, uri, None, cookie).await
    }

    /// Register and sign in a user, returning (id, cookie header value)
    async fn user(&self, name: &str) -> (i64, String) {
        let email = format!("{name}@example.com");
        let reply = self
            .send(
                Method::POST,
                "/auth/signup",
                Some(json!({ "name": name, "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        let id = reply.body["data"]["id"].as_i64().unwrap();

        let reply = self
            .send(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        (id, cookie_pair(&reply))
    }

    /// Register and sign in a company, returning (id, cookie header value)
    async fn company(&self, name: &str) -> (i64, String) {
        let email = format!("hr@{name}.io");
        let reply = self
            .send(
                Method::POST,
                "/company/create",
                Some(json!({ "name": name, "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        let id = reply.body["data"]["id"].as_i64().unwrap();

        let reply = self
            .send(
                Method::POST,
                "/company/login",
                Some(json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        (id, cookie_pair(&reply))
    }
}

/// `name=value` part of the Set-Cookie header
fn cookie_pair(reply: &Reply) -> String {
    let header = reply.set_cookie.as_deref().expect("login sets a cookie");
    header.split(';').next().unwrap().trim().to_string()
}

#[tokio::test]
async fn health_and_unknown_route() {
    let app = test_app().await;

    let reply = app.get("/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "healthy");
    assert_eq!(reply.body["database"], true);

    let reply = app.get("/no/such/route", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert!(reply.body["error"].is_string());
}

#[tokio::test]
async fn login_sets_http_only_cookie_and_guard_reads_it() {
    let app = test_app().await;
    let (id, cookie) = app.user("alice").await;
    assert!(cookie.starts_with("Authorization="));

    let reply = app.get("/auth/get-user", None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(reply.body["error"].is_string());

    let reply = app.get("/auth/get-user", Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["id"], id);
    assert!(reply.body["data"].get("password_hash").is_none());

    let forged = "Authorization=eyJhbGciOiJIUzI1NiJ9.e30.c2lnbmF0dXJl";
    let reply = app.get("/auth/get-user", Some(forged)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_cookie_attributes() {
    let app = test_app().await;
    app.send(
        Method::POST,
        "/auth/signup",
        Some(json!({ "name": "alice", "email": "alice@example.com", "password": PASSWORD })),
        None,
    )
    .await;

    let reply = app
        .send(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "ALICE@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let header = reply.set_cookie.unwrap();
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));
    assert!(header.contains("Path=/"));

    let reply = app.get("/auth/logout", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.set_cookie.unwrap().starts_with("Authorization="));
}

#[tokio::test]
async fn wrong_password_and_duplicate_signup() {
    let app = test_app().await;
    app.user("alice").await;

    let reply = app
        .send(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(reply.set_cookie.is_none());

    let reply = app
        .send(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = app
        .send(
            Method::POST,
            "/auth/signup",
            Some(json!({ "name": "again", "email": "alice@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
    let app = test_app().await;

    let reply = app
        .send(
            Method::POST,
            "/auth/signup",
            Some(json!({ "name": "", "email": "a@b.c", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["error"].is_string());

    let reply = app
        .send(Method::POST, "/auth/signup", Some(json!({ "name": "x" })), None)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["error"].is_string());

    let reply = app.get("/user/get/not-a-number", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_secret_is_internal_error() {
    let app = test_app_with_secrets(None, Some("company-secret")).await;
    app.send(
        Method::POST,
        "/auth/signup",
        Some(json!({ "name": "alice", "email": "alice@example.com", "password": PASSWORD })),
        None,
    )
    .await;

    let reply = app
        .send(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "alice@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body["error"], "Internal server error");
}

#[tokio::test]
async fn cannot_edit_another_users_post() {
    let app = test_app().await;
    let (_a_id, a_cookie) = app.user("alice").await;
    let (_b_id, b_cookie) = app.user("bob").await;

    let reply = app
        .send(
            Method::POST,
            "/post/create",
            Some(json!({ "title": "Hello", "content": "First post", "user_id": 999 })),
            Some(&b_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let post_id = reply.body["data"]["id"].as_i64().unwrap();
    assert_ne!(reply.body["data"]["user_id"], 999);

    let uri = format!("/post/update/{post_id}");
    let reply = app
        .send(Method::PUT, &uri, Some(json!({ "title": "Hijacked" })), Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .send(Method::DELETE, &format!("/post/delete/{post_id}"), None, Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .send(Method::PUT, &uri, Some(json!({ "title": "Edited" })), Some(&b_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["title"], "Edited");
    assert_eq!(reply.body["data"]["content"], "First post");
}

#[tokio::test]
async fn profile_updates_are_owner_scoped() {
    let app = test_app().await;
    let (a_id, a_cookie) = app.user("alice").await;
    let (b_id, _) = app.user("bob").await;

    let reply = app
        .send(
            Method::PUT,
            &format!("/user/update/{b_id}"),
            Some(json!({ "name": "Mallory" })),
            Some(&a_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .send(
            Method::PUT,
            &format!("/user/update/{a_id}"),
            Some(json!({ "name": "Alice" })),
            Some(&a_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["name"], "Alice");
}

#[tokio::test]
async fn company_job_application_flow() {
    let app = test_app().await;
    let (company_id, company_cookie) = app.company("acme").await;
    let (_user_id, user_cookie) = app.user("alice").await;

    // User cookie does not open company routes
    let reply = app
        .send(Method::POST, "/job/create", Some(json!({})), Some(&user_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = app
        .send(
            Method::POST,
            "/job/create",
            Some(json!({
                "title": "DBA",
                "description": "Keep the data safe",
                "location": "Pune",
                "salary": "80k",
                "skills": ["sql"]
            })),
            Some(&company_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = app
        .send(
            Method::POST,
            "/job/create",
            Some(json!({
                "title": "Backend Engineer",
                "description": "Build services",
                "location": "Pune",
                "salary": "100k",
                "skills": ["go", "sql", "go"],
                "company_id": 999
            })),
            Some(&company_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let job_id = reply.body["data"]["id"].as_i64().unwrap();
    assert_eq!(reply.body["data"]["company_id"], company_id);

    let reply = app.get(&format!("/job/get/{job_id}"), None).await;
    assert_eq!(reply.body["data"]["skills"], json!(["go", "sql"]));

    let reply = app
        .send(
            Method::POST,
            "/application/apply",
            Some(json!({ "job_id": job_id })),
            Some(&user_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let application_id = reply.body["data"]["id"].as_i64().unwrap();

    let reply = app
        .send(
            Method::POST,
            "/application/apply",
            Some(json!({ "job_id": job_id })),
            Some(&user_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .send(
            Method::POST,
            "/application/apply",
            Some(json!({ "job_id": 4242 })),
            Some(&user_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .get(&format!("/application/company/{job_id}"), Some(&company_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let applications = reply.body["data"].as_array().unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0]["status"], "Pending");

    let reply = app
        .send(
            Method::PATCH,
            &format!("/application/company/{application_id}/status"),
            Some(json!({ "status": "Accepted" })),
            Some(&company_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app
        .get(&format!("/application/{application_id}"), Some(&user_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["status"], "Accepted");

    let reply = app
        .send(
            Method::PATCH,
            &format!("/application/company/{application_id}/status"),
            Some(json!({ "status": "Hired" })),
            Some(&company_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_company_cannot_touch_job_or_applications() {
    let app = test_app().await;
    let (_, acme) = app.company("acme").await;
    let (_, globex) = app.company("globex").await;

    let reply = app
        .send(
            Method::POST,
            "/job/create",
            Some(json!({
                "title": "Engineer",
                "description": "Build",
                "location": "Remote",
                "salary": "90k",
                "skills": ["rust"]
            })),
            Some(&acme),
        )
        .await;
    let job_id = reply.body["data"]["id"].as_i64().unwrap();

    let reply = app
        .send(
            Method::PUT,
            &format!("/job/update/{job_id}"),
            Some(json!({ "salary": "1" })),
            Some(&globex),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .send(Method::DELETE, &format!("/job/delete/{job_id}"), None, Some(&globex))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .get(&format!("/application/company/{job_id}"), Some(&globex))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_search_and_empty_result_asymmetry() {
    let app = test_app().await;
    let (_, company) = app.company("acme").await;

    for (title, location, skill) in [("Rust Dev", "Berlin", "rust"), ("Go Dev", "Pune", "go")] {
        let reply = app
            .send(
                Method::POST,
                "/job/create",
                Some(json!({
                    "title": title,
                    "description": "Write code",
                    "location": location,
                    "salary": "100k",
                    "skills": [skill]
                })),
                Some(&company),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    let reply = app.get("/job?location=Berlin&skill=rust", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["total"], 1);
    assert_eq!(reply.body["data"]["jobs"][0]["title"], "Rust Dev");

    let reply = app.get("/job?q=dev&page=1", None).await;
    assert_eq!(reply.body["data"]["total"], 2);
    assert_eq!(reply.body["data"]["page_size"], 10);

    // The general listing answers an empty page; the dedicated lookups answer 404
    let reply = app.get("/job?location=Mars", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["jobs"], json!([]));

    let reply = app.get("/job/location?location=Mars", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    let reply = app.get("/job/location?location=pune", None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app.get("/job/skill?skill=cobol", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    let reply = app.get("/job/skill?skill=go", None).await;
    assert_eq!(reply.body["data"].as_array().unwrap().len(), 1);

    let reply = app.get("/job/location", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_company_keeps_its_jobs() {
    let app = test_app().await;
    let (company_id, cookie) = app.company("acme").await;

    let reply = app
        .send(
            Method::POST,
            "/job/create",
            Some(json!({
                "title": "Engineer",
                "description": "Build",
                "location": "Remote",
                "salary": "90k",
                "skills": ["rust"]
            })),
            Some(&cookie),
        )
        .await;
    let job_id = reply.body["data"]["id"].as_i64().unwrap();

    let reply = app
        .send(Method::DELETE, &format!("/company/delete/{company_id}"), None, Some(&cookie))
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app.get(&format!("/job/get/{job_id}"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["data"]["company_id"].is_null());

    // The session now names a company that no longer exists
    let reply = app.get("/company", Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn follows_comments_and_likes() {
    let app = test_app().await;
    let (a_id, a_cookie) = app.user("alice").await;
    let (b_id, b_cookie) = app.user("bob").await;

    let reply = app
        .send(Method::POST, &format!("/user/follow/{a_id}"), None, Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .send(Method::POST, "/user/follow/9999", None, Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .send(Method::POST, &format!("/user/follow/{b_id}"), None, Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let reply = app
        .send(Method::POST, &format!("/user/follow/{b_id}"), None, Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app.get(&format!("/user/{b_id}/followers"), None).await;
    assert_eq!(reply.body["data"][0]["id"], a_id);

    let reply = app
        .send(
            Method::POST,
            "/post/create",
            Some(json!({ "title": "News", "content": "Hiring!" })),
            Some(&b_cookie),
        )
        .await;
    let post_id = reply.body["data"]["id"].as_i64().unwrap();

    let reply = app
        .send(
            Method::POST,
            "/comment",
            Some(json!({ "post_id": post_id, "content": "Congrats" })),
            Some(&a_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let comment_id = reply.body["data"]["id"].as_i64().unwrap();

    let reply = app
        .send(Method::DELETE, &format!("/comment/{comment_id}"), None, Some(&b_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .send(
            Method::POST,
            "/comment",
            Some(json!({ "post_id": 777, "content": "?" })),
            Some(&a_cookie),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let like = json!({ "post_id": post_id });
    let reply = app
        .send(Method::POST, "/like", Some(like.clone()), Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let reply = app
        .send(Method::POST, "/like", Some(like.clone()), Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app.get(&format!("/likes/{post_id}"), Some(&b_cookie)).await;
    assert_eq!(reply.body["data"].as_array().unwrap().len(), 1);

    let reply = app
        .send(Method::DELETE, "/like", Some(like.clone()), Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = app
        .send(Method::DELETE, "/like", Some(like), Some(&a_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    // Deleting the author removes the post along with its comments
    let reply = app
        .send(Method::DELETE, &format!("/user/delete/{b_id}"), None, Some(&b_cookie))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = app.get(&format!("/post/get/{post_id}"), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn huge_page_number_returns_empty_page() {
    let app = test_app().await;
    let (_, company) = app.company("acme").await;
    app.send(
        Method::POST,
        "/job/create",
        Some(json!({
            "title": "Engineer",
            "description": "Build",
            "location": "Remote",
            "salary": "90k",
            "skills": ["rust"]
        })),
        Some(&company),
    )
    .await;

    let reply = app.get("/job?page=9223372036854775807", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["jobs"], json!([]));
    assert_eq!(reply.body["data"]["total"], 1);
}

#[tokio::test]
async fn logout_always_clears_the_session_cookie() {
    let app = test_app().await;

    for (uri, name) in [
        ("/auth/logout", "Authorization="),
        ("/company/logout", "CompanyAuth="),
    ] {
        let reply = app.get(uri, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        let header = reply.set_cookie.expect("logout sets a clearing cookie");
        assert!(header.starts_with(name), "{header}");
        assert!(header.contains("Max-Age=0"), "{header}");
    }

    let (_, cookie) = app.company("acme").await;
    let reply = app.get("/company/logout", Some(&cookie)).await;
    assert!(reply.set_cookie.unwrap().contains("Max-Age=0"));
}
