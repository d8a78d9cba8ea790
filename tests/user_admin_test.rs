mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{body_json, cookie_header, TestApp};
use uuid::Uuid;

fn request(method: Method, uri: &str, cookies: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookies);

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn sample_user(username: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "first_name": "Grace",
        "last_name": "Hopper",
        "username": username,
        "email": email,
        "password": "s3cretpw",
        "role": "user",
    })
}

async fn admin_id(app: &TestApp) -> Uuid {
    let login = app.login("admin", "admin").await;
    body_json(login).await["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn admin_can_manage_users() {
    let app = TestApp::spawn().await;
    let cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    // Create
    let created = app
        .request(request(
            Method::POST,
            "/users",
            &cookies,
            Some(sample_user("ghopper", "grace@example.com")),
        ))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created_body = body_json(created).await;
    assert_eq!(created_body["username"], "ghopper");
    assert_eq!(created_body["full_name"], "Hopper, Grace");
    assert!(created_body.get("password_hash").is_none());
    let user_id = created_body["id"].as_str().unwrap().to_string();

    // The new account can log in.
    assert_eq!(app.login("ghopper", "s3cretpw").await.status(), StatusCode::OK);

    // List
    let listed = app
        .request(request(Method::GET, "/users", &cookies, None))
        .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let listed_body = body_json(listed).await;
    assert_eq!(listed_body.as_array().unwrap().len(), 2);

    // Get
    let fetched = app
        .request(request(
            Method::GET,
            &format!("/users/{}", user_id),
            &cookies,
            None,
        ))
        .await;
    assert_eq!(fetched.status(), StatusCode::OK);

    // Edit
    let updated = app
        .request(request(
            Method::PATCH,
            &format!("/users/{}", user_id),
            &cookies,
            Some(serde_json::json!({
                "first_name": "Grace",
                "last_name": "Hopper-Murray",
                "username": "ghopper",
                "email": "grace@example.com",
                "role": "user",
            })),
        ))
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(body_json(updated).await["last_name"], "Hopper-Murray");

    // Delete
    let deleted = app
        .request(request(
            Method::DELETE,
            &format!("/users/{}", user_id),
            &cookies,
            None,
        ))
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = app
        .request(request(
            Method::GET,
            &format!("/users/{}", user_id),
            &cookies,
            None,
        ))
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_user_id_is_a_distinct_not_found() {
    let app = TestApp::spawn().await;
    let cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    let response = app
        .request(request(
            Method::GET,
            &format!("/users/{}", Uuid::new_v4()),
            &cookies,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_username_and_email_conflict() {
    let app = TestApp::spawn().await;
    let cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    let first = app
        .request(request(
            Method::POST,
            "/users",
            &cookies,
            Some(sample_user("ghopper", "grace@example.com")),
        ))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let same_username = app
        .request(request(
            Method::POST,
            "/users",
            &cookies,
            Some(sample_user("ghopper", "other@example.com")),
        ))
        .await;
    assert_eq!(same_username.status(), StatusCode::CONFLICT);

    // Case-insensitive: GRACE@ collides with grace@.
    let same_email = app
        .request(request(
            Method::POST,
            "/users",
            &cookies,
            Some(sample_user("ghopper2", "GRACE@example.com")),
        ))
        .await;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_role_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    let mut body = sample_user("ghopper", "grace@example.com");
    body["role"] = serde_json::json!("superuser");

    let response = app
        .request(request(Method::POST, "/users", &cookies, Some(body)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let app = TestApp::spawn().await;
    let cookies = cookie_header(&app.login_cookies("admin", "admin").await);
    let id = admin_id(&app).await;

    let response = app
        .request(request(
            Method::DELETE,
            &format!("/users/{}", id),
            &cookies,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Still there.
    let fetched = app
        .request(request(Method::GET, &format!("/users/{}", id), &cookies, None))
        .await;
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_admins_cannot_reach_user_management() {
    let app = TestApp::spawn().await;
    let admin_cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    app.request(request(
        Method::POST,
        "/users",
        &admin_cookies,
        Some(sample_user("ghopper", "grace@example.com")),
    ))
    .await;

    let user_cookies = cookie_header(&app.login_cookies("ghopper", "s3cretpw").await);
    let response = app
        .request(request(Method::GET, "/users", &user_cookies, None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_management_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Request::builder()
                .method(Method::GET)
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_cannot_touch_role() {
    let app = TestApp::spawn().await;
    let admin_cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    app.request(request(
        Method::POST,
        "/users",
        &admin_cookies,
        Some(sample_user("ghopper", "grace@example.com")),
    ))
    .await;

    let user_cookies = cookie_header(&app.login_cookies("ghopper", "s3cretpw").await);
    let response = app
        .request(request(
            Method::PATCH,
            "/users/profile",
            &user_cookies,
            Some(serde_json::json!({
                "first_name": "Grace",
                "last_name": "Hopper",
                "username": "ghopper",
                "email": "grace.hopper@example.com",
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], "grace.hopper@example.com");
    // Role untouched by the profile endpoint.
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn profile_update_conflicts_with_taken_email() {
    let app = TestApp::spawn().await;
    let admin_cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    app.request(request(
        Method::POST,
        "/users",
        &admin_cookies,
        Some(sample_user("ghopper", "grace@example.com")),
    ))
    .await;

    let user_cookies = cookie_header(&app.login_cookies("ghopper", "s3cretpw").await);
    let response = app
        .request(request(
            Method::PATCH,
            "/users/profile",
            &user_cookies,
            Some(serde_json::json!({
                "first_name": "Grace",
                "last_name": "Hopper",
                "username": "ghopper",
                "email": "admin@example.com",
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn validate_reports_session_state() {
    let app = TestApp::spawn().await;
    let cookies = cookie_header(&app.login_cookies("admin", "admin").await);

    let valid = app
        .request(request(Method::GET, "/auth/validate", &cookies, None))
        .await;
    assert_eq!(valid.status(), StatusCode::NO_CONTENT);

    let missing = app
        .request(
            Request::builder()
                .method(Method::GET)
                .uri("/auth/validate")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .request(request(
            Method::GET,
            "/auth/validate",
            "access_token=not-a-jwt",
            None,
        ))
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}
