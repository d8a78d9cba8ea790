mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{body_json, cookie_header, TestApp};
use uuid::Uuid;

fn post(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn logout_revokes_the_session_and_clears_cookies() {
    let app = TestApp::spawn().await;
    let cookies = app.login_cookies("admin", "admin").await;

    let response = app.request(post("/auth/logout", &cookie_header(&cookies))).await;
    assert_eq!(response.status(), StatusCode::OK);

    // All three cookies are expired on the client.
    let cleared: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cleared.len(), 3);
    for cookie in &cleared {
        assert!(cookie.contains("Max-Age=0"), "not expired: {}", cookie);
    }

    // The refresh token died with the ledger entry.
    let refresh = app.request(post("/auth/refresh", &cookie_header(&cookies))).await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_succeeds_without_cookies() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_succeeds_with_garbage_refresh_cookie() {
    let app = TestApp::spawn().await;

    let response = app
        .request(post("/auth/logout", "refresh_token=definitely-not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_only_touches_the_presented_session() {
    let app = TestApp::spawn().await;

    // Two devices.
    let first = app.login_cookies("admin", "admin").await;
    let second = app.login_cookies("admin", "admin").await;

    let login = app.login("admin", "admin").await;
    let admin_id: Uuid = body_json(login).await["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(app.store.refresh_count(admin_id), 3);

    app.request(post("/auth/logout", &cookie_header(&first))).await;
    assert_eq!(app.store.refresh_count(admin_id), 2);

    // The other device keeps refreshing fine.
    let refresh = app.request(post("/auth/refresh", &cookie_header(&second))).await;
    assert_eq!(refresh.status(), StatusCode::OK);
}
