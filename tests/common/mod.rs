//! Test helpers: an in-process application over the in-memory store plus
//! cookie plumbing for the oneshot requests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::util::ServiceExt;

use panel_auth::{
    build_router,
    config::{Config, DatabaseConfig, Environment, JwtConfig, SmtpConfig},
    models::{Role, User},
    services::{AccountService, EmailProvider, JwtService, MockEmailService, SessionManager},
    store::{CredentialStore, MemoryStore, TokenLedger},
    utils::{hash_password, Password},
    AppState,
};

pub const TEST_ACCESS_SECRET: &str = "test-access-secret-0123456789abcdef";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-0123456789abcdef";

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub fn test_config() -> Config {
    Config {
        environment: Environment::Dev,
        service_name: "panel-auth-test".to_string(),
        service_version: "0.0.0".to_string(),
        log_level: "debug".to_string(),
        port: 0,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            access_secret: TEST_ACCESS_SECRET.to_string(),
            refresh_secret: TEST_REFRESH_SECRET.to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from: "noreply@localhost".to_string(),
        },
        admin_url: "http://localhost:3000".to_string(),
        allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_email(Arc::new(MockEmailService)).await
    }

    pub async fn spawn_with_email(email: Arc<dyn EmailProvider>) -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let users: Arc<dyn CredentialStore> = store.clone();
        let ledger: Arc<dyn TokenLedger> = store.clone();
        let jwt = JwtService::new(&config.jwt);

        let sessions = SessionManager::new(
            users.clone(),
            ledger.clone(),
            jwt.clone(),
            email,
            config.admin_url.clone(),
        );
        let accounts = AccountService::new(users.clone(), ledger.clone());

        let state = AppState {
            config,
            users: users.clone(),
            ledger,
            jwt,
            sessions,
            accounts,
        };

        // Seed the admin account the way the bootstrap binary would.
        let hash = hash_password(&Password::new(ADMIN_PASSWORD.to_string()))
            .expect("failed to hash admin password");
        let admin = User::new(
            "admin".to_string(),
            "admin".to_string(),
            ADMIN_USERNAME.to_string(),
            ADMIN_EMAIL.to_string(),
            hash.into_string(),
            Role::Admin,
        );
        users.insert(&admin).await.expect("failed to seed admin");

        let router = build_router(state.clone())
            .await
            .expect("failed to build router");

        Self {
            router,
            state,
            store,
        }
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("request failed")
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        self.post_json(
            "/auth/login",
            serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Log in and return the session cookies, asserting success.
    pub async fn login_cookies(&self, username: &str, password: &str) -> Vec<(String, String)> {
        let response = self.login(username, password).await;
        assert_eq!(response.status(), StatusCode::OK);
        set_cookies(&response)
    }
}

/// Parse every `Set-Cookie` header into (name, value) pairs.
pub fn set_cookies(response: &Response<Body>) -> Vec<(String, String)> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| {
            let raw = value.to_str().ok()?;
            let pair = raw.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

pub fn cookie_value<'a>(cookies: &'a [(String, String)], name: &str) -> Option<&'a str> {
    cookies
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Build a `Cookie` request header from (name, value) pairs.
pub fn cookie_header(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(n, v)| format!("{}={}", n, v))
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not valid json")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not utf-8")
}
