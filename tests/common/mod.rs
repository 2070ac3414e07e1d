use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use tower::ServiceExt;

use imasu::{
    app::build_app,
    config::{AppConfig, Environment, JwtConfig},
    state::AppState,
    store::MemoryStore,
};

pub const SECRET: &str = "integration-secret";

/// A router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        database_url: None,
        jwt: JwtConfig {
            secret: SECRET.into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 60 * 24 * 30,
        },
        host: "127.0.0.1".into(),
        port: 0,
    }
}

pub fn spawn_app() -> TestApp {
    let state = AppState::from_parts(Arc::new(test_config()), Arc::new(MemoryStore::new()));
    TestApp {
        router: build_app(state),
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(req.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.json(
            "POST",
            "/api/users",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let form = format!("username={username}&password={password}");
        let req = Request::builder()
            .method("POST")
            .uri("/api/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        self.send(req).await
    }

    /// Register a user and return its access token.
    pub async fn bootstrap(&self, email: &str) -> String {
        let (status, body) = self.register(email, "pw1").await;
        assert_eq!(status, StatusCode::OK, "bootstrap register failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }
}
