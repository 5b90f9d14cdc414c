//! In-process application harness for route tests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tally_db::migration::{Migrator, MigratorTrait};
use tally_shared::{JwtConfig, JwtService};
use tower::ServiceExt;

use crate::{AppState, create_router};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn spawn_app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(db, JwtService::new(JwtConfig::default()));
    TestApp {
        router: create_router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Registers a user and returns a bearer token for it.
    pub async fn register(&self, username: &str, password: &str) -> String {
        let credentials = json!({ "username": username, "password": password });
        let (status, _) = self
            .post("/api/v1/auth/register", None, credentials.clone())
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.post("/api/v1/auth/login", None, credentials).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Opens an account and returns its id.
    pub async fn open_account(&self, token: &str, name: &str, balance: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/accounts",
                Some(token),
                json!({ "name": name, "balance": balance }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn balance(&self, token: &str, id: &str) -> String {
        let (status, body) = self
            .get(&format!("/api/v1/accounts/{id}"), Some(token))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["balance"].as_str().unwrap().to_string()
    }
}
