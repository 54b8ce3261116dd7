//! Test fixtures for the in-memory workflow and the HTTP router.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use competitions_core::common::UserId;
use competitions_core::domains::auth::JwtService;
use competitions_core::domains::competitions::models::User;
use competitions_core::kernel::{InMemoryResourceStore, ServerDeps};
use competitions_core::server::build_app;
use competitions_core::server::response::ApiResponse;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test_secret_key";
pub const TEST_ISSUER: &str = "competitions";

/// A seeded in-memory world: one regular author and two admins.
pub struct World {
    pub store: InMemoryResourceStore,
    pub author: User,
    pub admins: Vec<User>,
}

impl World {
    pub fn new() -> Self {
        init_tracing();
        let store = InMemoryResourceStore::new();
        let author = store.seed_user("Grace Hopper", false);
        let admins = vec![
            store.seed_user("Admin Ada", true),
            store.seed_user("Admin Alan", true),
        ];
        Self {
            store,
            author,
            admins,
        }
    }

    pub fn deps(&self) -> ServerDeps {
        self.store.deps()
    }

    pub fn admin_ids(&self) -> Vec<UserId> {
        self.admins.iter().map(|a| a.id).collect()
    }

    /// Inbox contents of every admin, fresh from the store.
    pub fn admin_inboxes(&self) -> Vec<Vec<competitions_core::common::RequestId>> {
        self.admins
            .iter()
            .map(|a| self.store.user(a.id).map(|u| u.requests).unwrap_or_default())
            .collect()
    }
}

/// Router over an in-memory store plus a JWT service to mint tokens with.
pub struct TestApp {
    pub world: World,
    pub jwt: Arc<JwtService>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let world = World::new();
        let jwt = Arc::new(JwtService::new(TEST_SECRET, TEST_ISSUER.to_string()));
        let router = build_app(world.deps(), jwt.clone());
        Self { world, jwt, router }
    }

    pub fn token_for(&self, user_id: UserId, admin: bool) -> String {
        self.jwt
            .create_token(user_id, admin)
            .expect("Failed to create test token")
    }

    pub fn author_token(&self) -> String {
        self.token_for(self.world.author.id, false)
    }

    pub fn admin_token(&self) -> String {
        self.token_for(self.world.admins[0].id, true)
    }

    /// POST /competitions and decode the `{ success, message }` reply.
    pub async fn post(&self, token: Option<&str>, body: Value) -> (StatusCode, ApiResponse) {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/competitions")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = request
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        let (status, bytes) = self.send(request).await;
        let reply = serde_json::from_slice(&bytes).expect("Reply is not an ApiResponse");
        (status, reply)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        let (status, bytes) = self.send(request).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::body::Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, bytes)
    }
}

/// Honour RUST_LOG in test runs. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
