#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use chathub_api::{AppState, build_router};
use chathub_auth::{JwtDecoder, JwtEncoder};
use chathub_core::config::{AppConfig, DatabaseConfig};
use chathub_core::types::UserId;
use chathub_database::migration::run_migrations;
use chathub_database::{ActivityRepository, ChatRepository, DatabasePool, UserRepository};
use chathub_realtime::{Collaborators, RealtimeEngine};

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub users: UserRepository,
    pub chats: ChatRepository,
    pub encoder: JwtEncoder,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = AppConfig {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
                ..DatabaseConfig::default()
            },
            ..AppConfig::default()
        };

        let db = DatabasePool::connect(&config.database).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let users = UserRepository::new(db.pool().clone());
        let chats = ChatRepository::new(db.pool().clone());
        let realtime = RealtimeEngine::new(
            config.realtime.clone(),
            Collaborators {
                tokens: Arc::new(JwtDecoder::new(&config.auth)),
                users: Arc::new(users.clone()),
                chats: Arc::new(chats.clone()),
                activity: Arc::new(ActivityRepository::new(db.pool().clone())),
            },
        );
        let encoder = JwtEncoder::new(&config.auth);

        let state = AppState::new(config, db, realtime);
        let router = build_router(state.clone());

        Self {
            state,
            router,
            users,
            chats,
            encoder,
        }
    }

    pub async fn user(&self, name: &str) -> UserId {
        UserId(self.users.create(name).await.unwrap().user_id)
    }

    pub fn token(&self, user: UserId) -> String {
        self.encoder.generate_token(user).unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }
}
