//! In-memory collaborators and helpers shared by the engine tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{Semaphore, mpsc};

use chathub_core::config::RealtimeConfig;
use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::traits::{ActivityStore, ChatStore, TokenValidator, UserDirectory};
use chathub_core::types::UserId;
use chathub_entity::chat::ChatRecord;
use chathub_realtime::connection::OutboundFrame;
use chathub_realtime::{Collaborators, ConnectionGuard, RealtimeEngine};

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);
pub const CAROL: UserId = UserId(3);
/// Has a valid token but no directory entry.
pub const GHOST: UserId = UserId(99);

pub struct Directory {
    names: HashMap<UserId, String>,
}

impl Directory {
    pub fn new() -> Self {
        let names = HashMap::from([
            (ALICE, "alice".to_string()),
            (BOB, "bob".to_string()),
            (CAROL, "carol".to_string()),
        ]);
        Self { names }
    }
}

#[async_trait]
impl UserDirectory for Directory {
    async fn get_username_by_id(&self, user_id: UserId) -> AppResult<String> {
        self.names
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}

#[derive(Default)]
pub struct MemoryChats {
    pub saved: Mutex<Vec<ChatRecord>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ChatStore for MemoryChats {
    async fn save_chat_message(&self, chat: &ChatRecord) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::database("database is locked"));
        }
        self.saved.lock().push(chat.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryActivity {
    pub touched: Mutex<Vec<UserId>>,
}

#[async_trait]
impl ActivityStore for MemoryActivity {
    async fn update_last_activity(&self, user_id: UserId) -> AppResult<()> {
        self.touched.lock().push(user_id);
        Ok(())
    }
}

/// A directory whose lookups can be held until released.
pub struct GatedDirectory {
    inner: Directory,
    pub hold: AtomicBool,
    pub gate: Semaphore,
}

impl GatedDirectory {
    pub fn new() -> Self {
        Self {
            inner: Directory::new(),
            hold: AtomicBool::new(false),
            gate: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl UserDirectory for GatedDirectory {
    async fn get_username_by_id(&self, user_id: UserId) -> AppResult<String> {
        if self.hold.load(Ordering::SeqCst) {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
        self.inner.get_username_by_id(user_id).await
    }
}

pub struct PrefixTokens;

#[async_trait]
impl TokenValidator for PrefixTokens {
    async fn validate_token(&self, token: &str) -> AppResult<UserId> {
        token
            .strip_prefix("token-")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| AppError::authentication("Invalid token format"))
    }
}

pub struct Hub {
    pub engine: RealtimeEngine,
    pub chats: Arc<MemoryChats>,
    pub activity: Arc<MemoryActivity>,
}

pub fn hub() -> Hub {
    hub_with(RealtimeConfig::default())
}

pub fn hub_with(config: RealtimeConfig) -> Hub {
    hub_with_users(config, Arc::new(Directory::new()))
}

pub fn hub_with_users(config: RealtimeConfig, users: Arc<dyn UserDirectory>) -> Hub {
    let chats = Arc::new(MemoryChats::default());
    let activity = Arc::new(MemoryActivity::default());
    let engine = RealtimeEngine::new(
        config,
        Collaborators {
            tokens: Arc::new(PrefixTokens),
            users,
            chats: chats.clone(),
            activity: activity.clone(),
        },
    );
    Hub {
        engine,
        chats,
        activity,
    }
}

/// A connected client: its guard plus the frames queued for it.
pub struct Client {
    pub guard: ConnectionGuard,
    pub rx: mpsc::Receiver<OutboundFrame>,
}

impl Client {
    pub async fn connect(engine: &RealtimeEngine, user: UserId) -> Self {
        let (guard, rx) = engine.connect(user).await.unwrap();
        Self { guard, rx }
    }

    /// Connect and discard the setup frames.
    pub async fn connect_quiet(engine: &RealtimeEngine, user: UserId) -> Self {
        let mut client = Self::connect(engine, user).await;
        client.drain();
        client
    }

    /// Every JSON frame queued so far, pings skipped.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            if let OutboundFrame::Text(text) = frame {
                frames.push(serde_json::from_str(&text).unwrap());
            }
        }
        frames
    }

    pub async fn send(&self, engine: &RealtimeEngine, raw: &str) {
        let _ = engine.handle_inbound(self.guard.handle(), raw).await;
    }

    /// Wait for the next JSON frame.
    pub async fn next(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(std::time::Duration::from_secs(5), self.rx.recv())
                .await
                .expect("timed out waiting for a frame")
                .expect("outbound queue closed");
            if let OutboundFrame::Text(text) = frame {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }
}

pub fn status_changes(frames: &[Value]) -> Vec<&Value> {
    frames
        .iter()
        .filter(|f| f["type"] == "userStatusChange")
        .collect()
}
