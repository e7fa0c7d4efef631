#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Duration;
use identity_service::identity::confirmation::ConfirmationEngine;
use identity_service::identity::errors::DeliveryError;
use identity_service::identity::errors::StoreError;
use identity_service::identity::models::AppId;
use identity_service::identity::models::Application;
use identity_service::identity::models::ConfirmationCode;
use identity_service::identity::models::ConfirmationRecord;
use identity_service::identity::models::EmailMessage;
use identity_service::identity::models::ExternalConfirmation;
use identity_service::identity::models::NewUser;
use identity_service::identity::models::User;
use identity_service::identity::models::UserId;
use identity_service::identity::ports::ApplicationRepository;
use identity_service::identity::ports::CodeGenerator;
use identity_service::identity::ports::ConfirmationRepository;
use identity_service::identity::ports::EmailSender;
use identity_service::identity::ports::UserRepository;
use identity_service::identity::service::AuthService;
use identity_service::inbound::http::router::create_router;

pub const APP_ID: i64 = 1;
pub const APP_SECRET: &[u8] = b"test-app-secret-for-jwt-signing-32-bytes";
pub const TOKEN_TTL_MINUTES: i64 = 60;

pub type TestService = AuthService<InMemoryStore, InMemoryStore, InMemoryStore>;

/// In-memory implementation of every store port.
///
/// Each operation runs under one lock, so check-and-set operations are atomic.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    apps: HashMap<i64, Application>,
    confirmations: HashMap<i64, (i64, ConfirmationRecord)>,
    next_confirmation_id: i64,
}

impl InMemoryStore {
    pub fn with_app(id: i64, secret: &[u8]) -> Self {
        let store = Self::default();
        store.add_app(id, secret);
        store
    }

    pub fn add_app(&self, id: i64, secret: &[u8]) {
        self.state.lock().unwrap().apps.insert(
            id,
            Application {
                id: AppId(id),
                name: format!("app-{}", id),
                secret: secret.to_vec(),
            },
        );
    }

    pub fn set_admin(&self, id: UserId, is_admin: bool) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.is_admin = is_admin;
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn confirmation(&self, user_id: UserId) -> Option<ConfirmationRecord> {
        self.state
            .lock()
            .unwrap()
            .confirmations
            .get(&user_id.0)
            .map(|(_, record)| record.clone())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::AlreadyExists(user.email));
        }

        let id = UserId(state.users.len() as i64 + 1);
        state.users.push(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            profile: user.profile,
            is_admin: false,
        });
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn is_admin(&self, id: UserId) -> Result<bool, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.is_admin)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryStore {
    async fn find_by_id(&self, id: AppId) -> Result<Option<Application>, StoreError> {
        self.check_available()?;
        Ok(self.state.lock().unwrap().apps.get(&id.0).cloned())
    }
}

#[async_trait]
impl ConfirmationRepository for InMemoryStore {
    async fn save_code(&self, user_id: UserId, code: &ConfirmationCode) -> Result<i64, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        if state.confirmations.contains_key(&user_id.0) {
            return Err(StoreError::AlreadyExists(format!(
                "confirmation for user {}",
                user_id
            )));
        }

        state.next_confirmation_id += 1;
        let id = state.next_confirmation_id;
        state.confirmations.insert(
            user_id.0,
            (
                id,
                ConfirmationRecord {
                    user_id,
                    code: code.clone(),
                    confirmed: false,
                },
            ),
        );
        Ok(id)
    }

    async fn find_code(&self, user_id: UserId) -> Result<Option<ConfirmationRecord>, StoreError> {
        self.check_available()?;
        Ok(self.confirmation(user_id))
    }

    async fn mark_confirmed(&self, user_id: UserId, code: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        match state.confirmations.get_mut(&user_id.0) {
            Some((_, record)) if !record.confirmed && record.code.matches(code) => {
                record.confirmed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn confirm_by_external_handle(
        &self,
        handle: &str,
        fallback_code: &ConfirmationCode,
    ) -> Result<ExternalConfirmation, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        let Some(user_id) = state
            .users
            .iter()
            .filter(|u| u.profile.external_handle == handle)
            .map(|u| u.id)
            .min()
        else {
            return Ok(ExternalConfirmation::NotRegistered);
        };

        if let Some((_, record)) = state.confirmations.get_mut(&user_id.0) {
            if record.confirmed {
                return Ok(ExternalConfirmation::AlreadyConfirmed);
            }
            record.confirmed = true;
            return Ok(ExternalConfirmation::NowConfirmed);
        }

        state.next_confirmation_id += 1;
        let id = state.next_confirmation_id;
        state.confirmations.insert(
            user_id.0,
            (
                id,
                ConfirmationRecord {
                    user_id,
                    code: fallback_code.clone(),
                    confirmed: true,
                },
            ),
        );
        Ok(ExternalConfirmation::NowConfirmed)
    }
}

/// Email sender that records every message and can be switched to fail.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
}

impl RecordingEmailSender {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Code from the latest message sent to `recipient`.
    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == recipient)
            .and_then(|m| m.body.split_whitespace().last().map(str::to_string))
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Unreachable("smtp relay down".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Deterministic codes: 10001, 10002, ...
pub struct SequenceCodeGenerator {
    next: AtomicU32,
}

impl Default for SequenceCodeGenerator {
    fn default() -> Self {
        Self {
            next: AtomicU32::new(10_001),
        }
    }
}

impl CodeGenerator for SequenceCodeGenerator {
    fn generate(&self) -> ConfirmationCode {
        ConfirmationCode::new(self.next.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

/// Service wired to in-memory collaborators
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub emails: Arc<RecordingEmailSender>,
    pub service: Arc<TestService>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::with_app(APP_ID, APP_SECRET));
        let emails = Arc::new(RecordingEmailSender::default());

        let engine = ConfirmationEngine::new(
            Arc::clone(&store),
            emails.clone(),
            Arc::new(SequenceCodeGenerator::default()),
            "noreply@identity.test",
        );
        let service = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            engine,
            Arc::new(Authenticator::new(Duration::minutes(TOKEN_TTL_MINUTES))),
        ));

        Self {
            store,
            emails,
            service,
        }
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub ctx: TestContext,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let ctx = TestContext::new();

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = create_router(Arc::clone(&ctx.service));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            ctx,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }
}
