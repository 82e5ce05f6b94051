//! Common test utilities for server integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::RwLock;

use axum_test::TestServer;
use cookie::Cookie;
use roomshare_core::{Role, User, UserId};
use roomshare_server::{
    routes, AppState, Config, EmailSender, InMemoryMarketStore, InMemorySessionStore,
    SessionStore,
};
use roomshare_server::store::UserStore;
use serde_json::{json, Value};

/// Mock email sender that captures verification codes
#[derive(Default, Clone)]
pub struct MockEmailSender {
    /// Captured (email, code) pairs
    pub sent: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the last verification code sent to an email
    pub fn get_code(&self, email: &str) -> Option<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, c)| c.clone())
    }
}

impl EmailSender for MockEmailSender {
    fn send_verification(&self, email: &str, code: &str) -> Result<(), String> {
        self.sent
            .write()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// A running router plus direct handles on its stores
pub struct TestApp {
    pub server: TestServer,
    pub email_sender: MockEmailSender,
    pub store: Arc<InMemoryMarketStore>,
    pub sessions: Arc<InMemorySessionStore>,
}

/// Cheap hashing so signup-heavy tests stay fast
pub fn test_config() -> Config {
    Config {
        bcrypt_cost: 4,
        ..Config::default()
    }
}

/// Create a test server over in-memory stores with a mock email sender
pub fn create_test_app() -> TestApp {
    let email_sender = MockEmailSender::new();
    let store = Arc::new(InMemoryMarketStore::new());
    let sessions = Arc::new(InMemorySessionStore::new());

    let state = Arc::new(AppState::from_shared(
        store.clone(),
        sessions.clone(),
        email_sender.clone(),
        test_config(),
    ));

    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        email_sender,
        store,
        sessions,
    }
}

static NEXT_AADHAR: AtomicU64 = AtomicU64::new(100_000_000_000);

/// A fresh 12-digit aadhar number
pub fn unique_aadhar() -> String {
    NEXT_AADHAR.fetch_add(1, Ordering::Relaxed).to_string()
}

/// Session cookie for a token
pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::new("roomshare_session", token.to_string())
}

/// Insert a verified user straight into the store and open a session
pub fn seed_user(app: &TestApp, name: &str, role: Role) -> (UserId, String) {
    let mut user = User::new(
        name,
        format!("{}@example.com", name.to_lowercase()),
        unique_aadhar(),
        "not-a-real-hash",
        role,
    );
    user.is_verified = true;
    app.store.create_user(&user).unwrap();

    let session = app.sessions.create(user.id).unwrap();
    (user.id, session.id.0)
}

/// A valid room body
pub fn room_body(title: &str, city: &str, price: i64, beds: u32) -> Value {
    json!({
        "title": title,
        "description": "Bright room close to transit",
        "address": {
            "street": "12 Main Street",
            "area": "Old Town",
            "city": city,
            "state": "Karnataka",
            "zipCode": "560001"
        },
        "price": price,
        "amenities": ["WiFi", "parking"],
        "images": ["one.jpg", "two.jpg", "three.jpg"],
        "availableBeds": beds,
        "metadata": {
            "propertyType": "apartment",
            "furnishing": "furnished",
            "bedrooms": 2,
            "bathrooms": 1,
            "area": 650,
            "ownershipType": "self",
            "securityDeposit": 20000
        }
    })
}

/// Create a room through the API and return its id
pub async fn create_room(app: &TestApp, token: &str, body: Value) -> String {
    let response = app
        .server
        .post("/api/rooms")
        .add_cookie(session_cookie(token))
        .json(&body)
        .await;
    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Send a rental request and return the raw response
pub async fn send_request(
    app: &TestApp,
    token: &str,
    room_id: &str,
    message: &str,
) -> axum_test::TestResponse {
    app.server
        .post(&format!("/api/rooms/{}/request", room_id))
        .add_cookie(session_cookie(token))
        .json(&json!({ "message": message }))
        .await
}

/// Sign up and verify through the API, returning the session token
pub async fn signup_and_verify(app: &TestApp, name: &str, email: &str, role: &str) -> String {
    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "name": name,
            "email": email,
            "password": "correct-horse-battery",
            "aadharNumber": unique_aadhar(),
            "role": role,
        }))
        .await;
    assert_eq!(response.status_code(), 201);

    let code = app
        .email_sender
        .get_code(email)
        .expect("No verification code sent");

    let response = app
        .server
        .post("/api/auth/verify")
        .json(&json!({ "email": email, "code": code }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    body["data"]["token"].as_str().unwrap().to_string()
}
