//! RoomShare marketplace server
//!
//! Room listings, rental requests and roommate matching over a JSON HTTP
//! API, backed by an in-memory or SQLite document store.

pub mod config;
pub mod crypto;
pub mod email;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::Config;
pub use email::{ConsoleEmailSender, EmailSender};
pub use error::MarketError;
pub use service::{ListingService, ProfileService, RequestService, RoomService};
pub use state::AppState;
pub use store::{
    InMemoryMarketStore, InMemorySessionStore, MarketStore, ReconcileReport, SessionStore,
    SqliteStore,
};
