//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::email::EmailSender;
use crate::store::{MarketStore, SessionStore};

/// State handed to every handler
///
/// Services are built per request from these handles; nothing else is
/// shared between requests.
pub struct AppState<M, S, E>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    pub store: Arc<M>,
    pub session_store: Arc<S>,
    pub email_sender: E,
    pub config: Config,
}

impl<M, S, E> AppState<M, S, E>
where
    M: MarketStore,
    S: SessionStore,
    E: EmailSender,
{
    pub fn new(store: M, session_store: S, email_sender: E, config: Config) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(session_store), email_sender, config)
    }

    /// Build from handles that may point at the same backend
    pub fn from_shared(
        store: Arc<M>,
        session_store: Arc<S>,
        email_sender: E,
        config: Config,
    ) -> Self {
        Self {
            store,
            session_store,
            email_sender,
            config,
        }
    }
}
