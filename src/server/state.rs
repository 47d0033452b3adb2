//! Server application state shared across handlers

use crate::shutdown::ShutdownState;
use crate::store::{AccountStore, ResearchStore};
use crate::webhook::WebhookDispatcher;
use std::sync::Arc;

/// Shared state for the server: the session token plus handles to the
/// external collaborators. Stores and dispatcher are trait objects so tests
/// and local development can swap in in-process implementations.
#[derive(Clone)]
pub struct DiliguardState {
    /// Authentication token for this server session
    pub auth_token: String,

    /// Research record store
    pub research_store: Arc<dyn ResearchStore>,

    /// Account store (usage accounting)
    pub account_store: Arc<dyn AccountStore>,

    /// Hand-off to the external research process
    pub webhook: Arc<dyn WebhookDispatcher>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl DiliguardState {
    pub fn new(
        auth_token: String,
        research_store: Arc<dyn ResearchStore>,
        account_store: Arc<dyn AccountStore>,
        webhook: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        Self {
            auth_token,
            research_store,
            account_store,
            webhook,
            shutdown_state: ShutdownState::new(),
        }
    }
}
