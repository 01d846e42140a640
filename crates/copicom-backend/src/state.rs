use chrono::{DateTime, Utc};
use copicom_bridge::{MessageFromBackend, notification::NotificationRecord};
use tokio::sync::mpsc::Sender;

use crate::{api::ApiClient, navigation::Navigator, store::LocalStore};

/// The core application state: configuration, the reconciled notification
/// list and the resources needed to keep it in sync.
///
/// Only the backend's message loop mutates `notifications`; spawned tasks
/// report back through the loop instead of writing here.
pub struct State {
    /// The loaded application configuration.
    pub config: copicom_bridge::config::Config,
    /// Client for the remote notification API.
    pub api: ApiClient,
    /// On-device persistence.
    pub store: LocalStore,
    /// First-run instant; server notifications older than this are hidden.
    pub install_time: DateTime<Utc>,
    /// The merged list, most recent first. Single source of truth for the
    /// frontend.
    pub notifications: Vec<NotificationRecord>,
    /// Dispatcher for routes produced by taps.
    pub navigator: Navigator<Sender<MessageFromBackend>>,
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<State>>;
