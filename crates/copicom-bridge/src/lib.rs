//! Communication bridge between a frontend and the notification backend.
//!
//! This crate defines the types and protocols used to connect a user
//! interface with the asynchronous backend that reconciles notifications,
//! persists them on the device and turns push events into navigation.
//!
//! The frontend sends commands (refresh, push events, user actions) and the
//! backend pushes events back (the current notification list, navigation
//! commands, toasts).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`].

pub mod config;
pub mod lenient;
pub mod notification;
pub mod push;
pub mod route;
pub mod toast;

use tokio::sync::mpsc::{self, Receiver, Sender};

/// Messages emitted by the backend to inform the frontend of state updates.
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// The full, reconciled notification list after any change.
    NotificationsUpdated(Vec<notification::NotificationRecord>),
    /// The frontend should show the given screen.
    Navigate(route::Route),
    /// Transient message for the user.
    Toast(toast::ToastMessage),
    /// Response to the configuration request from the frontend.
    ConfigurationResponse(config::Config),
}

/// Commands issued by the frontend to drive the backend.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Merge the server's notifications into the local list.
    RefreshNotifications,
    /// A push notification arrived while the app was in the foreground.
    PushReceived(push::PushPayload),
    /// The user tapped a delivered push notification.
    PushTapped(push::PushPayload),
    /// The user tapped a row of the notification list.
    OpenNotification(String),
    /// The user marked a notification as read.
    MarkRead(String),
    /// The user deleted a notification.
    Delete(String),
    /// The platform handed out a push token that the server should know.
    RegisterPushToken(String),
    /// The navigation container is mounted and accepts routes.
    NavigationReady,
    /// The navigation container went away; routes must be held again.
    NavigationUnavailable,
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// frontend and backend.
pub struct BridgeChannels {
    /// Receiver used by the frontend to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the frontend to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the frontend.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the frontend.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
