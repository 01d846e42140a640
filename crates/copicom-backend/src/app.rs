//! Application context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! list updates and toasts back to the frontend bridge. Every mutation of
//! the notification list happens inside [`AppContext::consume_bridge_messages`],
//! one message at a time.

use std::sync::Arc;

use copicom_bridge::{
    MessageFromBackend, MessageToBackend,
    toast::{ToastKind, ToastMessage},
};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::api::{ApiError, RemoteNotification};
use crate::services;
use crate::state::SharedState;

/// Completions of work the backend started itself.
#[derive(Debug)]
pub(crate) enum BackendEvent {
    /// A notification fetch finished.
    RemoteFetched(Result<Vec<RemoteNotification>, ApiError>),
}

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Mutable runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the frontend bridge.
    pub tx: Sender<MessageFromBackend>,
    /// Channel for spawned tasks to hand their results back to the loop.
    pub events: Sender<BackendEvent>,
}

impl AppContext {
    /// Read and dispatch frontend messages and internal events until the
    /// frontend closes its side of the bridge.
    pub async fn consume_bridge_messages(
        self: &Arc<Self>,
        mut rx: Receiver<MessageToBackend>,
        mut events_rx: Receiver<BackendEvent>,
    ) {
        loop {
            tokio::select! {
                message = rx.recv() => match message {
                    Some(message) => {
                        log::debug!("Got a frontend message: {message:?}");
                        self.dispatch_message(message).await;
                    }
                    None => break,
                },
                Some(event) = events_rx.recv() => self.dispatch_event(event).await,
            }
            // routes the frontend was too busy to take
            self.state.write().await.navigator.flush();
        }
        log::info!("Frontend closed the bridge, stopping the backend loop");
    }

    /// Dispatches the received message from frontend down to individual
    /// service handlers.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        use services::{
            config_service, navigation_service, notification_service, push_service,
        };

        match message {
            MessageToBackend::ConfigurationRequest => {
                config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::RefreshNotifications => {
                notification_service::handle_refresh_request(self.clone()).await;
            }
            MessageToBackend::PushReceived(payload) => {
                push_service::handle_push_received(self.clone(), payload).await;
            }
            MessageToBackend::PushTapped(payload) => {
                push_service::handle_push_tapped(self.clone(), payload).await;
            }
            MessageToBackend::OpenNotification(id) => {
                notification_service::handle_open(self.clone(), id).await;
            }
            MessageToBackend::MarkRead(id) => {
                notification_service::handle_mark_read(self.clone(), id).await;
            }
            MessageToBackend::Delete(id) => {
                notification_service::handle_delete(self.clone(), id).await;
            }
            MessageToBackend::RegisterPushToken(token) => {
                notification_service::handle_register_token(self.clone(), token).await;
            }
            MessageToBackend::NavigationReady => {
                navigation_service::handle_navigation_ready(self.clone()).await;
            }
            MessageToBackend::NavigationUnavailable => {
                navigation_service::handle_navigation_unavailable(self.clone()).await;
            }
        }
    }

    async fn dispatch_event(self: &Arc<Self>, event: BackendEvent) {
        match event {
            BackendEvent::RemoteFetched(result) => {
                services::notification_service::handle_remote_fetched(self.clone(), result).await;
            }
        }
    }

    /// Send a message to the frontend bridge. A frontend that has gone away
    /// simply misses the message.
    pub async fn send(&self, message: MessageFromBackend) {
        if self.tx.send(message).await.is_err() {
            log::debug!("Frontend is gone, dropping backend message");
        }
    }

    /// Send the current notification list to the frontend.
    pub async fn publish_notifications(&self) {
        let notifications = {
            let state = self.state.read().await;
            state.notifications.clone()
        };
        self.send(MessageFromBackend::NotificationsUpdated(notifications))
            .await;
    }

    /// Send a toast to the frontend bridge.
    pub async fn send_toast(&self, kind: ToastKind, content: impl Into<String>) {
        self.send(MessageFromBackend::Toast(ToastMessage {
            kind,
            message: content.into(),
        }))
        .await;
    }
}
