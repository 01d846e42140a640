use chrono::Utc;
use copicom_bridge::toast::ToastKind;

use crate::{
    api::{ApiError, RemoteNotification},
    app::BackendEvent,
    reconcile::{ReconcileOutcome, reconcile},
    router::route_for_record,
};

/// Handles [`copicom_bridge::MessageToBackend::RefreshNotifications`].
///
/// The fetch runs in its own task so the message loop keeps serving pushes
/// and user actions meanwhile; the result comes back as
/// [`BackendEvent::RemoteFetched`].
pub async fn handle_refresh_request(context: super::AppContextHandle) {
    let api = {
        let state = context.state.read().await;
        state.api.clone()
    };

    let events = context.events.clone();
    tokio::spawn(async move {
        let result = api.fetch_notifications().await;
        if events.send(BackendEvent::RemoteFetched(result)).await.is_err() {
            log::debug!("Backend stopped before the notification fetch completed");
        }
    });
}

/// Merges a completed fetch into the list as it is *now*, persists the
/// merge and publishes it.
pub async fn handle_remote_fetched(
    context: super::AppContextHandle,
    result: Result<Vec<RemoteNotification>, ApiError>,
) {
    let remote = match result {
        Ok(list) => {
            log::info!("Fetched {} notifications from the server", list.len());
            Some(list)
        }
        Err(e) => {
            log::error!("Failed to load notifications, using the local list only: {e}");
            None
        }
    };

    let outcome = {
        let mut state = context.state.write().await;
        let local = std::mem::take(&mut state.notifications);
        let reconciliation = reconcile(local, remote, state.install_time, Utc::now());
        state.notifications = reconciliation.records;
        if reconciliation.outcome == ReconcileOutcome::Merged {
            state.store.save(&state.notifications).await;
        }
        reconciliation.outcome
    };

    if outcome == ReconcileOutcome::LocalOnly {
        context
            .send_toast(ToastKind::Warning, "Could not reach the server, showing saved notifications.")
            .await;
    }
    context.publish_notifications().await;
}

/// Handles [`copicom_bridge::MessageToBackend::MarkRead`].
pub async fn handle_mark_read(context: super::AppContextHandle, id: String) {
    let changed = {
        let mut state = context.state.write().await;
        let changed = match state.notifications.iter_mut().find(|r| r.id == id) {
            Some(record) => record.mark_read(),
            None => {
                log::warn!("Cannot mark unknown notification {id} as read");
                false
            }
        };
        if changed {
            state.store.save(&state.notifications).await;
        }
        changed
    };

    if changed {
        context.publish_notifications().await;
        sync_read_state(&context, id).await;
    }
}

/// Handles [`copicom_bridge::MessageToBackend::Delete`].
pub async fn handle_delete(context: super::AppContextHandle, id: String) {
    let (removed, api) = {
        let mut state = context.state.write().await;
        let before = state.notifications.len();
        state.notifications.retain(|r| r.id != id);
        let removed = state.notifications.len() != before;
        if removed {
            state.store.save(&state.notifications).await;
        }
        (removed, state.api.clone())
    };

    if !removed {
        log::warn!("Cannot delete unknown notification {id}");
        return;
    }

    context.publish_notifications().await;
    tokio::spawn(async move {
        if let Err(e) = api.delete(&id).await {
            log::warn!("Server did not delete notification {id}: {e}");
        }
    });
}

/// Handles [`copicom_bridge::MessageToBackend::OpenNotification`]: a row of
/// the list was tapped. The record is marked read and its deep link, if
/// any, is requested.
pub async fn handle_open(context: super::AppContextHandle, id: String) {
    let changed = {
        let mut state = context.state.write().await;
        let Some(record) = state.notifications.iter_mut().find(|r| r.id == id) else {
            log::warn!("Cannot open unknown notification {id}");
            return;
        };
        let changed = record.mark_read();
        let route = route_for_record(record);

        if changed {
            state.store.save(&state.notifications).await;
        }
        match route {
            Some(route) => {
                state.navigator.request_navigation(route);
            }
            None => log::info!("Notification {id} has no route"),
        }
        changed
    };

    if changed {
        context.publish_notifications().await;
        sync_read_state(&context, id).await;
    }
}

/// Handles [`copicom_bridge::MessageToBackend::RegisterPushToken`].
pub async fn handle_register_token(context: super::AppContextHandle, token: String) {
    let api = {
        let state = context.state.read().await;
        state.api.clone()
    };

    tokio::spawn(async move {
        match api.register_push_token(&token).await {
            Ok(()) => log::info!("Push token registered"),
            Err(e) => log::error!("Failed to register push token: {e}"),
        }
    });
}

/// Tells the server about a read notification without waiting for it.
pub(crate) async fn sync_read_state(context: &super::AppContextHandle, id: String) {
    let api = {
        let state = context.state.read().await;
        state.api.clone()
    };

    tokio::spawn(async move {
        if let Err(e) = api.mark_read(&id).await {
            log::warn!("Server did not mark notification {id} as read: {e}");
        }
    });
}
