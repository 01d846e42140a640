use chrono::Utc;
use copicom_bridge::push::PushPayload;

use crate::router;

/// Handles [`copicom_bridge::MessageToBackend::PushReceived`]: the push is
/// stored at the top of the list. No navigation happens.
pub async fn handle_push_received(context: super::AppContextHandle, payload: PushPayload) {
    {
        let mut state = context.state.write().await;
        router::received(&mut state.notifications, &payload, Utc::now());
        state.store.save(&state.notifications).await;
    }
    context.publish_notifications().await;
}

/// Handles [`copicom_bridge::MessageToBackend::PushTapped`], whatever state
/// the app was in when the user tapped.
pub async fn handle_push_tapped(context: super::AppContextHandle, payload: PushPayload) {
    let marked_read = {
        let mut state = context.state.write().await;
        let outcome = router::tapped(&mut state.notifications, &payload);
        if outcome.marked_read.is_some() {
            state.store.save(&state.notifications).await;
        }
        if let Some(route) = outcome.route {
            state.navigator.request_navigation(route);
        }
        outcome.marked_read
    };

    if let Some(id) = marked_read {
        context.publish_notifications().await;
        super::notification_service::sync_read_state(&context, id).await;
    }
}
