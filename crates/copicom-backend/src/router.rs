//! Turns push events and list taps into list changes and routes.

use chrono::{DateTime, Utc};
use copicom_bridge::{
    notification::{NotificationKind, NotificationRecord, format_instant},
    push::PushPayload,
    route::Route,
};

use crate::reconcile::UNTITLED;

const NEW_ALERT: &str = "New alert";
const MESSAGE_RECEIVED: &str = "Message received";

/// Result of handling a tapped push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapOutcome {
    /// Id of the record that went from unread to read, if any.
    pub marked_read: Option<String>,
    /// Where the frontend should go.
    pub route: Option<Route>,
}

/// Builds a client-side record for a push that arrived in the foreground.
///
/// The id is the receipt time in milliseconds, moved forward until it does
/// not collide with any id in `existing`.
pub fn record_from_push(
    payload: &PushPayload,
    existing: &[NotificationRecord],
    now: DateTime<Utc>,
) -> NotificationRecord {
    let mut stamp = now.timestamp_millis();
    while existing.iter().any(|r| r.id == stamp.to_string()) {
        stamp += 1;
    }

    let data = &payload.data;
    let title = non_empty(&payload.title)
        .or(non_empty(&data.titulo))
        .unwrap_or(NEW_ALERT);
    let description = non_empty(&payload.body)
        .or(non_empty(&data.mensaje))
        .unwrap_or(MESSAGE_RECEIVED);

    NotificationRecord::new(
        stamp.to_string(),
        title,
        description,
        format_instant(now),
        data.kind(),
        data.linked_id().map(str::to_string),
    )
}

/// Handles a push delivered while the app is visible: the synthesized record
/// is put at the front of `records`. Duplicate deliveries are not detected.
pub fn received(records: &mut Vec<NotificationRecord>, payload: &PushPayload, now: DateTime<Utc>) {
    let record = record_from_push(payload, records, now);
    log::info!("Push received, stored as notification {}", record.id);
    records.insert(0, record);
}

/// Handles a push the user tapped.
///
/// A payload with neither a category nor any id is informational and leaves
/// everything untouched. Otherwise the matching record is marked read (by
/// the payload's `id`, or else by its link target) and the route is resolved.
pub fn tapped(records: &mut [NotificationRecord], payload: &PushPayload) -> TapOutcome {
    let data = &payload.data;
    if !data.has_routing_info() {
        log::info!("Tapped push carries no category or id, ignoring it");
        return TapOutcome::default();
    }

    let by_id = data
        .id
        .as_deref()
        .and_then(|id| records.iter().position(|r| r.id == id));
    let position = by_id.or_else(|| {
        let kind = data.kind();
        let target = data.linked_id()?;
        records
            .iter()
            .position(|r| r.kind == kind && r.link_target() == Some(target))
    });

    let marked_read = position.and_then(|index| {
        let record = &mut records[index];
        record.mark_read().then(|| record.id.clone())
    });

    let route = resolve_route(payload);
    if route.is_none() {
        log::info!("No route for tapped push of kind {:?}", data.kind());
    }

    TapOutcome { marked_read, route }
}

/// Deep link carried by a push payload.
pub fn resolve_route(payload: &PushPayload) -> Option<Route> {
    let data = &payload.data;
    let target = data.linked_id()?.to_string();
    match data.kind() {
        NotificationKind::Poll => Some(Route::PollDetail {
            poll_id: target,
            title: non_empty(&data.titulo)
                .or(non_empty(&payload.title))
                .unwrap_or(UNTITLED)
                .to_string(),
        }),
        NotificationKind::News => Some(Route::NewsDetail { news_id: target }),
        NotificationKind::Alert => None,
    }
}

/// Deep link of a stored record, used when a row of the list is tapped.
pub fn route_for_record(record: &NotificationRecord) -> Option<Route> {
    let target = record.link_target()?.to_string();
    match record.kind {
        NotificationKind::Poll => Some(Route::PollDetail {
            poll_id: target,
            title: record.title.clone(),
        }),
        NotificationKind::News => Some(Route::NewsDetail { news_id: target }),
        NotificationKind::Alert => None,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
