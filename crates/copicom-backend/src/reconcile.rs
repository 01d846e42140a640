//! Merging of locally stored and freshly fetched notifications.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use copicom_bridge::notification::{NotificationKind, NotificationRecord, format_instant};
use sha2::{Digest, Sha256};

use crate::api::RemoteNotification;

pub const UNTITLED: &str = "Untitled";
pub const NO_MESSAGE: &str = "No message";

/// How a [`Reconciliation`] came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Remote records were merged in. The result must be persisted.
    Merged,
    /// The remote fetch failed; the local list is returned untouched.
    LocalOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: Vec<NotificationRecord>,
    pub outcome: ReconcileOutcome,
}

/// Id for a server record without `_id`, derived from its content so the
/// same record maps to the same id on every refresh.
fn content_id(raw: &RemoteNotification) -> String {
    let mut sha256 = Sha256::new();
    for field in [&raw.fecha, &raw.titulo, &raw.tipo, &raw.descripcion, &raw.mensaje] {
        match field {
            Some(value) => {
                sha256.update([1u8]);
                sha256.update(value.as_bytes());
                sha256.update([0u8]);
            }
            None => sha256.update([0u8]),
        }
    }
    let hash = sha256.finalize();
    format!("srv-{}", hex::encode(&hash[..8]))
}

/// Maps a raw server object onto a [`NotificationRecord`].
pub fn normalize(raw: RemoteNotification, now: DateTime<Utc>) -> NotificationRecord {
    let id = raw.id_text().unwrap_or_else(|| content_id(&raw));
    let kind = NotificationKind::from_tag(raw.tipo.as_deref());
    let link = match kind {
        NotificationKind::News => raw.noticia_id.or(raw.link_id),
        NotificationKind::Poll => raw.encuesta_id.or(raw.link_id),
        NotificationKind::Alert => None,
    };
    let description = raw
        .descripcion
        .filter(|d| !d.is_empty())
        .or(raw.mensaje.filter(|m| !m.is_empty()))
        .unwrap_or_else(|| NO_MESSAGE.to_string());

    let mut record = NotificationRecord::new(
        id,
        raw.titulo.filter(|t| !t.is_empty()).unwrap_or_else(|| UNTITLED.to_string()),
        description,
        raw.fecha.unwrap_or_else(|| format_instant(now)),
        kind,
        link.filter(|l| !l.is_empty()),
    );
    record.read = raw.leida.unwrap_or(false);
    record
}

/// Produces the deduplicated, most-recent-first view of `local` and
/// `remote`.
///
/// `remote = None` means the fetch failed, in which case `local` comes back
/// as is. Otherwise remote records dated before `cutoff` (or with no
/// parseable date) are dropped, and for repeated ids the first occurrence
/// wins, local records first. Records with an unparseable date sort last.
pub fn reconcile(
    local: Vec<NotificationRecord>,
    remote: Option<Vec<RemoteNotification>>,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Reconciliation {
    let Some(remote) = remote else {
        return Reconciliation {
            records: local,
            outcome: ReconcileOutcome::LocalOnly,
        };
    };

    let fresh = remote
        .into_iter()
        .map(|raw| normalize(raw, now))
        .filter(|record| match record.occurred_instant() {
            Some(instant) => instant >= cutoff,
            None => {
                log::debug!(
                    "Dropping remote notification {} with unreadable date {:?}",
                    record.id,
                    record.occurred_at
                );
                false
            }
        });

    let mut seen = HashSet::new();
    let mut records: Vec<NotificationRecord> = local
        .into_iter()
        .chain(fresh)
        .filter(|record| seen.insert(record.id.clone()))
        .collect();

    // stable: equal instants keep local-before-remote order
    records.sort_by(|a, b| b.occurred_instant().cmp(&a.occurred_instant()));

    Reconciliation {
        records,
        outcome: ReconcileOutcome::Merged,
    }
}
