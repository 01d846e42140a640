use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of notification categories. Determines which screen a
/// notification links to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Links to a news article.
    News,
    /// Links to a poll.
    Poll,
    /// Informational only, no deep link. Also used for unknown tags.
    #[default]
    Alert,
}

impl NotificationKind {
    /// Resolves a free-text tag sent by the server or a push payload.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything unrecognized (or a missing tag) resolves to
    /// [`NotificationKind::Alert`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Self::Alert;
        };

        match tag.trim().to_lowercase().as_str() {
            "noticia" | "noticias" | "news" => Self::News,
            "encuesta" | "encuestas" | "poll" | "survey" => Self::Poll,
            "alerta" | "alert" | "" => Self::Alert,
            other => {
                log::debug!("Unknown notification tag {other:?}, treating it as an alert");
                Self::Alert
            }
        }
    }

    /// Whether records of this kind can carry a deep link.
    pub fn is_linkable(self) -> bool {
        matches!(self, Self::News | Self::Poll)
    }
}

/// A single notification as held by the backend and persisted on the
/// device.
///
/// At most one of `linked_news_id` and `linked_poll_id` is set, and only the
/// one matching `kind`. Use [`NotificationRecord::new`] to keep that
/// invariant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    /// ISO 8601 timestamp. Kept as text so that a malformed value survives a
    /// round trip through the store; see [`NotificationRecord::occurred_instant`].
    pub occurred_at: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_news_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_poll_id: Option<String>,
}

impl NotificationRecord {
    /// Creates an unread record. The `link` is stored in the field matching
    /// `kind` and discarded for alerts.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        occurred_at: impl Into<String>,
        kind: NotificationKind,
        link: Option<String>,
    ) -> Self {
        let (linked_news_id, linked_poll_id) = match kind {
            NotificationKind::News => (link, None),
            NotificationKind::Poll => (None, link),
            NotificationKind::Alert => (None, None),
        };

        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            occurred_at: occurred_at.into(),
            kind,
            read: false,
            linked_news_id,
            linked_poll_id,
        }
    }

    /// Identifier of the linked news article or poll, if any.
    pub fn link_target(&self) -> Option<&str> {
        match self.kind {
            NotificationKind::News => self.linked_news_id.as_deref(),
            NotificationKind::Poll => self.linked_poll_id.as_deref(),
            NotificationKind::Alert => None,
        }
    }

    /// Parsed `occurred_at`, or `None` when the text is not a valid instant.
    pub fn occurred_instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.occurred_at)
    }

    /// Marks the record as read. Returns `true` if the state changed.
    pub fn mark_read(&mut self) -> bool {
        let changed = !self.read;
        self.read = true;
        changed
    }
}

/// Parses the timestamp formats seen in the wild: full RFC 3339, a naive
/// date-time (assumed UTC), or a bare date (UTC midnight).
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats an instant the way records store it.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_resolve_case_insensitively() {
        assert_eq!(NotificationKind::from_tag(Some("Encuesta")), NotificationKind::Poll);
        assert_eq!(NotificationKind::from_tag(Some(" NOTICIA ")), NotificationKind::News);
        assert_eq!(NotificationKind::from_tag(Some("poll")), NotificationKind::Poll);
        assert_eq!(NotificationKind::from_tag(Some("evento")), NotificationKind::Alert);
        assert_eq!(NotificationKind::from_tag(None), NotificationKind::Alert);
    }

    #[test]
    fn link_lands_in_the_field_matching_the_kind() {
        let news = NotificationRecord::new("1", "t", "d", "2024-01-01", NotificationKind::News, Some("9".into()));
        assert_eq!(news.linked_news_id.as_deref(), Some("9"));
        assert_eq!(news.linked_poll_id, None);

        let poll = NotificationRecord::new("2", "t", "d", "2024-01-01", NotificationKind::Poll, Some("9".into()));
        assert_eq!(poll.linked_news_id, None);
        assert_eq!(poll.link_target(), Some("9"));

        let alert = NotificationRecord::new("3", "t", "d", "2024-01-01", NotificationKind::Alert, Some("9".into()));
        assert_eq!(alert.linked_news_id, None);
        assert_eq!(alert.linked_poll_id, None);
    }

    #[test]
    fn parses_common_timestamp_shapes() {
        let midnight = parse_instant("2024-01-01").expect("bare date");
        assert_eq!(format_instant(midnight), "2024-01-01T00:00:00.000Z");

        let offset = parse_instant("2024-01-01T06:00:00+06:00").expect("rfc3339");
        assert_eq!(offset, midnight);

        let naive = parse_instant("2024-01-01T00:00:00.000").expect("naive");
        assert_eq!(naive, midnight);

        assert_eq!(parse_instant("yesterday"), None);
        assert_eq!(parse_instant(""), None);
    }

    #[test]
    fn marking_read_is_idempotent() {
        let mut record = NotificationRecord::new("1", "t", "d", "2024-01-01", NotificationKind::Alert, None);
        assert!(record.mark_read());
        let once = record.clone();
        assert!(!record.mark_read());
        assert_eq!(record, once);
    }

    #[test]
    fn records_survive_a_json_round_trip_with_missing_optional_fields() {
        let json = r#"{"id":"1","title":"t","description":"d","occurred_at":"bad","kind":"poll","linked_poll_id":"7"}"#;
        let record: NotificationRecord = serde_json::from_str(json).expect("valid record");
        assert!(!record.read);
        assert_eq!(record.link_target(), Some("7"));
        assert_eq!(record.occurred_instant(), None);
    }
}
