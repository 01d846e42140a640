use serde::{Deserialize, Serialize};

use crate::notification::NotificationKind;

/// Content of a push notification as delivered by the platform.
///
/// Every field is optional; absent values degrade to placeholders where the
/// backend needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: PushData,
}

/// Custom data attached to a push notification by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushData {
    /// Free-text category, e.g. `"encuesta"` or `"noticia"`.
    #[serde(default, alias = "type")]
    pub tipo: Option<String>,
    /// Generic identifier: either the notification id or the linked target.
    #[serde(default, deserialize_with = "crate::lenient::id")]
    pub id: Option<String>,
    #[serde(default, rename = "noticiaId", deserialize_with = "crate::lenient::id")]
    pub noticia_id: Option<String>,
    #[serde(default, rename = "encuestaId", deserialize_with = "crate::lenient::id")]
    pub encuesta_id: Option<String>,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
}

impl PushData {
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::from_tag(self.tipo.as_deref())
    }

    /// The identifier of the article or poll this push links to, preferring
    /// the kind-specific field over the generic `id`.
    pub fn linked_id(&self) -> Option<&str> {
        let specific = match self.kind() {
            NotificationKind::News => self.noticia_id.as_deref(),
            NotificationKind::Poll => self.encuesta_id.as_deref(),
            NotificationKind::Alert => return None,
        };
        specific.or(self.id.as_deref()).filter(|id| !id.is_empty())
    }

    /// `false` when the payload carries neither a category nor any
    /// identifier. Such pushes are informational only.
    pub fn has_routing_info(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        present(&self.tipo) || present(&self.id) || present(&self.noticia_id) || present(&self.encuesta_id)
    }
}
