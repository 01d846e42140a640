/// Severity of a transient, user-visible message.
///
/// Toasts report backend conditions (a failed sync, a bad configuration) to the
/// frontend. They are not persisted and are unrelated to
/// [`crate::notification::NotificationRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// A non-critical issue; the app keeps working with what it has.
    Warning,
    /// Something is misconfigured and a fallback is in effect.
    Error,
}

/// A toast payload intended for the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    /// The severity, determining its visual style.
    pub kind: ToastKind,
    /// The text content to display to the user.
    pub message: String,
}
