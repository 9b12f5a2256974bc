//! User-facing notifications for failed API calls.
//!
//! `Api` never renders anything itself: it turns an [`ApiError`] into at most
//! one [`Notification`] and hands it to whatever [`Notifier`] the host
//! attached. Errors that map to no notification are only logged.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::ApiError;

/// Text shown for a 500 response without a usable detail message.
pub const SERVER_ERROR_MESSAGE: &str = "Ошибка сервера";

/// How long a toast stays on screen before closing itself.
pub const AUTO_CLOSE: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub position: ToastPosition,
    pub auto_close: Duration,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            position: ToastPosition::BottomRight,
            auto_close: AUTO_CLOSE,
        }
    }
}

/// The notification a failed call should raise, if any.
///
/// Structured backend errors surface their message, bare 500s surface
/// [`SERVER_ERROR_MESSAGE`], everything else stays silent.
pub fn notification_for(error: &ApiError) -> Option<Notification> {
    error.user_message().map(Notification::error)
}

/// Sink for notifications raised by `Api`.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the `tracing` log instead of a screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::error!(
            kind = ?notification.kind,
            position = ?notification.position,
            "{}",
            notification.message
        );
    }
}

/// Keeps notifications in memory until the host drains them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    queue: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every notification recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpResponse;

    fn failure(status: u16, body: &str) -> ApiError {
        ApiError::from_response(&HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    #[test]
    fn backend_detail_surfaces_its_message() {
        let n = notification_for(&failure(422, r#"{"detail":[{"msg":"Invalid phone"}]}"#)).unwrap();
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.message, "Invalid phone");
        assert_eq!(n.position, ToastPosition::BottomRight);
        assert_eq!(n.auto_close, Duration::from_millis(3000));
    }

    #[test]
    fn bare_500_surfaces_generic_text() {
        let n = notification_for(&failure(500, "<html>oops</html>")).unwrap();
        assert_eq!(n.message, SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn other_failures_stay_silent() {
        assert!(notification_for(&failure(404, r#"{"error":"gone"}"#)).is_none());
        assert!(notification_for(&failure(403, r#"{"detail":"Доступ запрещён"}"#)).is_none());
        assert!(notification_for(&ApiError::Transport(TransportError("refused".into()))).is_none());
        assert!(notification_for(&ApiError::Deserialization("eof".into())).is_none());
    }

    #[test]
    fn recording_notifier_drains_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::error("first"));
        notifier.notify(Notification::error("second"));
        assert_eq!(notifier.len(), 2);

        let drained = notifier.drain();
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].message, "second");
        assert!(notifier.is_empty());
    }

    #[test]
    fn recording_notifier_survives_a_poisoned_queue() {
        let notifier = std::sync::Arc::new(RecordingNotifier::new());
        notifier.notify(Notification::error("before"));
        let holder = notifier.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = holder.queue.lock();
            panic!("holder died mid-push");
        })
        .join();
        assert!(outcome.is_err());
        assert!(notifier.queue.is_poisoned());

        notifier.notify(Notification::error("after"));
        assert_eq!(notifier.len(), 2);
        let drained = notifier.drain();
        assert_eq!(drained[1].message, "after");
        assert!(notifier.is_empty());
    }
}
