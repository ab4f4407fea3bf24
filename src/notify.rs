//! Transient on-screen notifications.

use crate::constants::{NOTIFICATION_ID, NOTIFICATION_TEXT_SELECTOR};
use crate::dom::{lock, SharedDocument};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// CSS modifier class of the toast.
    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

/// Shows a single toast and hides it after a fixed duration.
///
/// Each call bumps a generation counter; a pending hide only applies if no
/// newer notification has been shown since, so a quick second message is
/// not cut short by the first one's timer.
#[derive(Clone)]
pub struct Notifier {
    document: SharedDocument,
    duration: Duration,
    generation: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new(document: SharedDocument, duration: Duration) -> Self {
        Self {
            document,
            duration,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn show(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Error => tracing::warn!(kind = %kind, "{}", message),
            _ => tracing::info!(kind = %kind, "{}", message),
        }

        {
            let mut doc = lock(&self.document);
            if !doc.contains(NOTIFICATION_ID) || !doc.contains(NOTIFICATION_TEXT_SELECTOR) {
                return;
            }
            doc.set_text(NOTIFICATION_TEXT_SELECTOR, message);
            if let Some(toast) = doc.get_mut(NOTIFICATION_ID) {
                toast.set_class_name(&format!("notification {}", kind));
                toast.add_class("show");
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime, notification stays visible");
            return;
        };
        let notifier = self.clone();
        runtime.spawn(async move {
            tokio::time::sleep(notifier.duration).await;
            notifier.hide_if_current(generation);
        });
    }

    pub fn info(&self, message: &str) {
        self.show(message, NotificationKind::Info);
    }

    pub fn success(&self, message: &str) {
        self.show(message, NotificationKind::Success);
    }

    pub fn warning(&self, message: &str) {
        self.show(message, NotificationKind::Warning);
    }

    pub fn error(&self, message: &str) {
        self.show(message, NotificationKind::Error);
    }

    fn hide_if_current(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        if let Some(toast) = lock(&self.document).get_mut(NOTIFICATION_ID) {
            toast.remove_class("show");
        }
    }
}
