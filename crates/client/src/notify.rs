//! Transient, non-blocking user notices.
//!
//! Stores and coordinators push notices for recoverable errors (and a few
//! mutation successes); the UI layer drains the receiver and renders toasts.
//! Nothing here blocks: the channel is unbounded and a dropped receiver is
//! silently tolerated, so a headless embedding can ignore notices entirely.

use tokio::sync::mpsc;

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Receiving half; drained by the UI layer.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Create a notice channel.
#[must_use]
pub fn channel() -> (NoticeSender, NoticeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NoticeSender { tx }, rx)
}

/// Cloneable sending half handed to stores and coordinators.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSender {
    /// A sender whose notices go nowhere, for embeddings without a UI.
    #[must_use]
    pub fn sink() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message.into());
    }

    fn push(&self, level: NoticeLevel, message: String) {
        // A closed receiver just means nobody is rendering toasts.
        let _ = self.tx.send(Notice { level, message });
    }
}
