//! User-visible notices for mutation outcomes

use tokio::sync::broadcast;

use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Kinds of catalog mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn success_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Book added successfully!",
            MutationKind::Update => "Book updated successfully!",
            MutationKind::Delete => "Book deleted successfully!",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Failed to add book. Please try again.",
            MutationKind::Update => "Failed to update book. Please try again.",
            MutationKind::Delete => "Failed to delete book. Please try again.",
        }
    }
}

/// Broadcast channel carrying notices to whoever renders them.
///
/// Sending never fails from the caller's point of view: with no subscriber
/// the notice is dropped.
#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn success(&self, kind: MutationKind) {
        self.send(NoticeLevel::Success, kind.success_message().to_string());
    }

    /// Report a failed mutation attempt
    pub fn failure(&self, kind: MutationKind, error: &AppError) {
        let message = match error.kind() {
            ErrorKind::NotFound => "This book no longer exists.".to_string(),
            ErrorKind::Validation => match error {
                AppError::Validation(msg) | AppError::BadRequest(msg) if !msg.is_empty() => {
                    msg.clone()
                }
                _ => kind.failure_message().to_string(),
            },
            ErrorKind::IoFailure => kind.failure_message().to_string(),
        };
        self.send(NoticeLevel::Error, message);
    }

    fn send(&self, level: NoticeLevel, message: String) {
        let _ = self.sender.send(Notice { level, message });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(32)
    }
}
