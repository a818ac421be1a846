//! Local reminder notifications.
//!
//! # Responsibility
//! - Define the notification service seam used by the habit editor.
//! - Define trigger/content/request shapes handed to the platform.
//! - Translate habit reminder settings into weekly triggers (`scheduler`).
//! - Provide a SQLite outbox implementation drained by the host (`outbox`).
//!
//! # Invariants
//! - Triggers always repeat weekly at a fixed hour and minute.
//! - Every submitted request carries a fresh, unique identifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod outbox;
pub mod scheduler;

/// Title used for every habit reminder.
pub const REMINDER_TITLE: &str = "Habit Reminder";
/// Platform sound name for reminders.
pub const DEFAULT_SOUND: &str = "default";

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Notification service failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The platform refused notification authorization.
    PermissionDenied,
    /// The platform rejected one submission.
    SubmitFailed(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::SubmitFailed(message) => write!(f, "notification submit failed: {message}"),
        }
    }
}

impl Error for NotifyError {}

/// Calendar trigger matching one weekday at a fixed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTrigger {
    /// 1-based Gregorian weekday, Sunday = 1.
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub repeats: bool,
}

/// User-visible notification body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub subtitle: String,
    pub sound: String,
}

impl NotificationContent {
    /// Standard reminder content with the habit's reminder text as subtitle.
    pub fn reminder(reminder_text: &str) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            subtitle: reminder_text.to_string(),
            sound: DEFAULT_SOUND.to_string(),
        }
    }
}

/// One scheduled job submitted to the platform queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: WeeklyTrigger,
}

/// Platform notification service contract.
///
/// Calls are awaited one at a time from the editor task, so implementations
/// may hold non-`Send` handles such as a borrowed SQLite connection.
#[async_trait(?Send)]
pub trait NotificationService {
    /// Asks the platform for alert/sound authorization.
    async fn request_authorization(&self) -> NotifyResult<bool>;

    /// Queues one request. Returns once the platform acknowledged it.
    async fn submit(&self, request: &NotificationRequest) -> NotifyResult<()>;
}

#[async_trait(?Send)]
impl<N: NotificationService + ?Sized> NotificationService for &N {
    async fn request_authorization(&self) -> NotifyResult<bool> {
        (**self).request_authorization().await
    }

    async fn submit(&self, request: &NotificationRequest) -> NotifyResult<()> {
        (**self).submit(request).await
    }
}
