//! Habit editor use-case service.
//!
//! # Responsibility
//! - Own the draft of the habit form and the habit being edited.
//! - Track notification permission for the reminder toggle.
//! - Commit drafts: schedule reminders first, then insert or replace the
//!   record; remove edited records.
//!
//! # Invariants
//! - A failed commit leaves the draft and the store untouched. Reminder jobs
//!   accepted before a scheduling failure stay queued.
//! - Nothing is persisted when notification permission is denied.
//! - Replacing a habit keeps its id and `date_added`.
//! - Deleting or replacing a habit does not cancel its scheduled jobs.

use crate::model::draft::{DraftEdit, HabitDraft};
use crate::model::habit::Habit;
use crate::notify::scheduler::schedule_notifications;
use crate::notify::{NotificationService, NotifyError};
use crate::repo::habit_repo::{HabitRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Platform notification permission as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl NotificationPermission {
    /// Whether the UI should offer the reminder toggle.
    pub fn allows_reminders(self) -> bool {
        self == Self::Granted
    }
}

/// Commit/remove failure.
#[derive(Debug)]
pub enum CommitError {
    /// Draft is missing a title, a weekday or reminder text.
    Incomplete,
    /// `remove` was called while no habit is loaded for editing.
    NotEditing,
    /// Permission refused or a reminder submission failed.
    Notify(NotifyError),
    /// The record store rejected the write.
    Store(RepoError),
}

impl Display for CommitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete => write!(f, "habit draft is incomplete"),
            Self::NotEditing => write!(f, "no habit is loaded for editing"),
            Self::Notify(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Notify(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Incomplete | Self::NotEditing => None,
        }
    }
}

impl From<NotifyError> for CommitError {
    fn from(value: NotifyError) -> Self {
        Self::Notify(value)
    }
}

impl From<RepoError> for CommitError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Editor session over one record store and one notification service.
pub struct HabitEditor<R: HabitRepository, N: NotificationService> {
    repo: R,
    notifier: N,
    draft: HabitDraft,
    editing: Option<Habit>,
    permission: NotificationPermission,
}

impl<R: HabitRepository, N: NotificationService> HabitEditor<R, N> {
    /// Creates an editor with an empty draft and unknown permission.
    pub fn new(repo: R, notifier: N) -> Self {
        Self {
            repo,
            notifier,
            draft: HabitDraft::default(),
            editing: None,
            permission: NotificationPermission::Unknown,
        }
    }

    /// Seeds the permission state, e.g. from a value the host cached.
    pub fn with_permission(mut self, permission: NotificationPermission) -> Self {
        self.permission = permission;
        self
    }

    /// Read-only snapshot of the draft.
    pub fn draft(&self) -> &HabitDraft {
        &self.draft
    }

    /// Habit currently loaded for editing, if any.
    pub fn editing(&self) -> Option<&Habit> {
        self.editing.as_ref()
    }

    pub fn notification_permission(&self) -> NotificationPermission {
        self.permission
    }

    /// Applies one field edit to the draft.
    pub fn apply_edit(&mut self, edit: DraftEdit) {
        self.draft.apply(edit);
    }

    /// Whether the commit action should be enabled.
    pub fn is_complete(&self) -> bool {
        self.draft.is_complete()
    }

    /// Asks the notification service for authorization and records the
    /// answer. Service errors count as a denial.
    pub async fn request_notification_access(&mut self) -> NotificationPermission {
        self.permission = match self.notifier.request_authorization().await {
            Ok(true) => NotificationPermission::Granted,
            Ok(false) => NotificationPermission::Denied,
            Err(err) => {
                warn!("event=notify_auth module=editor status=error error={err}");
                NotificationPermission::Denied
            }
        };
        info!(
            "event=notify_auth module=editor status=ok permission={:?}",
            self.permission
        );
        self.permission
    }

    /// Copies an existing habit into the draft and marks it as edited.
    pub fn load_for_edit(&mut self, habit: Habit) {
        self.draft = HabitDraft::from_habit(&habit);
        self.editing = Some(habit);
    }

    /// Clears the draft to defaults and leaves edit mode.
    pub fn reset_draft(&mut self) {
        self.draft.reset();
        self.editing = None;
    }

    /// Lists stored habits, newest first.
    pub fn habits(&self) -> RepoResult<Vec<Habit>> {
        self.repo.list_habits()
    }

    /// Schedules reminders (when enabled) and persists the draft.
    ///
    /// Inserts a new habit, or replaces the one loaded by `load_for_edit`.
    /// The draft is kept on every outcome; callers reset it after success.
    /// After success the saved habit becomes the edited one, so a repeated
    /// commit replaces it instead of inserting a duplicate.
    ///
    /// # Errors
    /// - `Incomplete` when the draft fails validation; nothing is attempted.
    /// - `Notify` when permission is denied or a submission fails; nothing
    ///   is persisted.
    /// - `Store` when the write fails.
    pub async fn commit(&mut self) -> Result<Habit, CommitError> {
        if !self.draft.is_complete() {
            return Err(CommitError::Incomplete);
        }

        let mut habit = match &self.editing {
            Some(existing) => existing.clone(),
            None => Habit::new(String::new(), self.draft.color, Vec::new()),
        };
        self.draft.write_into(&mut habit);
        habit.notification_ids = Vec::new();

        if self.draft.is_reminder_on {
            self.ensure_permission().await?;
            habit.notification_ids = schedule_notifications(&self.draft, &self.notifier)
                .await
                .map_err(|err| {
                    warn!("event=habit_commit module=editor status=error stage=notify error={err}");
                    err
                })?;
        }

        let write = if self.editing.is_some() {
            self.repo.replace_habit(&habit)
        } else {
            self.repo.create_habit(&habit).map(|_| ())
        };
        if let Err(err) = write {
            warn!("event=habit_commit module=editor status=error stage=store error={err}");
            return Err(err.into());
        }

        info!(
            "event=habit_commit module=editor status=ok mode={} week_days={} reminders={}",
            if self.editing.is_some() { "replace" } else { "insert" },
            habit.week_days.len(),
            habit.notification_ids.len()
        );
        self.editing = Some(habit.clone());
        Ok(habit)
    }

    /// Deletes the habit loaded for editing.
    ///
    /// Returns `false` when the record was already gone. Scheduled reminder
    /// jobs of the habit are left queued.
    ///
    /// # Errors
    /// - `NotEditing` when no habit is loaded.
    /// - `Store` when the delete fails.
    pub fn remove(&mut self) -> Result<bool, CommitError> {
        let Some(habit) = self.editing.as_ref() else {
            return Err(CommitError::NotEditing);
        };

        let deleted = self.repo.delete_habit(habit.id)?;
        info!(
            "event=habit_remove module=editor status=ok deleted={deleted} orphaned_reminders={}",
            habit.notification_ids.len()
        );
        self.editing = None;
        Ok(deleted)
    }

    async fn ensure_permission(&mut self) -> Result<(), NotifyError> {
        if self.permission != NotificationPermission::Granted {
            self.request_notification_access().await;
        }
        if self.permission.allows_reminders() {
            Ok(())
        } else {
            warn!("event=habit_commit module=editor status=error stage=notify error=permission_denied");
            Err(NotifyError::PermissionDenied)
        }
    }
}
