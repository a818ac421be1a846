//! SQLite-backed notification outbox.
//!
//! # Responsibility
//! - Accept reminder requests on behalf of the host platform.
//! - Hand queued requests to the host in submission order.
//!
//! # Invariants
//! - `identifier` is unique across the outbox; duplicates fail submission.
//! - `drain` removes exactly the requests it returns.

use super::{
    NotificationContent, NotificationRequest, NotificationService, NotifyError, NotifyResult,
    WeeklyTrigger,
};
use crate::db::DbResult;
use async_trait::async_trait;
use log::{info, warn};
use rusqlite::{params, Connection, Row};

const OUTBOX_SELECT_SQL: &str = "SELECT
    identifier,
    title,
    subtitle,
    sound,
    weekday,
    hour,
    minute,
    repeats
FROM notification_outbox
ORDER BY queued_at ASC, rowid ASC";

/// Notification service that queues requests in `notification_outbox`.
///
/// `authorized` mirrors the platform permission answer supplied by the host.
pub struct SqliteNotificationOutbox<'conn> {
    conn: &'conn Connection,
    authorized: bool,
}

impl<'conn> SqliteNotificationOutbox<'conn> {
    pub fn new(conn: &'conn Connection, authorized: bool) -> Self {
        Self { conn, authorized }
    }

    /// Lists queued requests, oldest first, without removing them.
    pub fn pending(&self) -> DbResult<Vec<NotificationRequest>> {
        let mut stmt = self.conn.prepare(OUTBOX_SELECT_SQL)?;
        let requests = stmt
            .query_map([], parse_request_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    /// Returns and removes every queued request in one transaction.
    pub fn drain(&self) -> DbResult<Vec<NotificationRequest>> {
        let tx = self.conn.unchecked_transaction()?;
        let requests = {
            let mut stmt = tx.prepare(OUTBOX_SELECT_SQL)?;
            let rows = stmt.query_map([], parse_request_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        tx.execute("DELETE FROM notification_outbox;", [])?;
        tx.commit()?;

        info!(
            "event=outbox_drain module=notify status=ok count={}",
            requests.len()
        );
        Ok(requests)
    }
}

#[async_trait(?Send)]
impl NotificationService for SqliteNotificationOutbox<'_> {
    async fn request_authorization(&self) -> NotifyResult<bool> {
        Ok(self.authorized)
    }

    async fn submit(&self, request: &NotificationRequest) -> NotifyResult<()> {
        if !self.authorized {
            return Err(NotifyError::PermissionDenied);
        }

        self.conn
            .execute(
                "INSERT INTO notification_outbox (
                    identifier,
                    title,
                    subtitle,
                    sound,
                    weekday,
                    hour,
                    minute,
                    repeats,
                    queued_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, (strftime('%s', 'now') * 1000));",
                params![
                    request.identifier.as_str(),
                    request.content.title.as_str(),
                    request.content.subtitle.as_str(),
                    request.content.sound.as_str(),
                    request.trigger.weekday,
                    request.trigger.hour,
                    request.trigger.minute,
                    request.trigger.repeats,
                ],
            )
            .map_err(|err| {
                warn!("event=outbox_submit module=notify status=error error={err}");
                NotifyError::SubmitFailed(err.to_string())
            })?;

        Ok(())
    }
}

fn parse_request_row(row: &Row<'_>) -> rusqlite::Result<NotificationRequest> {
    Ok(NotificationRequest {
        identifier: row.get("identifier")?,
        content: NotificationContent {
            title: row.get("title")?,
            subtitle: row.get("subtitle")?,
            sound: row.get("sound")?,
        },
        trigger: WeeklyTrigger {
            weekday: row.get("weekday")?,
            hour: row.get("hour")?,
            minute: row.get("minute")?,
            repeats: row.get("repeats")?,
        },
    })
}
