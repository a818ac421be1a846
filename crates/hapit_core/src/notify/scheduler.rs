//! Weekly reminder scheduling.
//!
//! One repeating trigger is submitted per active weekday, sequentially.
//! A failed submission aborts the loop; triggers already accepted by the
//! platform are left in place.

use super::{
    NotificationContent, NotificationRequest, NotificationService, NotifyResult, WeeklyTrigger,
};
use crate::calendar::weekday_position;
use crate::model::draft::HabitDraft;
use chrono::Timelike;
use log::{debug, warn};
use uuid::Uuid;

/// Builds the repeating trigger for one weekday name.
///
/// Returns `None` for names outside the weekday vocabulary.
pub fn weekly_trigger(week_day: &str, draft: &HabitDraft) -> Option<WeeklyTrigger> {
    let weekday = weekday_position(week_day)?;
    Some(WeeklyTrigger {
        weekday,
        hour: draft.reminder_time.hour() as u8,
        minute: draft.reminder_time.minute() as u8,
        repeats: true,
    })
}

/// Submits one trigger per draft weekday and returns the collected ids in
/// weekday order.
///
/// Unknown weekday names are skipped.
///
/// # Errors
/// Returns the first submission error. Earlier submissions are not rolled
/// back and no id list is returned.
pub async fn schedule_notifications<N>(
    draft: &HabitDraft,
    notifier: &N,
) -> NotifyResult<Vec<String>>
where
    N: NotificationService + ?Sized,
{
    let content = NotificationContent::reminder(&draft.reminder_text);
    let mut notification_ids = Vec::with_capacity(draft.week_days.len());

    for week_day in &draft.week_days {
        let Some(trigger) = weekly_trigger(week_day, draft) else {
            debug!("event=notify_schedule module=notify status=skipped reason=unknown_weekday");
            continue;
        };

        let request = NotificationRequest {
            identifier: Uuid::new_v4().to_string(),
            content: content.clone(),
            trigger,
        };

        if let Err(err) = notifier.submit(&request).await {
            warn!(
                "event=notify_schedule module=notify status=error submitted={} weekday={} error={err}",
                notification_ids.len(),
                trigger.weekday
            );
            return Err(err);
        }
        notification_ids.push(request.identifier);
    }

    debug!(
        "event=notify_schedule module=notify status=ok scheduled={}",
        notification_ids.len()
    );
    Ok(notification_ids)
}
