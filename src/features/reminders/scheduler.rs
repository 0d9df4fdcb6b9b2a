//! # Reminder Scheduler
//!
//! Minute-aligned delivery sweep. Each sweep takes one `now` snapshot,
//! delivers every reminder due at that minute (and, when enabled, every
//! reminder whose minute already passed), and deletes each one right after
//! its send succeeds. A failed send is logged and the reminder stays stored.
//! Overdue reminders are only retried within [`OVERDUE_RETRY_HOURS`] of
//! their minute; older ones are reported once and left in the store.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Stop retrying overdue reminders after a retry window
//! - 1.0.0: Initial release

use anyhow::Result;
use chrono::{Local, NaiveDateTime, Timelike};
use dashmap::DashSet;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use super::model::{truncate_to_minute, Reminder, ReminderId, DUE_AT_FORMAT};
use super::store::ReminderStore;
use crate::core::{SEND_TIMEOUT, SWEEP_INTERVAL};
use crate::gateway::ChatGateway;

/// Slack added after a minute boundary so the wall clock has surely crossed it
const BOUNDARY_MARGIN: Duration = Duration::from_millis(100);

/// How long after its minute an overdue reminder keeps being retried
pub const OVERDUE_RETRY_HOURS: i64 = 24;

/// Outcome of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub delivered: usize,
    pub failed: usize,
    /// Overdue reminders past the retry window, left undelivered
    pub stale: usize,
    /// Another sweep was already running; nothing was done
    pub skipped: bool,
}

impl SweepReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delivered == 0 && self.failed == 0
    }
}

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    gateway: Arc<dyn ChatGateway>,
    deliver_overdue: bool,
    send_timeout: Duration,
    retry_window: chrono::Duration,
    /// Stale reminders already reported, so each is logged once
    abandoned: DashSet<ReminderId>,
    sweeping: AtomicBool,
}

/// Clears the in-progress flag when a sweep ends, however it ends
struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        gateway: Arc<dyn ChatGateway>,
        deliver_overdue: bool,
    ) -> Self {
        Self {
            store,
            gateway,
            deliver_overdue,
            send_timeout: SEND_TIMEOUT,
            retry_window: chrono::Duration::hours(OVERDUE_RETRY_HOURS),
            abandoned: DashSet::new(),
            sweeping: AtomicBool::new(false),
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn with_retry_window(mut self, retry_window: chrono::Duration) -> Self {
        self.retry_window = retry_window;
        self
    }

    /// Sweep forever: once at startup, then right after every minute boundary
    pub async fn run(self: Arc<Self>) {
        info!(
            "⏰ Reminder scheduler started (overdue delivery {})",
            if self.deliver_overdue { "on" } else { "off" }
        );

        loop {
            self.sweep_and_log().await;
            sleep(until_next_minute(Local::now().naive_local())).await;
        }
    }

    async fn sweep_and_log(&self) {
        match self.sweep().await {
            Ok(report) if report.skipped => {}
            Ok(report) if report.is_empty() => debug!("Sweep found nothing to deliver"),
            Ok(report) => info!(
                "📬 Sweep done: {} delivered, {} failed",
                report.delivered, report.failed
            ),
            Err(e) => error!("Reminder sweep failed: {e:#}"),
        }
    }

    /// Sweep for the current local minute
    pub async fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(Local::now().naive_local()).await
    }

    /// Sweep as if the clock read `now`
    ///
    /// Returns `Err` only if the store lookup fails; delivery failures are
    /// counted in the report.
    pub async fn sweep_at(&self, now: NaiveDateTime) -> Result<SweepReport> {
        if self
            .sweeping
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Previous reminder sweep still running, skipping this one");
            return Ok(SweepReport::skipped());
        }
        let _guard = SweepGuard(&self.sweeping);

        let now = truncate_to_minute(now);
        let mut report = SweepReport::default();

        let due = self.store.find_due(now).await?;
        debug!(
            "Sweep at {}: {} reminder(s) due",
            now.format(DUE_AT_FORMAT),
            due.len()
        );
        self.deliver_batch(due, &mut report).await;

        if self.deliver_overdue {
            let oldest_retried = now - self.retry_window;
            let (overdue, stale): (Vec<_>, Vec<_>) = self
                .store
                .find_overdue(now)
                .await?
                .into_iter()
                .partition(|r| r.due_at() >= oldest_retried);

            report.stale = stale.len();
            for reminder in &stale {
                if let Some(id) = reminder.id() {
                    if self.abandoned.insert(id) {
                        warn!(
                            "Giving up on reminder {reminder}: undelivered for over {} min, left in store",
                            self.retry_window.num_minutes()
                        );
                    }
                }
            }

            if !overdue.is_empty() {
                info!("Retrying {} overdue reminder(s)", overdue.len());
            }
            self.deliver_batch(overdue, &mut report).await;
        }

        Ok(report)
    }

    async fn deliver_batch(&self, reminders: Vec<Reminder>, report: &mut SweepReport) {
        for reminder in reminders {
            if self.deliver(&reminder).await {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
    }

    /// Send one reminder, then delete it. Returns whether the send succeeded.
    async fn deliver(&self, reminder: &Reminder) -> bool {
        let sent = timeout(
            self.send_timeout,
            self.gateway.send(reminder.chat_id(), reminder.body()),
        )
        .await;

        match sent {
            Ok(Ok(())) => {
                info!("Notification sent for reminder {reminder}");
                if let Err(e) = self.store.delete(reminder).await {
                    // Delivered, but it will be delivered again next sweep
                    error!("Failed to delete delivered reminder {reminder}: {e:#}");
                }
                true
            }
            Ok(Err(e)) => {
                error!("Failed to send reminder {reminder}: {e:#}");
                false
            }
            Err(_) => {
                error!(
                    "Sending reminder {reminder} timed out after {:?}",
                    self.send_timeout
                );
                false
            }
        }
    }
}

/// Time left until just after the next wall-clock minute boundary
fn until_next_minute(now: NaiveDateTime) -> Duration {
    let into_minute = Duration::from_secs(u64::from(now.second()))
        + Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));
    SWEEP_INTERVAL.saturating_sub(into_minute) + BOUNDARY_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::store::MemoryReminderStore;
    use crate::gateway::testing::RecordingGateway;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    async fn seed(
        store: &MemoryReminderStore,
        chat_id: i64,
        due: NaiveDateTime,
        body: &str,
    ) -> Reminder {
        store
            .save(Reminder::new(chat_id, due, body).unwrap())
            .await
            .unwrap()
    }

    fn scheduler(
        store: &Arc<MemoryReminderStore>,
        gateway: &Arc<RecordingGateway>,
        deliver_overdue: bool,
    ) -> ReminderScheduler {
        ReminderScheduler::new(store.clone(), gateway.clone(), deliver_overdue)
    }

    #[tokio::test]
    async fn test_sweep_delivers_and_deletes_due_reminder() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let saved = seed(&store, 42, at(9, 0), "Buy milk").await;

        let report = scheduler(&store, &gateway, false)
            .sweep_at(at(9, 0) + chrono::Duration::seconds(30))
            .await
            .unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(gateway.sent_to(42), vec!["Buy milk".to_string()]);
        assert!(!store.contains(saved.id().unwrap()));
    }

    #[tokio::test]
    async fn test_sweep_ignores_other_minutes() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        seed(&store, 1, at(9, 1), "future").await;
        seed(&store, 1, at(8, 59), "past").await;

        let report = scheduler(&store, &gateway, false)
            .sweep_at(at(9, 0))
            .await
            .unwrap();

        assert!(report.is_empty());
        assert!(gateway.sent().is_empty());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_isolated() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::failing_for(&[2]));
        let a = seed(&store, 1, at(9, 0), "one").await;
        let b = seed(&store, 2, at(9, 0), "two").await;
        let c = seed(&store, 3, at(9, 0), "three").await;

        let report = scheduler(&store, &gateway, false)
            .sweep_at(at(9, 0))
            .await
            .unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert!(!store.contains(a.id().unwrap()));
        assert!(store.contains(b.id().unwrap()));
        assert!(!store.contains(c.id().unwrap()));
        assert_eq!(gateway.sent_to(1), vec!["one".to_string()]);
        assert_eq!(gateway.sent_to(3), vec!["three".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_reminder_retried_next_minute_when_overdue_enabled() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::failing_for(&[7]));
        let saved = seed(&store, 7, at(9, 0), "retry me").await;
        let scheduler = scheduler(&store, &gateway, true);

        let first = scheduler.sweep_at(at(9, 0)).await.unwrap();
        assert_eq!(first.failed, 1);
        assert!(store.contains(saved.id().unwrap()));

        gateway.recover(7);
        let second = scheduler.sweep_at(at(9, 1)).await.unwrap();
        assert_eq!(second.delivered, 1);
        assert_eq!(gateway.sent_to(7), vec!["retry me".to_string()]);
        assert!(!store.contains(saved.id().unwrap()));
    }

    #[tokio::test]
    async fn test_missed_minute_stranded_when_overdue_disabled() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        seed(&store, 7, at(9, 0), "missed").await;

        let report = scheduler(&store, &gateway, false)
            .sweep_at(at(9, 1))
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_overdue_retries_stop_after_window() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::failing_for(&[-1]));
        let saved = seed(&store, -1, at(9, 0), "unreachable").await;
        let scheduler = scheduler(&store, &gateway, true)
            .with_retry_window(chrono::Duration::minutes(5));

        let mut failed = 0;
        let mut stale_sweeps = 0;
        for minute in 0..=10 {
            let report = scheduler.sweep_at(at(9, minute)).await.unwrap();
            failed += report.failed;
            stale_sweeps += report.stale;
        }

        // 09:00 through 09:05 attempt delivery, 09:06 through 09:10 do not
        assert_eq!(failed, 6);
        assert_eq!(stale_sweeps, 5);
        assert!(store.contains(saved.id().unwrap()));
        assert_eq!(scheduler.abandoned.len(), 1);
    }

    #[tokio::test]
    async fn test_default_retry_window_is_a_day() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        seed(&store, 1, at(9, 0), "yesterday").await;
        let now = at(9, 0) + chrono::Duration::hours(OVERDUE_RETRY_HOURS);

        let report = scheduler(&store, &gateway, true).sweep_at(now).await.unwrap();
        assert_eq!(report.delivered, 1);

        seed(&store, 1, at(8, 59), "too old").await;
        let report = scheduler(&store, &gateway, true).sweep_at(now).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(report.stale, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_overdue_delivered_after_due() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        seed(&store, 1, at(8, 0), "old").await;
        seed(&store, 1, at(9, 0), "now").await;
        seed(&store, 1, at(7, 0), "older").await;

        let report = scheduler(&store, &gateway, true)
            .sweep_at(at(9, 0))
            .await
            .unwrap();

        assert_eq!(report.delivered, 3);
        assert_eq!(
            gateway.sent_to(1),
            vec!["now".to_string(), "older".to_string(), "old".to_string()]
        );
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_send_timeout_counts_as_failure() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::with_delay(Duration::from_millis(200)));
        let saved = seed(&store, 1, at(9, 0), "slow").await;

        let report = ReminderScheduler::new(store.clone(), gateway.clone(), false)
            .with_send_timeout(Duration::from_millis(20))
            .sweep_at(at(9, 0))
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert!(store.contains(saved.id().unwrap()));
    }

    #[tokio::test]
    async fn test_overlapping_sweep_is_skipped() {
        let store = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(RecordingGateway::with_delay(Duration::from_millis(50)));
        seed(&store, 1, at(9, 0), "once").await;
        let scheduler = scheduler(&store, &gateway, false);

        let (first, second) = tokio::join!(
            scheduler.sweep_at(at(9, 0)),
            scheduler.sweep_at(at(9, 0))
        );

        assert_eq!(first.unwrap().delivered, 1);
        assert!(second.unwrap().skipped);
        assert_eq!(gateway.sent().len(), 1);

        // Guard released once the sweep finished
        let third = scheduler.sweep_at(at(9, 0)).await.unwrap();
        assert!(!third.skipped);
    }

    #[test]
    fn test_until_next_minute() {
        let now = at(9, 0) + chrono::Duration::milliseconds(45_500);
        assert_eq!(
            until_next_minute(now),
            Duration::from_millis(14_500) + BOUNDARY_MARGIN
        );
        assert_eq!(until_next_minute(at(9, 0)), SWEEP_INTERVAL + BOUNDARY_MARGIN);
    }
}
