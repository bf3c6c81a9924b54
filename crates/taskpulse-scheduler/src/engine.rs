use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use taskpulse_channels::{dispatch, Delivery, NotificationSender};
use taskpulse_core::{ReminderThreshold, TaskId};
use taskpulse_tasks::reminders::{commit_reminder_flags, due_for_reminder};
use taskpulse_tasks::ReminderCandidate;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::{
    error::{Result, SchedulerError},
    types::{CycleReport, ReminderSettings, ThresholdReport},
};

/// Periodic deadline reminder job.
///
/// Owns its own `Connection` so its polling never contends with the HTTP
/// handlers' connection lock; SQLite (WAL + busy timeout) arbitrates between
/// the two writers.
pub struct ReminderEngine {
    conn: Connection,
    sender: Arc<dyn NotificationSender>,
    settings: ReminderSettings,
}

impl ReminderEngine {
    /// `conn` must point at a database whose users and tasks schema is
    /// already initialised.
    pub fn new(
        conn: Connection,
        sender: Arc<dyn NotificationSender>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            conn,
            sender,
            settings,
        }
    }

    /// Main event loop. Runs a cycle every `settings.interval` until
    /// `shutdown` broadcasts `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            channel = self.sender.name(),
            "reminder engine started"
        );

        let mut interval = tokio::time::interval(self.settings.interval);
        // A slow cycle pushes the next one back instead of bursting.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_cycle().await {
                        Ok(report) if report.attempted() > 0 => info!(
                            attempted = report.attempted(),
                            flags_marked = report.flags_marked,
                            "reminder cycle complete"
                        ),
                        Ok(_) => debug!("reminder cycle: nothing due"),
                        Err(e) => error!("reminder cycle error: {e}"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("reminder engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Run one cycle against the current wall-clock time.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle with both windows anchored at `now`.
    ///
    /// Selection finishes before the first send and the flag transaction
    /// starts after the last one, so no statement is held across an await.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> Result<CycleReport> {
        // Collect eagerly so every statement is finished before we await.
        let mut plan: Vec<(ReminderThreshold, Vec<ReminderCandidate>)> = Vec::new();
        for threshold in ReminderThreshold::ALL {
            let due = due_for_reminder(&self.conn, threshold, now).map_err(SchedulerError::Select)?;
            plan.push((threshold, due));
        }

        // Own the sender so the sends below borrow nothing from `self`; the
        // flag commit afterwards needs `&mut self.conn`.
        let sender = Arc::clone(&self.sender);
        let timeout = self.settings.send_timeout;

        let mut reports = Vec::with_capacity(plan.len());
        let mut marks: Vec<(ReminderThreshold, Vec<TaskId>)> = Vec::with_capacity(plan.len());
        for (threshold, due) in plan {
            let mut report = ThresholdReport::new(threshold);
            let mut attempted = Vec::with_capacity(due.len());
            for candidate in due {
                let outcome = notify(sender.as_ref(), threshold, &candidate, timeout).await;
                report.record(&outcome);
                // Flag regardless of outcome: a failed reminder is not retried.
                attempted.push(candidate.task_id);
            }
            reports.push(report);
            marks.push((threshold, attempted));
        }

        let pending: usize = marks.iter().map(|(_, ids)| ids.len()).sum();
        let flags_marked = commit_reminder_flags(&mut self.conn, &marks).map_err(|source| {
            error!(pending, "reminders sent but flags not recorded; they may repeat");
            SchedulerError::FlagCommit { pending, source }
        })?;

        Ok(CycleReport {
            now,
            thresholds: reports,
            flags_marked,
        })
    }
}

async fn notify(
    sender: &dyn NotificationSender,
    threshold: ReminderThreshold,
    candidate: &ReminderCandidate,
    timeout: Duration,
) -> Delivery {
    debug!(
        task_id = %candidate.task_id,
        user_id = %candidate.user_id,
        %threshold,
        deadline = %candidate.deadline,
        "sending reminder"
    );
    let body = threshold.message(&candidate.user_name, &candidate.title);
    dispatch(sender, &candidate.address, &body, timeout).await
}
