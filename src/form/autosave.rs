use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::store::{DraftStore, StorageKeys, StoreError, save_draft};

use super::session::FormSession;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(2000);

/// Debounced draft writer: one write per quiet period after the last edit.
///
/// Time is passed in by the caller, so the event loop drives it with
/// `Instant::now()` and tests drive it with fabricated instants.
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    quiet_period: Duration,
    due_at: Option<Instant>,
    last_saved: Option<DateTime<Local>>,
    last_write: Option<Instant>,
    stopped: bool,
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl AutosaveScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            due_at: None,
            last_saved: None,
            last_write: None,
            stopped: false,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Restart the countdown; any pending write moves to `now + quiet_period`.
    pub fn note_edit(&mut self, now: Instant) {
        if self.stopped {
            return;
        }
        self.due_at = Some(now + self.quiet_period);
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.due_at
    }

    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        self.last_saved
    }

    pub fn last_write(&self) -> Option<Instant> {
        self.last_write
    }

    /// Write the draft if the countdown elapsed. Returns the save time when a write happened.
    pub fn poll(
        &mut self,
        now: Instant,
        session: &FormSession,
        store: &mut dyn DraftStore,
        keys: &StorageKeys,
    ) -> Result<Option<DateTime<Local>>, StoreError> {
        let Some(due) = self.due_at else {
            return Ok(None);
        };
        if now < due {
            return Ok(None);
        }
        self.due_at = None;
        if self.stopped || !session.is_open() || !session.is_dirty() {
            return Ok(None);
        }
        let draft = session.draft_snapshot();
        if let Err(err) = save_draft(store, keys, &draft) {
            // Retry after another quiet period.
            self.due_at = Some(now + self.quiet_period);
            return Err(err);
        }
        let saved_at = Local::now();
        self.last_saved = Some(saved_at);
        self.last_write = Some(now);
        debug!(fields = draft.len(), key = %keys.draft, "autosaved draft");
        Ok(Some(saved_at))
    }

    /// Drop the pending write, e.g. after the draft was cleared by a submission.
    pub fn cancel(&mut self) {
        self.due_at = None;
        self.last_saved = None;
    }

    /// Permanently stop; used when the form goes away.
    pub fn stop(&mut self) {
        self.due_at = None;
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
