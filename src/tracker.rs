use crate::models::{DateBasis, LifecycleState, Phase};
use crate::storage::{KeyValueStore, DATE_KEY, TOTAL_KEY};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use tracing::{debug, info, warn};

/// How `initialize` arrived at the in-memory total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored date was not today; storage was reset to zero.
    Rollover,
    /// Stored total for today was loaded.
    Restored,
    /// Storage could not be read or written; started from zero.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SessionStarted,
    SessionEnded { elapsed_ms: u64 },
    Unchanged,
}

pub fn today(basis: DateBasis, now: DateTime<Utc>) -> NaiveDate {
    match basis {
        DateBasis::Utc => day_in(now, &Utc),
        DateBasis::Local => day_in(now, &Local),
    }
}

fn day_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

fn elapsed_ms(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_milliseconds().max(0) as u64
}

/// Accumulates foreground time for the current day.
pub struct Tracker<S: KeyValueStore> {
    pub store: S,
    pub date_basis: DateBasis,
    pub date: Option<NaiveDate>,
    pub daily_total_ms: u64,
    pub session_start: Option<DateTime<Utc>>,
    pub last_state: LifecycleState,
}

impl<S: KeyValueStore> Tracker<S> {
    /// `initial_state` is the lifecycle state the process starts in. When it
    /// is `Active`, `initialize` opens the first session.
    pub fn new(store: S, date_basis: DateBasis, initial_state: LifecycleState) -> Self {
        Self {
            store,
            date_basis,
            date: None,
            daily_total_ms: 0,
            session_start: None,
            last_state: initial_state,
        }
    }

    /// Load today's total, rolling storage over if the stored date is stale.
    /// Storage failures are logged and leave the total at zero.
    pub fn initialize(&mut self, now: DateTime<Utc>) -> LoadOutcome {
        let outcome = match self.load_today(now) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to load stored time: {:#}", e);
                self.daily_total_ms = 0;
                // Start the store over so later session writes belong to today.
                if let Some(today) = self.date {
                    if let Err(e) = self.start_day(today) {
                        warn!("Failed to rewrite stored time: {:#}", e);
                    }
                }
                LoadOutcome::Fallback
            }
        };

        if self.last_state.phase() == Phase::Foregrounded {
            self.session_start = Some(now);
            debug!(%now, "Started foregrounded, session opened");
        }

        outcome
    }

    fn load_today(&mut self, now: DateTime<Utc>) -> Result<LoadOutcome> {
        let today = today(self.date_basis, now);
        self.date = Some(today);
        let today_str = today.to_string();

        let stored_date = self.store.get_item(DATE_KEY)?;
        if stored_date.as_deref() != Some(today_str.as_str()) {
            self.daily_total_ms = 0;
            self.start_day(today)?;
            info!(
                previous = stored_date.as_deref().unwrap_or("none"),
                today = %today_str,
                "New day, daily total reset"
            );
            return Ok(LoadOutcome::Rollover);
        }

        self.daily_total_ms = match self.store.get_item(TOTAL_KEY)? {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Stored total {:?} is not a millisecond count", raw))?,
            None => 0,
        };
        info!(total_ms = self.daily_total_ms, "Restored today's total");
        Ok(LoadOutcome::Restored)
    }

    /// Apply a lifecycle change reported by the host, using the last known
    /// state as the previous one.
    pub fn on_lifecycle_change(&mut self, next: LifecycleState, now: DateTime<Utc>) -> Transition {
        let previous = self.last_state;
        self.handle_transition(previous, next, now)
    }

    pub fn handle_transition(
        &mut self,
        previous: LifecycleState,
        next: LifecycleState,
        now: DateTime<Utc>,
    ) -> Transition {
        let transition = match (previous.phase(), next.phase()) {
            (Phase::Backgrounded, Phase::Foregrounded) => {
                self.session_start = Some(now);
                Transition::SessionStarted
            }
            (Phase::Foregrounded, Phase::Backgrounded) => match self.session_start.take() {
                Some(start) => {
                    let elapsed = elapsed_ms(start, now);
                    self.daily_total_ms = self.daily_total_ms.saturating_add(elapsed);
                    self.persist_total();
                    Transition::SessionEnded {
                        elapsed_ms: elapsed,
                    }
                }
                None => Transition::Unchanged,
            },
            (Phase::Foregrounded, Phase::Foregrounded)
            | (Phase::Backgrounded, Phase::Backgrounded) => Transition::Unchanged,
        };

        debug!(%previous, %next, ?transition, "Lifecycle change");
        self.last_state = next;
        transition
    }

    /// Total including the session still in progress. Not persisted.
    pub fn live_total_ms(&self, now: DateTime<Utc>) -> u64 {
        match self.session_start {
            Some(start) => self.daily_total_ms.saturating_add(elapsed_ms(start, now)),
            None => self.daily_total_ms,
        }
    }

    /// Zero today's total. A session in progress restarts at `now`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        let today = today(self.date_basis, now);
        self.date = Some(today);
        self.daily_total_ms = 0;
        if self.session_start.is_some() {
            self.session_start = Some(now);
        }

        match self.start_day(today) {
            Ok(()) => info!(today = %today, "Daily total reset"),
            Err(e) => warn!("Failed to reset stored time: {:#}", e),
        }
    }

    /// Treat process exit as leaving the foreground.
    pub fn shutdown(&mut self, now: DateTime<Utc>) -> Transition {
        self.on_lifecycle_change(LifecycleState::Background, now)
    }

    /// Zero the stored total, then stamp the date. A failure part way leaves
    /// the old date behind, so the next start rolls over again.
    fn start_day(&mut self, today: NaiveDate) -> Result<()> {
        self.store.set_item(TOTAL_KEY, "0")?;
        self.store.set_item(DATE_KEY, &today.to_string())
    }

    fn persist_total(&mut self) {
        let value = self.daily_total_ms.to_string();
        if let Err(e) = self.store.set_item(TOTAL_KEY, &value) {
            warn!(
                total_ms = self.daily_total_ms,
                "Failed to save stored time: {:#}",
                e
            );
        }
    }
}
