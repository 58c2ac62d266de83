use crate::models::DateBasis;
use crate::storage::{KeyValueStore, DATE_KEY, TOTAL_KEY};
use crate::tracker::today;
use crate::utils::format_elapsed;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Read-only view of the stored total.
pub struct Reporter<S: KeyValueStore> {
    store: S,
    date_basis: DateBasis,
}

impl<S: KeyValueStore> Reporter<S> {
    pub fn new(store: S, date_basis: DateBasis) -> Self {
        Self { store, date_basis }
    }

    /// Total stored for `date`, or zero if the store holds another day.
    pub fn total_for(&self, date: NaiveDate) -> Result<u64> {
        let stored_date = self.store.get_item(DATE_KEY)?;
        if stored_date.as_deref() != Some(date.to_string().as_str()) {
            return Ok(0);
        }

        match self.store.get_item(TOTAL_KEY)? {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Stored total {:?} is not a millisecond count", raw)),
            None => Ok(0),
        }
    }

    pub fn report(&self, now: DateTime<Utc>) -> Result<()> {
        let date = today(self.date_basis, now);
        let total = self.total_for(date)?;

        println!("Screen Time Today ({})", date);
        println!("{}", format_elapsed(total));

        Ok(())
    }
}
