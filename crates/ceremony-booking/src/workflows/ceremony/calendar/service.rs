use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use super::generator::generate_month;
use super::month::YearMonth;
use super::rules::BusinessCalendar;
use super::slot::TimeSlot;
use crate::error::ErrorKind;
use crate::workflows::ceremony::repository::{RepositoryError, SlotStore};

/// Fresh snapshots tried when a concurrent run inserts the same start times first.
const GENERATION_ATTEMPTS: usize = 3;

/// Persists generated slots and answers availability queries.
pub struct SlotCalendarService<S> {
    store: Arc<S>,
    calendar: BusinessCalendar,
}

/// Operator feedback for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub year: i32,
    pub month: u32,
    pub created: usize,
}

impl GenerationSummary {
    pub fn message(&self) -> String {
        format!(
            "Successfully generated {} new time slots for {}-{:02}.",
            self.created, self.year, self.month
        )
    }
}

impl<S> SlotCalendarService<S>
where
    S: SlotStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_calendar(store, BusinessCalendar::standard())
    }

    pub fn with_calendar(store: Arc<S>, calendar: BusinessCalendar) -> Self {
        Self { store, calendar }
    }

    /// Generate and persist the missing slots of a month; the batch is stored all-or-nothing.
    ///
    /// A batch that collides with slots inserted after the snapshot was read is rebuilt from
    /// a fresh snapshot, so overlapping runs for one month still end in a summary.
    pub fn generate(
        &self,
        year: i32,
        month: u32,
        now: NaiveDateTime,
    ) -> Result<GenerationSummary, CalendarError> {
        let target = YearMonth::new(year, month).ok_or(CalendarError::InvalidMonth { year, month })?;

        let mut attempt = 1;
        let created = loop {
            let existing = self.store.slot_start_times(target)?;
            let slots = generate_month(&self.calendar, target, now, &existing)?;
            if slots.is_empty() {
                break 0;
            }
            match self.store.insert_slots(slots) {
                Ok(stored) => break stored.len(),
                Err(RepositoryError::DuplicateSlot(start)) if attempt < GENERATION_ATTEMPTS => {
                    debug!(%target, %start, attempt, "slot batch collided, regenerating");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        };

        let summary = GenerationSummary {
            year,
            month,
            created,
        };
        info!(%target, created, "{}", summary.message());
        Ok(summary)
    }

    /// Free slots of a month ordered by start time.
    pub fn available_slots(&self, year: i32, month: u32) -> Result<Vec<TimeSlot>, CalendarError> {
        let target = YearMonth::new(year, month).ok_or(CalendarError::InvalidMonth { year, month })?;
        Ok(self.store.available_slots(target)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("cannot generate time slots for past month {target}")]
    PastMonth { target: YearMonth },
    #[error("{year}-{month} is not a valid calendar month")]
    InvalidMonth { year: i32, month: u32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CalendarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalendarError::PastMonth { .. } | CalendarError::InvalidMonth { .. } => {
                ErrorKind::InvalidInput
            }
            CalendarError::Repository(err) => err.kind(),
        }
    }
}
