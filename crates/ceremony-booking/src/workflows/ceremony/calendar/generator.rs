use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use super::month::YearMonth;
use super::rules::BusinessCalendar;
use super::service::CalendarError;
use super::slot::NewSlot;

/// Computes the slots missing from `target` given the start times already persisted.
///
/// Months before the one containing `now` are refused; the current month is always
/// accepted, but days before `now`'s date are skipped. Start times present in
/// `existing` are never emitted again, so re-running for a month only fills gaps.
pub fn generate_month(
    calendar: &BusinessCalendar,
    target: YearMonth,
    now: NaiveDateTime,
    existing: &BTreeSet<NaiveDateTime>,
) -> Result<Vec<NewSlot>, CalendarError> {
    let today = now.date();
    if target < YearMonth::containing(today) {
        return Err(CalendarError::PastMonth { target });
    }

    let duration = calendar.slot_duration();
    let slots = target
        .days()
        .filter(|day| *day >= today)
        .flat_map(|day| calendar.slot_starts(day))
        .filter(|start| !existing.contains(start))
        .map(|start_time| NewSlot {
            start_time,
            end_time: start_time + duration,
        })
        .collect();

    Ok(slots)
}
