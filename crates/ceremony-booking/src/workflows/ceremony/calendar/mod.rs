//! Bookable calendar: business-hour rules, the monthly slot generator, and the
//! service/router that persist and expose generated slots.

mod generator;
mod month;
pub mod router;
mod rules;
mod service;
mod slot;

pub use generator::generate_month;
pub use month::YearMonth;
pub use router::calendar_router;
pub use rules::{BusinessCalendar, LunchWindow};
pub use service::{CalendarError, GenerationSummary, SlotCalendarService};
pub use slot::{NewSlot, SlotId, TimeSlot};
