use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

const fn minutes(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}

/// Closed-for-lunch interval expressed in minutes after midnight, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunchWindow {
    start: u32,
    end: u32,
}

impl LunchWindow {
    const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Half-open overlap: touching the window at either edge does not count.
    pub fn overlaps(self, slot_start: u32, slot_end: u32) -> bool {
        slot_start < self.end && slot_end > self.start
    }
}

/// Fixed opening hours of the facility.
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    opening: u32,
    closing: u32,
    slot_minutes: u32,
    lunch: LunchWindow,
    friday_lunch: LunchWindow,
}

impl BusinessCalendar {
    pub const fn standard() -> Self {
        Self {
            opening: minutes(9, 0),
            closing: minutes(18, 0),
            slot_minutes: 30,
            lunch: LunchWindow::new(minutes(12, 0), minutes(13, 0)),
            friday_lunch: LunchWindow::new(minutes(12, 30), minutes(14, 0)),
        }
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    pub fn lunch_window(&self, weekday: Weekday) -> LunchWindow {
        match weekday {
            Weekday::Fri => self.friday_lunch,
            _ => self.lunch,
        }
    }

    /// Start times of every bookable slot on `day`, in order. A slot must end by closing time.
    pub fn slot_starts(&self, day: NaiveDate) -> Vec<NaiveDateTime> {
        let lunch = self.lunch_window(day.weekday());
        let mut starts = Vec::new();
        let mut start = self.opening;

        while start + self.slot_minutes <= self.closing {
            let end = start + self.slot_minutes;
            if !lunch.overlaps(start, end) {
                if let Some(at) = day.and_hms_opt(start / 60, start % 60, 0) {
                    starts.push(at);
                }
            }
            start = end;
        }

        starts
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::standard()
    }
}
