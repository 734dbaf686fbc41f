use chrono::{NaiveDate, NaiveTime};

use crate::alarm::Alarm;

/// Hard-coded alarm template that is inserted without going through the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub title: &'static str,
    pub description: &'static str,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

pub const PRESETS: [Preset; 3] = [
    Preset {
        title: "Morning Alarm",
        description: "Wake up for the day",
        start_hour: 7,
        start_minute: 0,
        end_hour: 7,
        end_minute: 30,
    },
    Preset {
        title: "Lunch Alarm",
        description: "Reminder to eat lunch",
        start_hour: 12,
        start_minute: 0,
        end_hour: 12,
        end_minute: 30,
    },
    Preset {
        title: "Evening Alarm",
        description: "End of the day",
        start_hour: 18,
        start_minute: 0,
        end_hour: 18,
        end_minute: 30,
    },
];

pub fn find_preset(title: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.title == title)
}

impl Preset {
    pub fn start(&self) -> NaiveTime {
        hm(self.start_hour, self.start_minute)
    }

    pub fn end(&self) -> NaiveTime {
        hm(self.end_hour, self.end_minute)
    }

    /// Builds a fresh alarm with this preset's hours anchored to `on`.
    pub fn to_alarm(&self, on: NaiveDate) -> Alarm {
        Alarm::new(
            self.title,
            self.description,
            on.and_time(self.start()),
            on.and_time(self.end()),
        )
    }
}

// Table entries are compile-time constants inside the clock's range.
fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
