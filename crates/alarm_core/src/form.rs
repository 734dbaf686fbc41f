use chrono::{NaiveDateTime, Timelike};

use crate::{
    alarm::{Alarm, AlarmFields},
    error::AlarmError,
    notifications::NotificationMessages,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted,
    RejectedInvalidRange,
}

/// Decides whether `start..end` forms an acceptable alarm range, looking only
/// at hour and minute.
///
/// A start hour later than the end hour is always accepted as an overnight
/// range. Within the same hour the start minute must be strictly earlier.
pub fn validate_range(start: &impl Timelike, end: &impl Timelike) -> ValidationResult {
    let (start_hour, start_minute) = (start.hour(), start.minute());
    let (end_hour, end_minute) = (end.hour(), end.minute());

    let accepted = start_hour < end_hour
        || (start_hour == end_hour && start_minute < end_minute)
        || end_hour < start_hour;

    if accepted {
        ValidationResult::Accepted
    } else {
        ValidationResult::RejectedInvalidRange
    }
}

/// Editable form state for creating or changing an alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmDraft {
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub repeats: bool,
    pub messages: NotificationMessages,
}

impl AlarmDraft {
    /// Blank form with both pickers at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            start_time: now,
            end_time: now,
            repeats: false,
            messages: NotificationMessages::default(),
        }
    }

    pub fn from_alarm(alarm: &Alarm, messages: NotificationMessages) -> Self {
        Self {
            title: alarm.title.clone(),
            description: alarm.description.clone(),
            start_time: alarm.start_time,
            end_time: alarm.end_time,
            repeats: alarm.repeats,
            messages,
        }
    }

    pub fn validate(self) -> Result<ValidatedDraft, AlarmError> {
        let start_time = truncate_to_minute(self.start_time);
        let end_time = truncate_to_minute(self.end_time);
        match validate_range(&start_time, &end_time) {
            ValidationResult::Accepted => Ok(ValidatedDraft {
                fields: AlarmFields {
                    title: self.title,
                    description: self.description,
                    start_time,
                    end_time,
                    repeats: self.repeats,
                },
                messages: self.messages,
            }),
            ValidationResult::RejectedInvalidRange => Err(AlarmError::InvalidRange {
                start: start_time.time(),
                end: end_time.time(),
            }),
        }
    }
}

/// A draft that passed range validation, with minute-precision times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    fields: AlarmFields,
    messages: NotificationMessages,
}

impl ValidatedDraft {
    pub fn messages(&self) -> &NotificationMessages {
        &self.messages
    }

    pub fn into_new_alarm(self) -> Alarm {
        let AlarmFields {
            title,
            description,
            start_time,
            end_time,
            repeats,
        } = self.fields;
        Alarm::new(title, description, start_time, end_time).with_repeats(repeats)
    }

    pub fn into_fields(self) -> AlarmFields {
        self.fields
    }
}

fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 24)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn range_truth_table() {
        let cases = [
            ((9, 0), (17, 0), ValidationResult::Accepted),
            ((9, 0), (9, 0), ValidationResult::RejectedInvalidRange),
            ((9, 30), (9, 0), ValidationResult::RejectedInvalidRange),
            ((17, 0), (9, 0), ValidationResult::Accepted),
            ((9, 0), (9, 30), ValidationResult::Accepted),
        ];
        for ((sh, sm), (eh, em), expected) in cases {
            assert_eq!(
                validate_range(&t(sh, sm), &t(eh, em)),
                expected,
                "{sh:02}:{sm:02} -> {eh:02}:{em:02}"
            );
        }
    }

    #[test]
    fn range_ignores_seconds_and_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 59)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(9, 0, 1)
            .unwrap();
        assert_eq!(
            validate_range(&start, &end),
            ValidationResult::RejectedInvalidRange
        );
    }

    #[test]
    fn blank_draft_is_rejected() {
        let draft = AlarmDraft::new(at(10, 20, 0));
        assert!(matches!(
            draft.validate(),
            Err(AlarmError::InvalidRange { .. })
        ));
    }

    #[test]
    fn accepted_draft_is_truncated_to_minutes() {
        let mut draft = AlarmDraft::new(at(8, 0, 0));
        draft.title = "Commute".into();
        draft.start_time = at(8, 10, 42);
        draft.end_time = at(8, 55, 7);
        draft.repeats = true;

        let alarm = draft.validate().expect("valid range").into_new_alarm();

        assert_eq!(alarm.title, "Commute");
        assert_eq!(alarm.start_time, at(8, 10, 0));
        assert_eq!(alarm.end_time, at(8, 55, 0));
        assert!(alarm.repeats);
        assert!(alarm.notification_ids.is_empty());
    }

    #[test]
    fn truncation_drops_sub_second_precision() {
        let mut draft = AlarmDraft::new(at(8, 0, 0));
        draft.start_time = NaiveDate::from_ymd_opt(2025, 10, 24)
            .unwrap()
            .and_hms_nano_opt(8, 10, 42, 750_000_000)
            .unwrap();
        draft.end_time = at(9, 0, 0);

        let fields = draft.validate().expect("valid range").into_fields();

        assert_eq!(fields.start_time, at(8, 10, 0));
        assert_eq!(fields.start_time.nanosecond(), 0);
    }

    #[test]
    fn empty_title_is_not_enforced() {
        let mut draft = AlarmDraft::new(at(8, 0, 0));
        draft.end_time = at(9, 0, 0);
        let fields = draft.validate().expect("valid range").into_fields();
        assert!(fields.title.is_empty());
    }

    #[test]
    fn from_alarm_prefills_editable_fields() {
        let alarm = Alarm::new("Gym", "legs", at(18, 0, 0), at(19, 0, 0)).with_repeats(true);
        let draft = AlarmDraft::from_alarm(&alarm, NotificationMessages::default());
        assert_eq!(draft.title, "Gym");
        assert_eq!(draft.description, "legs");
        assert_eq!(draft.start_time, alarm.start_time);
        assert_eq!(draft.end_time, alarm.end_time);
        assert!(draft.repeats);
    }
}
