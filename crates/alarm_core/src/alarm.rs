use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notifications::NotificationId;

const TIME_LABEL_FORMAT: &str = "%I:%M %p";

/// Opaque identity of an alarm. Assigned once at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmId(Uuid);

impl AlarmId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlarmId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for AlarmId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: AlarmId,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Older blobs predate this flag; they decode as non-repeating.
    #[serde(default)]
    pub repeats: bool,
    /// Tokens of the notifications currently scheduled on behalf of this alarm.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_ids: Vec<NotificationId>,
}

impl Alarm {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: AlarmId::new(),
            title: title.into(),
            description: description.into(),
            start_time,
            end_time,
            repeats: false,
            notification_ids: Vec::new(),
        }
    }

    pub fn with_repeats(mut self, repeats: bool) -> Self {
        self.repeats = repeats;
        self
    }

    /// Replaces every user-editable field while keeping the identity and
    /// scheduled notification tokens.
    pub fn apply(&mut self, fields: AlarmFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.start_time = fields.start_time;
        self.end_time = fields.end_time;
        self.repeats = fields.repeats;
    }

    pub fn fields(&self) -> AlarmFields {
        AlarmFields {
            title: self.title.clone(),
            description: self.description.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            repeats: self.repeats,
        }
    }

    /// List row subtitle, e.g. `07:00 AM - 07:30 AM`.
    pub fn time_range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format(TIME_LABEL_FORMAT),
            self.end_time.format(TIME_LABEL_FORMAT)
        )
    }
}

/// The full set of fields replaced by an in-place update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmFields {
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub repeats: bool,
}
