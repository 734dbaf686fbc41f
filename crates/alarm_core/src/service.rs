use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::{
    alarm::{Alarm, AlarmId},
    blob::BlobStore,
    error::{AlarmError, AlarmResult},
    form::AlarmDraft,
    notifications::{AlarmScheduler, NotificationMessages, NotificationSink},
    presets::Preset,
    store::{AlarmStore, AlarmStoreBuilder},
};

/// Glue between the form, the store and the notification port.
pub struct AlarmService {
    store: AlarmStore,
    scheduler: Option<AlarmScheduler>,
    default_messages: NotificationMessages,
}

pub struct AlarmServiceBuilder {
    store: AlarmStoreBuilder,
    notification_sink: Option<Arc<dyn NotificationSink>>,
    default_messages: NotificationMessages,
}

impl AlarmServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: AlarmStore::builder(),
            notification_sink: None,
            default_messages: NotificationMessages::default(),
        }
    }

    pub fn blob_store(mut self, blob_store: impl BlobStore + 'static) -> Self {
        self.store = self.store.blob_store(blob_store);
        self
    }

    pub fn store_key(mut self, key: impl Into<String>) -> Self {
        self.store = self.store.key(key);
        self
    }

    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn default_messages(mut self, messages: NotificationMessages) -> Self {
        self.default_messages = messages;
        self
    }

    pub fn build(self) -> AlarmService {
        let store = self.store.build();
        info!(count = store.len(), key = store.key(), "alarm service ready");
        AlarmService {
            store,
            scheduler: self.notification_sink.map(AlarmScheduler::new),
            default_messages: self.default_messages,
        }
    }
}

impl Default for AlarmServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmService {
    pub fn builder() -> AlarmServiceBuilder {
        AlarmServiceBuilder::new()
    }

    /// Alarms as they should be listed: ascending by start time.
    pub fn alarms(&self) -> Vec<Alarm> {
        self.store.sorted_view()
    }

    pub fn alarm(&self, id: AlarmId) -> Option<Alarm> {
        self.store.get(id)
    }

    pub fn new_draft(&self, now: NaiveDateTime) -> AlarmDraft {
        let mut draft = AlarmDraft::new(now);
        draft.messages = self.default_messages.clone();
        draft
    }

    pub fn edit_draft(&self, id: AlarmId) -> Option<AlarmDraft> {
        let alarm = self.store.get(id)?;
        Some(AlarmDraft::from_alarm(&alarm, self.default_messages.clone()))
    }

    /// Validates `draft` and either creates a new alarm or, when `editing`
    /// is set, replaces that alarm's fields. A rejected range leaves the
    /// store and notifications untouched.
    pub fn submit(&self, draft: AlarmDraft, editing: Option<AlarmId>) -> AlarmResult<AlarmId> {
        let validated = draft.validate()?;
        let messages = validated.messages().clone();

        let id = match editing {
            Some(id) => {
                let previous = self.store.get(id).ok_or(AlarmError::NotFound(id))?;
                if !self.store.update(id, validated.into_fields()) {
                    return Err(AlarmError::NotFound(id));
                }
                if let Some(scheduler) = &self.scheduler {
                    scheduler.cancel_alarm(&previous);
                }
                info!(alarm_id = %id, "alarm updated");
                id
            }
            None => {
                let alarm = validated.into_new_alarm();
                let id = alarm.id;
                self.store.add(alarm);
                info!(alarm_id = %id, "alarm created");
                id
            }
        };

        self.schedule(id, &messages);
        Ok(id)
    }

    /// Inserts a preset as-is: no validation and no notifications.
    pub fn apply_preset(&self, preset: &Preset, on: NaiveDate) -> AlarmId {
        let alarm = preset.to_alarm(on);
        let id = alarm.id;
        self.store.add(alarm);
        info!(alarm_id = %id, preset = preset.title, "preset applied");
        id
    }

    pub fn delete(&self, id: AlarmId) -> bool {
        let Some(removed) = self.store.remove(id) else {
            debug!(alarm_id = %id, "delete for unknown alarm ignored");
            return false;
        };
        self.cancel(&removed);
        info!(alarm_id = %id, "alarm deleted");
        true
    }

    /// Deletes by position in the list as currently displayed.
    pub fn delete_at(&self, positions: &[usize]) -> Vec<Alarm> {
        let removed = self.store.remove_at(positions);
        for alarm in &removed {
            self.cancel(alarm);
        }
        info!(count = removed.len(), "alarms deleted by position");
        removed
    }

    fn schedule(&self, id: AlarmId, messages: &NotificationMessages) {
        let Some(scheduler) = &self.scheduler else {
            return;
        };
        let Some(alarm) = self.store.get(id) else {
            return;
        };
        let ids = scheduler.schedule_alarm(&alarm, messages);
        self.store.set_notification_ids(id, ids);
    }

    fn cancel(&self, alarm: &Alarm) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.cancel_alarm(alarm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        blob::InMemoryBlobStore,
        notifications::{
            AuthorizationMode, RecordingNotificationSink, END_NOTIFICATION_TITLE,
            START_NOTIFICATION_TITLE,
        },
        presets::PRESETS,
    };
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 24).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn service_with_sink(
        mode: AuthorizationMode,
    ) -> (AlarmService, Arc<RecordingNotificationSink>) {
        let sink = Arc::new(RecordingNotificationSink::new(mode));
        let service = AlarmService::builder()
            .blob_store(InMemoryBlobStore::new())
            .with_notification_sink(sink.clone())
            .build();
        (service, sink)
    }

    fn draft(
        service: &AlarmService,
        title: &str,
        start: (u32, u32),
        end: (u32, u32),
    ) -> AlarmDraft {
        let mut draft = service.new_draft(at(start.0, start.1));
        draft.title = title.to_string();
        draft.end_time = at(end.0, end.1);
        draft
    }

    #[test]
    fn submit_new_alarm_persists_and_schedules() {
        let (service, sink) = service_with_sink(AuthorizationMode::Granted);

        let id = service
            .submit(draft(&service, "Focus", (9, 0), (17, 0)), None)
            .expect("accepted");

        let alarm = service.alarm(id).expect("stored");
        assert_eq!(alarm.title, "Focus");
        let scheduled = sink.scheduled();
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].title, START_NOTIFICATION_TITLE);
        assert_eq!((scheduled[0].hour, scheduled[0].minute), (9, 0));
        assert_eq!(scheduled[1].title, END_NOTIFICATION_TITLE);
        assert_eq!((scheduled[1].hour, scheduled[1].minute), (17, 0));
        let tokens: Vec<_> = scheduled.iter().map(|request| request.id).collect();
        assert_eq!(alarm.notification_ids, tokens);
    }

    #[test]
    fn rejected_range_has_no_side_effects() {
        let (service, sink) = service_with_sink(AuthorizationMode::Granted);

        let result = service.submit(draft(&service, "Broken", (9, 30), (9, 0)), None);

        assert!(matches!(result, Err(AlarmError::InvalidRange { .. })));
        assert!(service.alarms().is_empty());
        assert!(sink.scheduled().is_empty());
    }

    #[test]
    fn overnight_range_is_accepted() {
        let (service, _) = service_with_sink(AuthorizationMode::Granted);
        let id = service
            .submit(draft(&service, "Night shift", (22, 0), (6, 0)), None)
            .expect("overnight accepted");
        assert!(service.alarm(id).is_some());
    }

    #[test]
    fn editing_replaces_fields_and_previous_notifications() {
        let (service, sink) = service_with_sink(AuthorizationMode::Granted);
        let id = service
            .submit(draft(&service, "Gym", (18, 0), (19, 0)), None)
            .unwrap();
        let first_tokens = service.alarm(id).unwrap().notification_ids;

        let mut edit = service.edit_draft(id).expect("draft for existing alarm");
        edit.title = "Late gym".into();
        edit.start_time = at(20, 0);
        edit.end_time = at(21, 0);
        let edited_id = service.submit(edit, Some(id)).expect("accepted");

        assert_eq!(edited_id, id);
        assert_eq!(service.alarms().len(), 1);
        let alarm = service.alarm(id).unwrap();
        assert_eq!(alarm.title, "Late gym");
        assert_eq!(sink.cancelled(), first_tokens);
        let live: Vec<_> = sink.scheduled().iter().map(|request| request.id).collect();
        assert_eq!(live, alarm.notification_ids);
        assert!(sink.scheduled().iter().any(|request| request.hour == 20));
    }

    #[test]
    fn editing_unknown_alarm_is_not_found() {
        let (service, sink) = service_with_sink(AuthorizationMode::Granted);
        let missing = AlarmId::new();

        let result = service.submit(draft(&service, "Ghost", (1, 0), (2, 0)), Some(missing));

        assert!(matches!(result, Err(AlarmError::NotFound(id)) if id == missing));
        assert!(service.alarms().is_empty());
        assert!(sink.scheduled().is_empty());
    }

    #[test]
    fn denied_authorization_still_saves_alarm() {
        let (service, sink) = service_with_sink(AuthorizationMode::Denied);
        let id = service
            .submit(draft(&service, "Quiet", (7, 0), (8, 0)), None)
            .unwrap();
        assert!(service.alarm(id).is_some());
        assert!(sink.scheduled().is_empty());
    }

    #[test]
    fn preset_appends_exactly_one_record() {
        let (service, sink) = service_with_sink(AuthorizationMode::Granted);
        service
            .submit(draft(&service, "Existing", (5, 0), (6, 0)), None)
            .unwrap();
        let scheduled_before = sink.scheduled().len();

        let id = service.apply_preset(&PRESETS[2], day());

        let alarms = service.alarms();
        assert_eq!(alarms.len(), 2);
        let preset = service.alarm(id).unwrap();
        assert_eq!(preset.title, "Evening Alarm");
        assert_eq!(preset.start_time, at(18, 0));
        assert_eq!(preset.end_time, at(18, 30));
        assert_eq!(sink.scheduled().len(), scheduled_before);
    }

    #[test]
    fn delete_cancels_notifications() {
        let (service, sink) = service_with_sink(AuthorizationMode::Granted);
        let id = service
            .submit(draft(&service, "Temp", (10, 0), (11, 0)), None)
            .unwrap();

        assert!(service.delete(id));
        assert!(!service.delete(id));
        assert!(service.alarms().is_empty());
        assert!(sink.scheduled().is_empty());
        assert_eq!(sink.cancelled().len(), 2);
    }

    #[test]
    fn delete_at_uses_display_order() {
        let (service, _) = service_with_sink(AuthorizationMode::Granted);
        service.apply_preset(&PRESETS[2], day());
        service.apply_preset(&PRESETS[0], day());
        service.apply_preset(&PRESETS[1], day());

        let removed = service.delete_at(&[0]);

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].title, "Morning Alarm");
        let titles: Vec<String> = service.alarms().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, ["Lunch Alarm", "Evening Alarm"]);
    }

    #[test]
    fn works_without_notification_sink() {
        let service = AlarmService::builder().build();
        let id = service
            .submit(draft(&service, "Offline", (6, 0), (7, 0)), None)
            .unwrap();
        assert!(service.alarm(id).unwrap().notification_ids.is_empty());
    }

    #[test]
    fn custom_default_messages_flow_into_drafts() {
        let sink = Arc::new(RecordingNotificationSink::granted());
        let service = AlarmService::builder()
            .with_notification_sink(sink.clone())
            .default_messages(NotificationMessages {
                start: "Begin".into(),
                end: "Stop".into(),
            })
            .build();

        service
            .submit(draft(&service, "Msg", (6, 0), (7, 0)), None)
            .unwrap();

        let bodies: Vec<String> = sink.scheduled().into_iter().map(|r| r.body).collect();
        assert_eq!(bodies, ["Begin", "Stop"]);
    }
}
