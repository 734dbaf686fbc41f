use std::fmt;
use std::sync::Arc;

use chrono::Timelike;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alarm::Alarm;

pub const START_NOTIFICATION_TITLE: &str = "Start Alarm";
pub const END_NOTIFICATION_TITLE: &str = "End Alarm";
pub const DEFAULT_START_MESSAGE: &str = "Your start alarm is going off!";
pub const DEFAULT_END_MESSAGE: &str = "Your end alarm is going off!";

/// Token identifying one scheduled platform notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A calendar trigger matching a wall-clock hour and minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: NotificationId,
    pub hour: u32,
    pub minute: u32,
    pub title: String,
    pub body: String,
    pub repeats: bool,
}

/// Receives the outcome of an authorization prompt. May run on any thread,
/// possibly long after the request was made.
pub type AuthorizationCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform-specific notification adapters will implement this trait.
pub trait NotificationSink: Send + Sync {
    fn request_authorization(&self, on_result: AuthorizationCallback);
    fn schedule(&self, request: NotificationRequest);
    fn cancel(&self, ids: &[NotificationId]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessages {
    pub start: String,
    pub end: String,
}

impl Default for NotificationMessages {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MESSAGE.to_string(),
            end: DEFAULT_END_MESSAGE.to_string(),
        }
    }
}

/// Turns alarms into start/end notification requests against a sink.
#[derive(Clone)]
pub struct AlarmScheduler {
    sink: Arc<dyn NotificationSink>,
}

impl AlarmScheduler {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Returns the tokens immediately; the requests themselves are only
    /// handed to the sink once authorization is granted.
    pub fn schedule_alarm(
        &self,
        alarm: &Alarm,
        messages: &NotificationMessages,
    ) -> Vec<NotificationId> {
        let requests = vec![
            NotificationRequest {
                id: NotificationId::new(),
                hour: alarm.start_time.hour(),
                minute: alarm.start_time.minute(),
                title: START_NOTIFICATION_TITLE.to_string(),
                body: messages.start.clone(),
                repeats: true,
            },
            NotificationRequest {
                id: NotificationId::new(),
                hour: alarm.end_time.hour(),
                minute: alarm.end_time.minute(),
                title: END_NOTIFICATION_TITLE.to_string(),
                body: messages.end.clone(),
                repeats: true,
            },
        ];
        let ids = requests.iter().map(|request| request.id).collect();

        let sink = Arc::clone(&self.sink);
        let alarm_id = alarm.id;
        self.sink.request_authorization(Box::new(move |granted| {
            if !granted {
                tracing::debug!(%alarm_id, "notification authorization denied");
                return;
            }
            for request in requests {
                tracing::debug!(
                    %alarm_id,
                    notification_id = %request.id,
                    hour = request.hour,
                    minute = request.minute,
                    "scheduling notification"
                );
                sink.schedule(request);
            }
        }));
        ids
    }

    pub fn cancel_alarm(&self, alarm: &Alarm) {
        if alarm.notification_ids.is_empty() {
            return;
        }
        tracing::debug!(
            alarm_id = %alarm.id,
            count = alarm.notification_ids.len(),
            "cancelling notifications"
        );
        self.sink.cancel(&alarm.notification_ids);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationMode {
    Granted,
    Denied,
    /// Hold callbacks until [`RecordingNotificationSink::resolve_pending`].
    Deferred,
}

/// Sink that records what it is asked to do. Backs tests and the desktop
/// shell, which has no platform notification centre.
pub struct RecordingNotificationSink {
    mode: AuthorizationMode,
    pending: Mutex<Vec<AuthorizationCallback>>,
    scheduled: Mutex<Vec<NotificationRequest>>,
    cancelled: Mutex<Vec<NotificationId>>,
}

impl RecordingNotificationSink {
    pub fn new(mode: AuthorizationMode) -> Self {
        Self {
            mode,
            pending: Mutex::new(Vec::new()),
            scheduled: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn granted() -> Self {
        Self::new(AuthorizationMode::Granted)
    }

    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.scheduled.lock().clone()
    }

    pub fn cancelled(&self) -> Vec<NotificationId> {
        self.cancelled.lock().clone()
    }

    pub fn pending_authorizations(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn resolve_pending(&self, granted: bool) {
        let callbacks = std::mem::take(&mut *self.pending.lock());
        for callback in callbacks {
            callback(granted);
        }
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn request_authorization(&self, on_result: AuthorizationCallback) {
        match self.mode {
            AuthorizationMode::Granted => on_result(true),
            AuthorizationMode::Denied => on_result(false),
            AuthorizationMode::Deferred => self.pending.lock().push(on_result),
        }
    }

    fn schedule(&self, request: NotificationRequest) {
        tracing::info!(
            title = %request.title,
            body = %request.body,
            hour = request.hour,
            minute = request.minute,
            repeats = request.repeats,
            "notification scheduled"
        );
        self.scheduled.lock().push(request);
    }

    fn cancel(&self, ids: &[NotificationId]) {
        let mut scheduled = self.scheduled.lock();
        scheduled.retain(|request| !ids.contains(&request.id));
        self.cancelled.lock().extend_from_slice(ids);
    }
}
