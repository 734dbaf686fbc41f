use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use alarm_core::{
    blob::{self, FileBlobStore},
    notifications::{
        NotificationMessages, RecordingNotificationSink, DEFAULT_END_MESSAGE,
        DEFAULT_START_MESSAGE,
    },
    store::DEFAULT_ALARMS_KEY,
    Alarm, AlarmService,
};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

const DEFAULT_DATA_DIR: &str = ".alarm_block";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) store_key: String,
    pub(crate) start_message: String,
    pub(crate) end_message: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = non_blank(lookup("ALARM_BLOCK_DATA_DIR")) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = non_blank(lookup("ALARM_BLOCK_STORE_KEY")) {
            if !blob::is_valid_key(&key) {
                warn!(%key, "ignoring store key that does not name a single file");
            } else {
                config.store_key = key;
            }
        }
        if let Some(message) = non_blank(lookup("ALARM_BLOCK_START_MESSAGE")) {
            config.start_message = message;
        }
        if let Some(message) = non_blank(lookup("ALARM_BLOCK_END_MESSAGE")) {
            config.end_message = message;
        }
        Ok(config)
    }

    /// Mobile shells pass the app's internal data directory; alarms live in
    /// an `alarms` folder beneath it.
    #[cfg(any(test, target_os = "android", target_os = "ios"))]
    pub(crate) fn bootstrap_mobile_defaults(&mut self, storage_root: Option<PathBuf>) {
        if let Some(mut root) = storage_root {
            root.push("alarms");
            info!(path = %root.display(), "using platform data directory");
            self.data_dir = root;
        }
    }

    pub fn messages(&self) -> NotificationMessages {
        NotificationMessages {
            start: self.start_message.clone(),
            end: self.end_message.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store_key: DEFAULT_ALARMS_KEY.to_string(),
            start_message: DEFAULT_START_MESSAGE.to_string(),
            end_message: DEFAULT_END_MESSAGE.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn build_service(config: &AppConfig) -> Result<AlarmService> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "unable to prepare data directory {}",
            config.data_dir.display()
        )
    })?;
    debug!(path = %config.data_dir.display(), key = %config.store_key, "opening alarm store");
    Ok(AlarmService::builder()
        .blob_store(FileBlobStore::new(&config.data_dir))
        .store_key(config.store_key.clone())
        .with_notification_sink(Arc::new(RecordingNotificationSink::granted()))
        .default_messages(config.messages())
        .build())
}

/// Writes the list the way the main screen shows it: title, then times.
pub fn write_alarm_list(out: &mut impl Write, alarms: &[Alarm]) -> io::Result<()> {
    if alarms.is_empty() {
        return writeln!(out, "No saved alarms");
    }
    for alarm in alarms {
        writeln!(out, "{}", alarm.title)?;
        writeln!(out, "  {}", alarm.time_range_label())?;
    }
    Ok(())
}

pub fn run(config: AppConfig) -> Result<()> {
    let start = Instant::now();
    let service = build_service(&config)?;
    let alarms = service.alarms();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_alarm_list(&mut out, &alarms).context("failed to write alarm list")?;
    out.flush().context("failed to flush output")?;

    info!(
        count = alarms.len(),
        elapsed_ms = %start.elapsed().as_millis(),
        "alarm list rendered"
    );
    Ok(())
}
