use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::{
    alarm::{Alarm, AlarmFields, AlarmId},
    blob::{BlobStore, InMemoryBlobStore},
    codec,
    error::AlarmResult,
    notifications::NotificationId,
};

/// Blob key under which the whole collection is written.
pub const DEFAULT_ALARMS_KEY: &str = "SavedAlarms";

/// Sole owner of the alarm collection. Every mutation rewrites the blob.
pub struct AlarmStore {
    blob_store: Box<dyn BlobStore>,
    key: String,
    alarms: RwLock<Vec<Alarm>>,
}

pub struct AlarmStoreBuilder {
    blob_store: Option<Box<dyn BlobStore>>,
    key: String,
}

impl AlarmStoreBuilder {
    pub fn new() -> Self {
        Self {
            blob_store: None,
            key: DEFAULT_ALARMS_KEY.to_string(),
        }
    }

    pub fn blob_store(mut self, blob_store: impl BlobStore + 'static) -> Self {
        self.blob_store = Some(Box::new(blob_store));
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Builds the store and loads whatever the blob currently holds.
    pub fn build(self) -> AlarmStore {
        let blob_store: Box<dyn BlobStore> = match self.blob_store {
            Some(blob_store) => blob_store,
            None => Box::new(InMemoryBlobStore::new()),
        };
        let store = AlarmStore {
            blob_store,
            key: self.key,
            alarms: RwLock::new(Vec::new()),
        };
        store.reload();
        store
    }
}

impl Default for AlarmStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmStore {
    pub fn builder() -> AlarmStoreBuilder {
        AlarmStoreBuilder::new()
    }

    pub fn open(blob_store: impl BlobStore + 'static) -> Self {
        Self::builder().blob_store(blob_store).build()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the persisted collection. An absent, unreadable or malformed
    /// blob yields an empty collection.
    pub fn load(&self) -> Vec<Alarm> {
        match self.try_load() {
            Ok(alarms) => alarms,
            Err(err) => {
                warn!(key = %self.key, error = %err, "discarding unreadable alarm blob");
                Vec::new()
            }
        }
    }

    pub fn try_load(&self) -> AlarmResult<Vec<Alarm>> {
        let Some(bytes) = self.blob_store.get(&self.key)? else {
            debug!(key = %self.key, "no saved alarms");
            return Ok(Vec::new());
        };
        Ok(codec::decode_alarms(&bytes)?)
    }

    /// Replaces the in-memory collection with the persisted one.
    pub fn reload(&self) -> usize {
        let loaded = self.load();
        let count = loaded.len();
        *self.alarms.write() = loaded;
        debug!(key = %self.key, count, "alarms loaded");
        count
    }

    /// Overwrites the blob with `alarms`. Failures are logged and dropped.
    pub fn save_alarms(&self, alarms: &[Alarm]) {
        if let Err(err) = self.try_save_alarms(alarms) {
            warn!(key = %self.key, error = %err, "failed to save alarms");
        }
    }

    pub fn try_save_alarms(&self, alarms: &[Alarm]) -> AlarmResult<()> {
        let bytes = codec::encode_alarms(alarms)?;
        self.blob_store.set(&self.key, &bytes)?;
        debug!(key = %self.key, count = alarms.len(), "alarms saved");
        Ok(())
    }

    /// Appends without checking for a duplicate id.
    #[instrument(skip(self, alarm), fields(alarm_id = %alarm.id))]
    pub fn add(&self, alarm: Alarm) {
        let mut alarms = self.alarms.write();
        alarms.push(alarm);
        self.save_alarms(&alarms);
    }

    /// Replaces the editable fields of the alarm with `id`. Returns `false`
    /// and leaves the collection untouched when no such alarm exists.
    #[instrument(skip(self, fields))]
    pub fn update(&self, id: AlarmId, fields: AlarmFields) -> bool {
        let mut alarms = self.alarms.write();
        let Some(alarm) = alarms.iter_mut().find(|alarm| alarm.id == id) else {
            debug!("update for unknown alarm ignored");
            return false;
        };
        alarm.apply(fields);
        self.save_alarms(&alarms);
        true
    }

    pub fn set_notification_ids(&self, id: AlarmId, ids: Vec<NotificationId>) -> bool {
        let mut alarms = self.alarms.write();
        let Some(alarm) = alarms.iter_mut().find(|alarm| alarm.id == id) else {
            return false;
        };
        alarm.notification_ids = ids;
        self.save_alarms(&alarms);
        true
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: AlarmId) -> Option<Alarm> {
        let mut alarms = self.alarms.write();
        let index = alarms.iter().position(|alarm| alarm.id == id)?;
        let removed = alarms.remove(index);
        self.save_alarms(&alarms);
        Some(removed)
    }

    /// Removes exactly the records at `positions` of the current sorted
    /// view. Positions past the end are ignored and repeated positions count
    /// once. Returns the removed records in view order.
    #[instrument(skip(self))]
    pub fn remove_at(&self, positions: &[usize]) -> Vec<Alarm> {
        let mut alarms = self.alarms.write();
        let order = sorted_indices(&alarms);
        let mut picked: Vec<usize> = positions
            .iter()
            .copied()
            .filter(|&position| position < order.len())
            .collect();
        picked.sort_unstable();
        picked.dedup();
        if picked.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<usize> = picked.iter().map(|&position| order[position]).collect();
        let removed: Vec<Alarm> = indices.iter().map(|&index| alarms[index].clone()).collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for index in indices {
            alarms.remove(index);
        }
        self.save_alarms(&alarms);
        removed
    }

    /// Fresh copy of the collection ordered by start time. Equal start times
    /// keep their insertion order.
    pub fn sorted_view(&self) -> Vec<Alarm> {
        sorted(&self.alarms.read())
    }

    /// Snapshot in insertion order.
    pub fn all(&self) -> Vec<Alarm> {
        self.alarms.read().clone()
    }

    pub fn get(&self, id: AlarmId) -> Option<Alarm> {
        self.alarms.read().iter().find(|alarm| alarm.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.alarms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.read().is_empty()
    }
}

/// Collection indices in view order. The sort is stable, so equal start
/// times keep insertion order.
fn sorted_indices(alarms: &[Alarm]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..alarms.len()).collect();
    order.sort_by_key(|&index| alarms[index].start_time);
    order
}

fn sorted(alarms: &[Alarm]) -> Vec<Alarm> {
    sorted_indices(alarms)
        .into_iter()
        .map(|index| alarms[index].clone())
        .collect()
}
