pub mod alarm;
pub mod blob;
pub mod codec;
pub mod error;
pub mod form;
pub mod notifications;
pub mod presets;
pub mod service;
pub mod store;

pub use crate::alarm::{Alarm, AlarmFields, AlarmId};
pub use crate::error::{AlarmError, CodecError, StorageError};
pub use crate::service::{AlarmService, AlarmServiceBuilder};
pub use crate::store::{AlarmStore, AlarmStoreBuilder};
