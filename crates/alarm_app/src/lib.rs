pub mod app;

pub use crate::app::{run, AppConfig};

#[cfg(any(target_os = "android", target_os = "ios"))]
use std::path::PathBuf;

/// Entry point for mobile hosts. `storage_root` is the app's internal data
/// directory as reported by the platform.
#[cfg(any(target_os = "android", target_os = "ios"))]
pub fn run_mobile(storage_root: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().unwrap_or_default();
    config.bootstrap_mobile_defaults(storage_root);
    run(config)
}
