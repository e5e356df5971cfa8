//! Host capabilities handed to the plugin
//!
//! - `DeviceRegistry`: devices owned by the host, addressed by unit index
//! - `ImageRegistry`: custom icons
//! - `Parameters`: read-only startup parameters

pub mod memory;

use std::collections::HashMap;

pub use memory::MemoryHost;

use crate::error::AppResult;
use crate::models::{DeviceRecord, NewDevice};

/// Host parameter carrying the Steam custom URL id
pub const PARAM_STEAM_ID: &str = "Mode1";

/// Host parameter carrying the debug mask
pub const PARAM_DEBUG: &str = "Mode6";

/// Devices owned and persisted by the host
pub trait DeviceRegistry {
    fn get(&self, unit: u8) -> Option<&DeviceRecord>;

    fn contains(&self, unit: u8) -> bool {
        self.get(unit).is_some()
    }

    /// Create a device. Fails if the unit is already taken.
    fn create(&mut self, device: NewDevice) -> AppResult<()>;

    /// Overwrite the value slots of an existing device
    fn update(&mut self, unit: u8, n_value: i32, s_value: &str) -> AppResult<()>;
}

/// Custom icons known to the host
pub trait ImageRegistry {
    fn image_id(&self, key: &str) -> Option<u32>;

    /// Register icons from an archive shipped with the plugin
    fn create_from_archive(&mut self, key: &str, archive: &str) -> AppResult<u32>;

    fn keys(&self) -> Vec<String>;
}

/// Read-only key/value startup parameters
pub trait Parameters {
    fn get(&self, key: &str) -> Option<&str>;
}

/// Plain map of parameters
#[derive(Debug, Clone, Default)]
pub struct HostParameters {
    values: HashMap<String, String>,
}

impl HostParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl Parameters for HostParameters {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}
