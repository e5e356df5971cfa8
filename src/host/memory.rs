//! In-memory host used by the standalone binary and tests

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

use super::{DeviceRegistry, ImageRegistry};
use crate::error::{AppError, AppResult};
use crate::models::{DeviceRecord, NewDevice};

#[derive(Debug, Default)]
pub struct MemoryHost {
    devices: BTreeMap<u8, DeviceRecord>,
    images: HashMap<String, u32>,
    next_image_id: u32,
    writes: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            next_image_id: 100,
            ..Default::default()
        }
    }

    /// Number of value updates applied so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.values()
    }
}

impl DeviceRegistry for MemoryHost {
    fn get(&self, unit: u8) -> Option<&DeviceRecord> {
        self.devices.get(&unit)
    }

    fn create(&mut self, device: NewDevice) -> AppResult<()> {
        if self.devices.contains_key(&device.unit) {
            return Err(AppError::Device(format!("Unit {} already exists", device.unit)));
        }
        tracing::debug!(
            "[Host] Created {} device {} '{}'",
            device.kind,
            device.unit,
            device.name
        );
        self.devices.insert(device.unit, DeviceRecord::from_new(device));
        Ok(())
    }

    fn update(&mut self, unit: u8, n_value: i32, s_value: &str) -> AppResult<()> {
        let record = self
            .devices
            .get_mut(&unit)
            .ok_or_else(|| AppError::Device(format!("Unit {} not found", unit)))?;

        record.n_value = n_value;
        record.s_value = s_value.to_string();
        record.last_update = Some(Utc::now());
        self.writes += 1;

        tracing::debug!(
            "[Host] Device {} '{}' <- nValue={}, sValue='{}'",
            unit,
            record.name,
            n_value,
            s_value
        );
        Ok(())
    }
}

impl ImageRegistry for MemoryHost {
    fn image_id(&self, key: &str) -> Option<u32> {
        self.images.get(key).copied()
    }

    fn create_from_archive(&mut self, key: &str, archive: &str) -> AppResult<u32> {
        if !archive.ends_with(".zip") {
            return Err(AppError::Device(format!("Icon archive must be a zip file: {}", archive)));
        }
        let id = *self.images.entry(key.to_string()).or_insert_with(|| {
            self.next_image_id += 1;
            self.next_image_id
        });
        Ok(id)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.images.keys().cloned().collect();
        keys.sort();
        keys
    }
}
