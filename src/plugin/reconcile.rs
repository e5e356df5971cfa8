//! Device reconciliation
//!
//! Creates the two plugin devices when they are missing and writes values
//! only when they differ from what the host already stores.

use crate::error::AppResult;
use crate::host::DeviceRegistry;
use crate::models::{NewDevice, PresenceView, GAME_UNIT, STATUS_UNIT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub view: PresenceView,
    /// Units created during this pass
    pub created: Vec<u8>,
    pub selector_written: bool,
    pub text_written: bool,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.selector_written || self.text_written
    }
}

/// Create missing devices. Existing devices are left as configured.
pub fn ensure_devices<R: DeviceRegistry>(
    registry: &mut R,
    steam_name: &str,
    image: Option<u32>,
) -> AppResult<Vec<u8>> {
    let mut created = Vec::new();

    if !registry.contains(STATUS_UNIT) {
        let name = format!("{} Status", steam_name);
        registry.create(NewDevice::selector(STATUS_UNIT, &name, image))?;
        tracing::info!("[Steam] Created selector switch device '{}'", name);
        created.push(STATUS_UNIT);
    }

    if !registry.contains(GAME_UNIT) {
        let name = format!("{} Game Name", steam_name);
        registry.create(NewDevice::text(GAME_UNIT, &name, image))?;
        tracing::info!("[Steam] Created text device for game name '{}'", name);
        created.push(GAME_UNIT);
    }

    Ok(created)
}

pub fn reconcile<R: DeviceRegistry>(
    registry: &mut R,
    steam_name: &str,
    image: Option<u32>,
    view: PresenceView,
) -> AppResult<ReconcileReport> {
    let created = ensure_devices(registry, steam_name, image)?;

    let level = view.level.to_string();
    let selector_written = write_if_changed(registry, STATUS_UNIT, view.level, &level)?;
    if selector_written {
        tracing::info!(
            "[Steam] Updated status device with nValue={}, sValue='{}'",
            view.level,
            view.display_text
        );
    }

    let text_written = write_if_changed(registry, GAME_UNIT, 0, &view.game_name)?;
    if text_written {
        tracing::info!(
            "[Steam] Updated game name device with value '{}'",
            view.game_name
        );
    }

    Ok(ReconcileReport {
        view,
        created,
        selector_written,
        text_written,
    })
}

fn write_if_changed<R: DeviceRegistry>(
    registry: &mut R,
    unit: u8,
    n_value: i32,
    s_value: &str,
) -> AppResult<bool> {
    if registry.get(unit).map_or(false, |d| d.holds(n_value, s_value)) {
        tracing::debug!("[Steam] Device {} unchanged, skipping", unit);
        return Ok(false);
    }
    registry.update(unit, n_value, s_value)?;
    Ok(true)
}
