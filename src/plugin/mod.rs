//! Steam presence plugin
//!
//! `SteamPlugin` is the single application object the host dispatches to.
//! Each handler corresponds to one host callback; the host (see `runtime`)
//! performs the network phases and reports their outcome back.

pub mod reconcile;
pub mod state;

use std::time::Duration;

pub use reconcile::ReconcileReport;
pub use state::PluginState;

use crate::config::Config;
use crate::config::SteamConfig;
use crate::error::AppError;
use crate::host::{DeviceRegistry, ImageRegistry, Parameters, PARAM_DEBUG, PARAM_STEAM_ID};
use crate::steam::{map_snapshot, parse_profile, ProfileRequest};

/// Image key of the plugin icon
pub const ICON_KEY: &str = "steam";

/// Icon archive shipped with the plugin
pub const ICON_ARCHIVE: &str = "Steam-Icons.zip";

pub struct SteamPlugin<H> {
    host: H,
    steam: SteamConfig,
    heartbeat: Duration,
    steam_id: String,
    image: Option<u32>,
    state: PluginState,
}

impl<H: DeviceRegistry + ImageRegistry> SteamPlugin<H> {
    pub fn new(host: H, config: &Config) -> Self {
        Self {
            host,
            steam: config.steam.clone(),
            heartbeat: Duration::from_secs(config.plugin.heartbeat_secs.max(1)),
            steam_id: String::new(),
            image: None,
            state: PluginState::Uninitialized,
        }
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn steam_id(&self) -> &str {
        &self.steam_id
    }

    /// Read parameters and load icons. Returns the heartbeat period to arm,
    /// or `None` when the plugin cannot run.
    pub fn on_start(&mut self, params: &dyn Parameters) -> Option<Duration> {
        if self.state != PluginState::Uninitialized {
            tracing::warn!("[Steam] onStart called in state {}, ignoring", self.state);
            return None;
        }

        tracing::info!("[Steam] onStart called");
        if let Some(mask) = params.get(PARAM_DEBUG) {
            tracing::debug!("[Steam] Debug mask: {}", mask);
        }

        self.load_icons();

        let steam_id = params.get(PARAM_STEAM_ID).unwrap_or_default().trim();
        if steam_id.is_empty() {
            let e = AppError::Config(format!("{} (SteamId) not provided", PARAM_STEAM_ID));
            tracing::error!("[Steam] {}", e);
            return None;
        }

        self.steam_id = steam_id.to_string();
        self.state = PluginState::Idle;
        tracing::info!(
            "[Steam] Polling profile '{}' every {}s",
            self.steam_id,
            self.heartbeat.as_secs()
        );
        Some(self.heartbeat)
    }

    fn load_icons(&mut self) {
        match self.host.image_id(ICON_KEY) {
            Some(id) => {
                tracing::debug!("[Steam] Icon '{}' found: {}", ICON_KEY, id);
                self.image = Some(id);
            }
            None => match self.host.create_from_archive(ICON_KEY, ICON_ARCHIVE) {
                Ok(id) => {
                    tracing::info!("[Steam] Icon added from {}", ICON_ARCHIVE);
                    self.image = Some(id);
                }
                Err(e) => tracing::warn!("[Steam] Failed to load icons: {}", e),
            },
        }
        tracing::debug!("[Steam] Available icons: {:?}", self.host.keys());
    }

    /// Timer tick. Returns the request to issue, if any.
    pub fn on_heartbeat(&mut self) -> Option<ProfileRequest> {
        match self.state {
            PluginState::Idle => {}
            PluginState::Uninitialized => {
                tracing::error!("[Steam] Plugin not properly initialized, skipping heartbeat");
                return None;
            }
            PluginState::Stopped => return None,
            state => {
                tracing::warn!("[Steam] Previous request still {}, skipping heartbeat", state);
                return None;
            }
        }

        tracing::debug!("[Steam] Heartbeat called");
        match ProfileRequest::build(&self.steam, &self.steam_id) {
            Ok(request) => {
                self.state = PluginState::Connecting;
                Some(request)
            }
            Err(e) => {
                tracing::error!("[Steam] Failed to build profile request: {}", e);
                None
            }
        }
    }

    /// Outcome of the connection phase
    pub fn on_connect(&mut self, result: Result<(), AppError>) {
        if self.state != PluginState::Connecting {
            tracing::warn!("[Steam] Unexpected connect result in state {}", self.state);
            return;
        }

        match result {
            Ok(()) => self.state = PluginState::AwaitingResponse,
            Err(e) => {
                tracing::error!("[Steam] Error fetching Steam data: {}", e);
                self.state = PluginState::Idle;
            }
        }
    }

    /// Connection dropped before a message arrived
    pub fn on_disconnect(&mut self, error: AppError) {
        if !self.state.in_flight() {
            return;
        }
        tracing::error!("[Steam] Error fetching Steam data: {}", error);
        self.state = PluginState::Idle;
    }

    /// Response body received: parse, map and reconcile
    pub fn on_message(&mut self, body: &str) -> Option<ReconcileReport> {
        if self.state != PluginState::AwaitingResponse {
            tracing::warn!("[Steam] Unexpected message in state {}", self.state);
            return None;
        }
        self.state = PluginState::Reconciling;

        let report = self.reconcile(body);
        self.state = PluginState::Idle;
        report
    }

    fn reconcile(&mut self, body: &str) -> Option<ReconcileReport> {
        let snapshot = match parse_profile(body) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("[Steam] Error parsing XML data: {}", e);
                return None;
            }
        };

        tracing::debug!(
            "[Steam] Extracted steam_name={:?}, online_state={:?}, state_message={:?}",
            snapshot.steam_name,
            snapshot.online_state,
            snapshot.state_message
        );

        let view = map_snapshot(&snapshot);
        tracing::debug!("[Steam] Extracted game_name: {}", view.game_name);

        let steam_name = snapshot.steam_name.as_deref().unwrap_or(&self.steam_id);
        match reconcile::reconcile(&mut self.host, steam_name, self.image, view) {
            Ok(report) => {
                if !report.changed() {
                    tracing::debug!(
                        "[Steam] Presence unchanged: {} ({})",
                        report.view.display_text,
                        report.view.state
                    );
                }
                Some(report)
            }
            Err(e) => {
                tracing::error!("[Steam] Failed to update devices: {}", e);
                None
            }
        }
    }

    pub fn on_stop(&mut self) {
        self.state = PluginState::Stopped;
        tracing::info!("[Steam] Stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppResult;
    use crate::host::{HostParameters, MemoryHost};
    use crate::models::{DeviceRecord, NewDevice, GAME_UNIT, NO_GAME, STATUS_UNIT};

    const PORTAL: &str = "<response><steamID>Ex Ample</steamID><onlineState>in-game</onlineState>\
                          <stateMessage>Currently In-Game<br/>Portal 2</stateMessage></response>";

    fn params(steam_id: &str) -> HostParameters {
        let mut params = HostParameters::new();
        params.insert(PARAM_STEAM_ID, steam_id);
        params.insert(PARAM_DEBUG, "0");
        params
    }

    fn started(steam_id: &str) -> SteamPlugin<MemoryHost> {
        let mut plugin = SteamPlugin::new(MemoryHost::new(), &Config::default());
        assert!(plugin.on_start(&params(steam_id)).is_some());
        plugin
    }

    /// Drive one full fetch cycle with the given body
    fn cycle<H>(plugin: &mut SteamPlugin<H>, body: &str) -> Option<ReconcileReport>
    where
        H: DeviceRegistry + ImageRegistry,
    {
        plugin.on_heartbeat().expect("request issued");
        plugin.on_connect(Ok(()));
        plugin.on_message(body)
    }

    /// Host whose icon archive or device writes can be made to fail
    #[derive(Default)]
    struct FlakyHost {
        inner: MemoryHost,
        fail_icons: bool,
        fail_writes: bool,
    }

    impl DeviceRegistry for FlakyHost {
        fn get(&self, unit: u8) -> Option<&DeviceRecord> {
            self.inner.get(unit)
        }

        fn create(&mut self, device: NewDevice) -> AppResult<()> {
            if self.fail_writes {
                return Err(AppError::Device(format!("Unit {} is read-only", device.unit)));
            }
            self.inner.create(device)
        }

        fn update(&mut self, unit: u8, n_value: i32, s_value: &str) -> AppResult<()> {
            if self.fail_writes {
                return Err(AppError::Device(format!("Unit {} is read-only", unit)));
            }
            self.inner.update(unit, n_value, s_value)
        }
    }

    impl ImageRegistry for FlakyHost {
        fn image_id(&self, key: &str) -> Option<u32> {
            self.inner.image_id(key)
        }

        fn create_from_archive(&mut self, key: &str, archive: &str) -> AppResult<u32> {
            if self.fail_icons {
                return Err(AppError::Device(format!("Cannot read {}", archive)));
            }
            self.inner.create_from_archive(key, archive)
        }

        fn keys(&self) -> Vec<String> {
            self.inner.keys()
        }
    }

    #[test]
    fn test_end_to_end() {
        let mut plugin = started("exampleuser");
        let request = plugin.on_heartbeat().unwrap();
        assert!(request.url.path().ends_with("/id/exampleuser/"));
        assert_eq!(plugin.state(), PluginState::Connecting);

        plugin.on_connect(Ok(()));
        assert_eq!(plugin.state(), PluginState::AwaitingResponse);

        let report = plugin.on_message(PORTAL).unwrap();
        assert_eq!(plugin.state(), PluginState::Idle);
        assert_eq!(report.view.level, 20);
        assert_eq!(report.view.display_text, "In-Game: Portal 2");
        assert_eq!(report.view.game_name, "Portal 2");

        let host = plugin.host();
        assert!(host.get(STATUS_UNIT).unwrap().holds(20, "20"));
        assert_eq!(host.get(STATUS_UNIT).unwrap().name, "Ex Ample Status");
        assert_eq!(host.get(GAME_UNIT).unwrap().s_value, "Portal 2");
    }

    #[test]
    fn test_empty_identifier() {
        let mut plugin = SteamPlugin::new(MemoryHost::new(), &Config::default());
        assert_eq!(plugin.on_start(&params("  ")), None);
        assert_eq!(plugin.state(), PluginState::Uninitialized);

        assert!(plugin.on_heartbeat().is_none());
        assert_eq!(plugin.host().devices().count(), 0);
        assert_eq!(plugin.host().write_count(), 0);
    }

    #[test]
    fn test_missing_identifier_parameter() {
        let mut plugin = SteamPlugin::new(MemoryHost::new(), &Config::default());
        assert_eq!(plugin.on_start(&HostParameters::new()), None);
        assert_eq!(plugin.state(), PluginState::Uninitialized);
    }

    #[test]
    fn test_start_arms_heartbeat_and_loads_icon() {
        let mut plugin = SteamPlugin::new(MemoryHost::new(), &Config::default());
        assert_eq!(
            plugin.on_start(&params("exampleuser")),
            Some(Duration::from_secs(30))
        );
        assert!(plugin.host().image_id(ICON_KEY).is_some());
        assert_eq!(plugin.steam_id(), "exampleuser");

        cycle(&mut plugin, PORTAL).unwrap();
        let icon = plugin.host().image_id(ICON_KEY);
        assert_eq!(plugin.host().get(STATUS_UNIT).unwrap().image, icon);
    }

    #[test]
    fn test_in_flight_guard() {
        let mut plugin = started("exampleuser");
        assert!(plugin.on_heartbeat().is_some());
        assert!(plugin.on_heartbeat().is_none());

        plugin.on_connect(Ok(()));
        assert!(plugin.on_heartbeat().is_none());

        plugin.on_message(PORTAL);
        assert!(plugin.on_heartbeat().is_some());
    }

    #[test]
    fn test_transport_failure_returns_to_idle() {
        let mut plugin = started("exampleuser");
        plugin.on_heartbeat().unwrap();
        plugin.on_connect(Err(AppError::Status(503)));
        assert_eq!(plugin.state(), PluginState::Idle);
        assert_eq!(plugin.host().write_count(), 0);

        plugin.on_heartbeat().unwrap();
        plugin.on_connect(Ok(()));
        plugin.on_disconnect(AppError::Status(500));
        assert_eq!(plugin.state(), PluginState::Idle);
        assert!(plugin.on_message(PORTAL).is_none());
    }

    #[test]
    fn test_parse_failure_leaves_devices() {
        let mut plugin = started("exampleuser");
        cycle(&mut plugin, PORTAL).unwrap();
        let writes = plugin.host().write_count();

        assert!(cycle(&mut plugin, "<response><steamID>").is_none());
        assert!(cycle(&mut plugin, "").is_none());
        assert!(cycle(
            &mut plugin,
            "<response><error>The specified profile could not be found.</error></response>"
        )
        .is_none());

        assert_eq!(plugin.state(), PluginState::Idle);
        assert_eq!(plugin.host().write_count(), writes);
        assert_eq!(plugin.host().get(GAME_UNIT).unwrap().s_value, "Portal 2");
    }

    #[test]
    fn test_truncated_body_leaves_devices() {
        let mut plugin = started("exampleuser");
        cycle(&mut plugin, PORTAL).unwrap();
        let writes = plugin.host().write_count();

        let truncated = "<response><steamID>Ex Ample</steamID>\
                         <onlineState>in-game</onlineState>\
                         <stateMessage>Currently In-Game<br/>Port";
        assert!(cycle(&mut plugin, truncated).is_none());

        assert_eq!(plugin.state(), PluginState::Idle);
        assert_eq!(plugin.host().write_count(), writes);
        assert_eq!(plugin.host().get(GAME_UNIT).unwrap().s_value, "Portal 2");
        assert!(plugin.host().get(STATUS_UNIT).unwrap().holds(20, "20"));
    }

    #[test]
    fn test_icon_failure_still_starts() {
        let host = FlakyHost {
            fail_icons: true,
            ..Default::default()
        };
        let mut plugin = SteamPlugin::new(host, &Config::default());
        assert_eq!(
            plugin.on_start(&params("exampleuser")),
            Some(Duration::from_secs(30))
        );
        assert!(plugin.host().keys().is_empty());

        let report = cycle(&mut plugin, PORTAL).unwrap();
        assert_eq!(report.created, vec![STATUS_UNIT, GAME_UNIT]);
        assert_eq!(plugin.host().get(STATUS_UNIT).unwrap().image, None);
        assert_eq!(plugin.host().get(GAME_UNIT).unwrap().image, None);
        assert_eq!(plugin.host().get(GAME_UNIT).unwrap().s_value, "Portal 2");
    }

    #[test]
    fn test_registry_failure_returns_to_idle() {
        let host = FlakyHost {
            fail_writes: true,
            ..Default::default()
        };
        let mut plugin = SteamPlugin::new(host, &Config::default());
        assert!(plugin.on_start(&params("exampleuser")).is_some());

        assert!(cycle(&mut plugin, PORTAL).is_none());
        assert_eq!(plugin.state(), PluginState::Idle);
        assert_eq!(plugin.host().inner.devices().count(), 0);

        // Next heartbeat is still issued and succeeds once the host recovers
        plugin.host.fail_writes = false;
        let report = cycle(&mut plugin, PORTAL).unwrap();
        assert!(report.changed());
        assert_eq!(plugin.host().inner.write_count(), 2);
    }

    #[test]
    fn test_unchanged_presence_skips_writes() {
        let mut plugin = started("exampleuser");
        cycle(&mut plugin, PORTAL).unwrap();
        assert_eq!(plugin.host().write_count(), 2);

        let report = cycle(&mut plugin, PORTAL).unwrap();
        assert!(!report.changed());
        assert_eq!(plugin.host().write_count(), 2);

        let offline = "<response><steamID>Ex Ample</steamID><onlineState>offline</onlineState>\
                       <stateMessage>Offline</stateMessage></response>";
        let report = cycle(&mut plugin, offline).unwrap();
        assert!(report.selector_written);
        assert!(report.text_written);
        assert!(plugin.host().get(STATUS_UNIT).unwrap().holds(0, "0"));
        assert_eq!(plugin.host().get(GAME_UNIT).unwrap().s_value, NO_GAME);
    }

    #[test]
    fn test_missing_fields_degrade() {
        let mut plugin = started("exampleuser");
        let report = cycle(&mut plugin, "<profile><steamID>Ex Ample</steamID></profile>").unwrap();
        assert_eq!(report.view.level, 0);
        assert_eq!(report.view.game_name, NO_GAME);
    }

    #[test]
    fn test_device_name_falls_back_to_identifier() {
        let mut plugin = started("exampleuser");
        cycle(&mut plugin, "<profile><onlineState>online</onlineState></profile>").unwrap();
        assert_eq!(
            plugin.host().get(STATUS_UNIT).unwrap().name,
            "exampleuser Status"
        );
    }

    #[test]
    fn test_stop() {
        let mut plugin = started("exampleuser");
        plugin.on_heartbeat().unwrap();
        plugin.on_stop();
        assert_eq!(plugin.state(), PluginState::Stopped);

        plugin.on_connect(Ok(()));
        assert!(plugin.on_message(PORTAL).is_none());
        assert!(plugin.on_heartbeat().is_none());
        assert_eq!(plugin.host().write_count(), 0);
    }
}
