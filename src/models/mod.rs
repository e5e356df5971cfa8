//! Data models for steam-presence-bridge

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

// ============================================================================
// Presence Models
// ============================================================================

/// Game name reported when the state message carries none
pub const NO_GAME: &str = "No Game";

/// Selector level names, indexed by `level / 10`
pub const LEVEL_NAMES: &str = "Offline|Online|In-Game";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnlineState {
    Offline,
    Online,
    InGame,
}

impl OnlineState {
    /// Lenient mapping used for feed values: anything unrecognised is offline.
    pub fn from_feed(value: &str) -> Self {
        value.trim().parse().unwrap_or(OnlineState::Offline)
    }

    /// Selector level (0, 10, 20)
    pub fn level(self) -> i32 {
        match self {
            OnlineState::Offline => 0,
            OnlineState::Online => 10,
            OnlineState::InGame => 20,
        }
    }

    /// Human name shown by the selector switch
    pub fn label(self) -> &'static str {
        LEVEL_NAMES
            .split('|')
            .nth((self.level() / 10) as usize)
            .unwrap_or("Offline")
    }
}

impl std::fmt::Display for OnlineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnlineState::Offline => write!(f, "offline"),
            OnlineState::Online => write!(f, "online"),
            OnlineState::InGame => write!(f, "in-game"),
        }
    }
}

impl std::str::FromStr for OnlineState {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offline" => Ok(OnlineState::Offline),
            "online" => Ok(OnlineState::Online),
            "in-game" => Ok(OnlineState::InGame),
            _ => Err(format!("Unknown online state: {}", s)),
        }
    }
}

/// Raw fields of one profile fetch. Every field is optional in the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub steam_name: Option<String>,
    pub online_state: Option<String>,
    pub state_message: Option<String>,
}

/// Mapped presence derived from a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceView {
    pub state: OnlineState,
    pub level: i32,
    pub display_text: String,
    pub game_name: String,
}

// ============================================================================
// Device Models
// ============================================================================

/// Unit index of the status selector switch
pub const STATUS_UNIT: u8 = 1;

/// Unit index of the game name text device
pub const GAME_UNIT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Selector,
    Text,
}

impl DeviceKind {
    /// Type name understood by the host
    pub fn type_name(self) -> &'static str {
        match self {
            DeviceKind::Selector => "Selector Switch",
            DeviceKind::Text => "Text",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Device definition handed to the registry on creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub unit: u8,
    pub name: String,
    pub kind: DeviceKind,
    pub options: BTreeMap<String, String>,
    pub image: Option<u32>,
}

impl NewDevice {
    pub fn selector(unit: u8, name: impl Into<String>, image: Option<u32>) -> Self {
        let options = [
            ("LevelActions", "||"),
            ("LevelNames", LEVEL_NAMES),
            ("LevelOffHidden", "false"),
            ("SelectorStyle", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            unit,
            name: name.into(),
            kind: DeviceKind::Selector,
            options,
            image,
        }
    }

    pub fn text(unit: u8, name: impl Into<String>, image: Option<u32>) -> Self {
        Self {
            unit,
            name: name.into(),
            kind: DeviceKind::Text,
            options: BTreeMap::new(),
            image,
        }
    }
}

/// Device as stored by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub unit: u8,
    pub name: String,
    pub kind: DeviceKind,
    pub n_value: i32,
    pub s_value: String,
    pub options: BTreeMap<String, String>,
    pub image: Option<u32>,
    pub last_update: Option<DateTime<Utc>>,
}

impl DeviceRecord {
    pub fn from_new(device: NewDevice) -> Self {
        Self {
            unit: device.unit,
            name: device.name,
            kind: device.kind,
            n_value: 0,
            s_value: String::new(),
            options: device.options,
            image: device.image,
            last_update: None,
        }
    }

    pub fn holds(&self, n_value: i32, s_value: &str) -> bool {
        self.n_value == n_value && self.s_value == s_value
    }
}
