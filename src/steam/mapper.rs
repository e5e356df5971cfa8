//! Snapshot to presence mapping

use crate::models::{OnlineState, PresenceView, StatusSnapshot, NO_GAME};

/// Marker separating the status line from the game name in `stateMessage`
pub const LINE_BREAK: &str = "<br/>";

/// Map raw feed fields to selector level, display text and game name.
pub fn map_presence(online_state: Option<&str>, state_message: Option<&str>) -> PresenceView {
    let state = online_state
        .map(OnlineState::from_feed)
        .unwrap_or(OnlineState::Offline);
    let game_name = extract_game_name(state_message);

    let display_text = match state {
        OnlineState::InGame => format!("{}: {}", state.label(), game_name),
        _ => state.label().to_string(),
    };

    PresenceView {
        state,
        level: state.level(),
        display_text,
        game_name,
    }
}

pub fn map_snapshot(snapshot: &StatusSnapshot) -> PresenceView {
    map_presence(
        snapshot.online_state.as_deref(),
        snapshot.state_message.as_deref(),
    )
}

/// Text after the first line break, or `NO_GAME`
pub fn extract_game_name(state_message: Option<&str>) -> String {
    state_message
        .and_then(|message| message.split_once(LINE_BREAK))
        .map(|(_, game)| game.trim())
        .filter(|game| !game.is_empty())
        .unwrap_or(NO_GAME)
        .to_string()
}
