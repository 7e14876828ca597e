//! Compact status formatting for player state log lines.

use crate::types::{PlaybackState, PlayerStateSummary};

/// Map a playback state to its status emoji.
pub fn status_emoji(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "▶️",
        PlaybackState::Paused => "⏸️",
        PlaybackState::Stopped => "⏹️",
        PlaybackState::Idle => "💤",
        PlaybackState::Unknown => "❓",
    }
}

pub fn power_display(powered: bool) -> &'static str {
    if powered {
        "🔌"
    } else {
        "🔌❌"
    }
}

/// Volume with mute status, e.g. "🔊 50%" or "🔇 ?".
pub fn volume_display(volume_level: Option<u8>, volume_muted: bool) -> String {
    let emoji = if volume_muted { "🔇" } else { "🔊" };
    match volume_level {
        Some(level) => format!("{} {}%", emoji, level),
        None => format!("{} ?", emoji),
    }
}

/// One-line summary: "▶️ Playing | 🔌 | 🔊 75%".
pub fn status_line(summary: &PlayerStateSummary) -> String {
    format!(
        "{} {} | {} | {}",
        status_emoji(summary.state),
        summary.state.title(),
        power_display(summary.powered),
        volume_display(summary.volume_level, summary.volume_muted)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_emoji() {
        assert_eq!(status_emoji(PlaybackState::Playing), "▶️");
        assert_eq!(status_emoji(PlaybackState::Paused), "⏸️");
        assert_eq!(status_emoji(PlaybackState::Stopped), "⏹️");
        assert_eq!(status_emoji(PlaybackState::Idle), "💤");
        assert_eq!(status_emoji(PlaybackState::Unknown), "❓");
    }

    #[test]
    fn test_power_display() {
        assert_eq!(power_display(true), "🔌");
        assert_eq!(power_display(false), "🔌❌");
    }

    #[test]
    fn test_volume_display() {
        assert_eq!(volume_display(Some(50), false), "🔊 50%");
        assert_eq!(volume_display(Some(50), true), "🔇 50%");
        assert_eq!(volume_display(None, false), "🔊 ?");
    }

    #[test]
    fn test_status_line() {
        let summary = PlayerStateSummary {
            state: PlaybackState::Playing,
            powered: true,
            volume_level: Some(75),
            volume_muted: false,
            current_track: "Test Artist - Test Song".into(),
            player_name: "Test Player".into(),
        };
        assert_eq!(status_line(&summary), "▶️ Playing | 🔌 | 🔊 75%");
    }
}
