//! Types for Music Assistant API requests and responses.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Configuration for connecting to a Music Assistant server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server (e.g., "http://homeassistant.local:8095")
    pub url: String,
    /// Long-lived API token, sent as a bearer token when present
    pub token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new client config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Attach an API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Kind of media item known to Music Assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Artist,
    Album,
    Track,
    Playlist,
    Radio,
    Audiobook,
    Podcast,
    #[serde(other)]
    Unknown,
}

impl MediaType {
    /// Key holding this media type in a `music/search` response.
    pub fn search_key(&self) -> &'static str {
        match self {
            MediaType::Artist => "artists",
            MediaType::Album => "albums",
            MediaType::Track => "tracks",
            MediaType::Playlist => "playlists",
            MediaType::Radio => "radio",
            MediaType::Audiobook => "audiobooks",
            MediaType::Podcast => "podcasts",
            MediaType::Unknown => "unknown",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Artist => "artist",
            MediaType::Album => "album",
            MediaType::Track => "track",
            MediaType::Playlist => "playlist",
            MediaType::Radio => "radio",
            MediaType::Audiobook => "audiobook",
            MediaType::Podcast => "podcast",
            MediaType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback state reported by a player or queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Paused,
    Playing,
    Stopped,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Paused => "paused",
            PlaybackState::Playing => "playing",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Unknown => "unknown",
        }
    }

    /// Capitalized form for log lines ("Playing").
    pub fn title(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `player_queues/play_media` inserts media into a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOption {
    #[default]
    Play,
    Replace,
    Next,
    ReplaceNext,
    Add,
}

impl QueueOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueOption::Play => "play",
            QueueOption::Replace => "replace",
            QueueOption::Next => "next",
            QueueOption::ReplaceNext => "replace_next",
            QueueOption::Add => "add",
        }
    }
}

// =============================================================================
// Player Types
// =============================================================================

/// A player as returned by `players/all`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Player {
    pub player_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub provider: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub powered: Option<bool>,
    /// Current servers report `playback_state`
    #[serde(default)]
    pub playback_state: Option<PlaybackState>,
    /// Older servers report `state`
    #[serde(default)]
    pub state: Option<PlaybackState>,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub volume_level: Option<u8>,
    #[serde(default)]
    pub volume_muted: Option<bool>,
    #[serde(default)]
    pub current_media: Option<PlayerMedia>,
    #[serde(default)]
    pub current_item_id: Option<String>,
    #[serde(default)]
    pub active_source: Option<String>,
}

impl Player {
    /// Playback state, preferring the newer field name.
    pub fn current_state(&self) -> PlaybackState {
        self.playback_state
            .or(self.state)
            .unwrap_or(PlaybackState::Unknown)
    }

    pub fn is_muted(&self) -> bool {
        self.volume_muted.unwrap_or(false)
    }
}

/// Media currently loaded on a player.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerMedia {
    #[serde(default, deserialize_with = "nullable_string")]
    pub uri: String,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub queue_id: Option<String>,
    #[serde(default)]
    pub queue_item_id: Option<String>,
}

/// Condensed player state used for status lines and "what's playing".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStateSummary {
    pub state: PlaybackState,
    pub powered: bool,
    pub volume_level: Option<u8>,
    pub volume_muted: bool,
    pub current_track: String,
    pub player_name: String,
}

// =============================================================================
// Media Types
// =============================================================================

/// Lightweight reference to another media item (an artist on a track, ...).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ItemMapping {
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub provider: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

/// A media item from search results or a queue.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub provider: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub uri: String,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub artists: Vec<ItemMapping>,
    /// Single-artist form sent by some providers
    #[serde(default)]
    pub artist: Option<ItemMapping>,
    #[serde(default)]
    pub album: Option<ItemMapping>,
}

impl MediaItem {
    /// All artist names attached to the item, in server order.
    pub fn artist_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.artists.iter().map(|a| a.name.as_str()).collect();
        if let Some(artist) = &self.artist {
            if !names.contains(&artist.name.as_str()) {
                names.push(artist.name.as_str());
            }
        }
        names.retain(|n| !n.is_empty());
        names
    }

    /// First artist name, if any.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artist_names().into_iter().next()
    }
}

/// Response of `music/search`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub artists: Vec<MediaItem>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub albums: Vec<MediaItem>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tracks: Vec<MediaItem>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub playlists: Vec<MediaItem>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub radio: Vec<MediaItem>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub audiobooks: Vec<MediaItem>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub podcasts: Vec<MediaItem>,
}

impl SearchResults {
    /// Results for one media type.
    pub fn items(&self, media_type: MediaType) -> &[MediaItem] {
        match media_type {
            MediaType::Artist => &self.artists,
            MediaType::Album => &self.albums,
            MediaType::Track => &self.tracks,
            MediaType::Playlist => &self.playlists,
            MediaType::Radio => &self.radio,
            MediaType::Audiobook => &self.audiobooks,
            MediaType::Podcast => &self.podcasts,
            MediaType::Unknown => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
            && self.albums.is_empty()
            && self.tracks.is_empty()
            && self.playlists.is_empty()
            && self.radio.is_empty()
            && self.audiobooks.is_empty()
            && self.podcasts.is_empty()
    }
}

// =============================================================================
// Queue Types
// =============================================================================

/// An entry in a player queue.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueueItem {
    #[serde(default, deserialize_with = "nullable_string")]
    pub queue_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub queue_item_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub media_item: Option<MediaItem>,
}

/// A player queue as returned by `player_queues/get_active_queue`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerQueue {
    #[serde(default, deserialize_with = "nullable_string")]
    pub queue_id: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
    #[serde(default)]
    pub available: bool,
    /// Number of items in the queue
    #[serde(default)]
    pub items: u64,
    #[serde(default)]
    pub shuffle_enabled: bool,
    #[serde(default)]
    pub current_index: Option<i64>,
    #[serde(default)]
    pub current_item: Option<QueueItem>,
    #[serde(default)]
    pub state: Option<PlaybackState>,
}

// =============================================================================
// Wire helpers
// =============================================================================

/// Command envelope posted to `/api`.
#[derive(Debug, Serialize)]
pub(crate) struct CommandRequest<'a> {
    pub command: &'a str,
    pub message_id: String,
    pub args: &'a Value,
}

fn default_true() -> bool {
    true
}

/// Accepts any JSON number as a 0-100 percentage.
fn lenient_percent<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .map(|level| level.round().clamp(0.0, 100.0) as u8))
}

/// Item ids are strings on current servers and integers on some providers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Treats an explicit `null` like a missing key.
fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_accepts_either_state_field() {
        let newer: Player = serde_json::from_value(json!({
            "player_id": "a",
            "name": "Kitchen",
            "playback_state": "playing"
        }))
        .unwrap();
        assert_eq!(newer.current_state(), PlaybackState::Playing);

        let older: Player = serde_json::from_value(json!({
            "player_id": "b",
            "name": "Office",
            "state": "paused"
        }))
        .unwrap();
        assert_eq!(older.current_state(), PlaybackState::Paused);
    }

    #[test]
    fn test_unrecognised_state_is_unknown() {
        let player: Player = serde_json::from_value(json!({
            "player_id": "a",
            "playback_state": "buffering"
        }))
        .unwrap();
        assert_eq!(player.current_state(), PlaybackState::Unknown);
        assert!(player.available);
    }

    #[test]
    fn test_volume_level_is_lenient() {
        let player: Player = serde_json::from_value(json!({
            "player_id": "a",
            "volume_level": 42.6
        }))
        .unwrap();
        assert_eq!(player.volume_level, Some(43));

        let player: Player = serde_json::from_value(json!({
            "player_id": "a",
            "volume_level": null
        }))
        .unwrap();
        assert_eq!(player.volume_level, None);
    }

    #[test]
    fn test_null_player_name_does_not_drop_the_list() {
        let players: Vec<Player> = serde_json::from_value(json!([
            {"player_id": "a", "name": null, "provider": null},
            {"player_id": "b", "name": "Kitchen", "provider": "sonos"}
        ]))
        .unwrap();

        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "");
        assert_eq!(players[0].provider, "");
        assert_eq!(players[1].name, "Kitchen");
    }

    #[test]
    fn test_media_item_artist_forms() {
        let item: MediaItem = serde_json::from_value(json!({
            "item_id": 204,
            "name": "Life Less Ordinary",
            "uri": "library://track/204",
            "artists": [{"item_id": "1", "name": "Carbon Leaf"}],
            "artist": {"name": "Carbon Leaf"}
        }))
        .unwrap();
        assert_eq!(item.item_id, "204");
        assert_eq!(item.artist_names(), vec!["Carbon Leaf"]);

        let single: MediaItem = serde_json::from_value(json!({
            "name": "Test Song",
            "artist": {"name": "Test Artist"}
        }))
        .unwrap();
        assert_eq!(single.primary_artist(), Some("Test Artist"));
    }

    #[test]
    fn test_search_results_tolerate_missing_and_null_keys() {
        let results: SearchResults = serde_json::from_value(json!({
            "artists": [{"name": "Test Artist", "uri": "test://artist/1"}],
            "tracks": null
        }))
        .unwrap();
        assert_eq!(results.items(MediaType::Artist).len(), 1);
        assert!(results.items(MediaType::Track).is_empty());
        assert!(results.items(MediaType::Radio).is_empty());
        assert!(!results.is_empty());
    }

    #[test]
    fn test_media_type_keys() {
        assert_eq!(MediaType::Artist.search_key(), "artists");
        assert_eq!(MediaType::Radio.search_key(), "radio");
        assert_eq!(
            serde_json::to_value(MediaType::Playlist).unwrap(),
            json!("playlist")
        );
        assert_eq!(
            serde_json::to_value(QueueOption::ReplaceNext).unwrap(),
            json!("replace_next")
        );
    }

    #[test]
    fn test_state_title() {
        assert_eq!(PlaybackState::Playing.title(), "Playing");
        assert_eq!(PlaybackState::Unknown.title(), "Unknown");
    }
}
