//! Main Music Assistant client.

use crate::display;
use crate::error::{ClientError, Result};
use crate::recorder::FixtureRecorder;
use crate::types::{
    ClientConfig, CommandRequest, MediaType, Player, PlayerQueue, PlayerStateSummary, QueueItem,
    QueueOption, SearchResults,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Track description used when nothing is loaded.
pub const NO_TRACK: &str = "No track";

/// Client for the Music Assistant HTTP command API.
///
/// Every operation is a single `POST /api` carrying a command name and its
/// arguments; the response body is the command result.
///
/// # Example
///
/// ```ignore
/// use mass_client::{ClientConfig, MassClient};
///
/// let client = MassClient::new(ClientConfig::new("http://localhost:8095"))?;
/// for player in client.get_players().await? {
///     println!("{} ({})", player.name, player.player_id);
/// }
/// client.queue_command_pause("media_player.office").await?;
/// ```
pub struct MassClient {
    http: Client,
    server_url: String,
    api_url: String,
    token: Option<String>,
    recorder: Option<FixtureRecorder>,
}

impl MassClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let server_url = config.url.trim_end_matches('/').to_string();
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&server_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("mass-skill/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        let api_url = format!("{}/api", server_url);

        Ok(Self {
            http,
            server_url,
            api_url,
            token: config.token,
            recorder: None,
        })
    }

    /// Record every successful command as a fixture file.
    pub fn with_recorder(mut self, recorder: FixtureRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn recorder(&self) -> Option<&FixtureRecorder> {
        self.recorder.as_ref()
    }

    /// Server URL without trailing slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Command endpoint (`<server>/api`).
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Send a command and return the raw JSON result.
    pub async fn send_command_raw(&self, command: &str, args: Value) -> Result<Value> {
        let request = CommandRequest {
            command,
            message_id: uuid::Uuid::new_v4().simple().to_string(),
            args: &args,
        };

        debug!(command = %command, message_id = %request.message_id, "Sending command");

        let mut builder = self.http.post(&self.api_url).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ClientError::ServerUnreachable(e.to_string())
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            warn!(command = %command, status = status.as_u16(), "Command rejected");
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let value: Value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).map_err(|e| {
                ClientError::ParseError(format!("Invalid JSON for {}: {}", command, e))
            })?
        };

        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.record(command, &args, &value).await {
                warn!(command = %command, error = %e, "Failed to record fixture");
            }
        }

        Ok(value)
    }

    /// Send a command and deserialize its result.
    pub async fn send_command<T: DeserializeOwned>(&self, command: &str, args: Value) -> Result<T> {
        let value = self.send_command_raw(command, args).await?;
        serde_json::from_value(value).map_err(|e| {
            ClientError::ParseError(format!("Unexpected result for {}: {}", command, e))
        })
    }

    async fn send_void(&self, command: &str, args: Value) -> Result<()> {
        self.send_command_raw(command, args).await.map(|_| ())
    }

    // =========================================================================
    // Players and search
    // =========================================================================

    /// Get all available players.
    pub async fn get_players(&self) -> Result<Vec<Player>> {
        let players: Vec<Player> = self.send_command("players/all", json!({})).await?;
        debug!(count = players.len(), "Fetched players");
        Ok(players)
    }

    /// Find a player by id.
    pub async fn get_player(&self, player_id: &str) -> Result<Option<Player>> {
        let players = self.get_players().await?;
        Ok(players.into_iter().find(|p| p.player_id == player_id))
    }

    /// Search the library and providers. `media_types` is omitted from the
    /// request when empty, which searches every type.
    pub async fn search_media(
        &self,
        query: &str,
        media_types: &[MediaType],
        limit: u32,
    ) -> Result<SearchResults> {
        let mut args = json!({ "search_query": query, "limit": limit });
        if !media_types.is_empty() {
            args["media_types"] = json!(media_types);
        }
        self.send_command("music/search", args).await
    }

    // =========================================================================
    // Queue commands
    // =========================================================================

    /// Play media on a player queue.
    pub async fn play_media(
        &self,
        queue_id: &str,
        media: &str,
        option: QueueOption,
        radio_mode: bool,
    ) -> Result<()> {
        info!(
            queue_id = %queue_id,
            media = %media,
            option = option.as_str(),
            radio_mode,
            "Sending play_media"
        );
        self.send_void(
            "player_queues/play_media",
            json!({
                "queue_id": queue_id,
                "media": media,
                "option": option,
                "radio_mode": radio_mode,
            }),
        )
        .await
    }

    pub async fn queue_command_play(&self, queue_id: &str) -> Result<()> {
        self.send_void("player_queues/play", json!({ "queue_id": queue_id }))
            .await
    }

    pub async fn queue_command_pause(&self, queue_id: &str) -> Result<()> {
        self.send_void("player_queues/pause", json!({ "queue_id": queue_id }))
            .await
    }

    pub async fn queue_command_stop(&self, queue_id: &str) -> Result<()> {
        self.send_void("player_queues/stop", json!({ "queue_id": queue_id }))
            .await
    }

    pub async fn queue_command_next(&self, queue_id: &str) -> Result<()> {
        self.send_void("player_queues/next", json!({ "queue_id": queue_id }))
            .await
    }

    pub async fn queue_command_previous(&self, queue_id: &str) -> Result<()> {
        self.send_void("player_queues/previous", json!({ "queue_id": queue_id }))
            .await
    }

    // =========================================================================
    // Player commands
    // =========================================================================

    pub async fn player_command_power_on(&self, player_id: &str) -> Result<()> {
        self.send_void(
            "players/player_command_power_on",
            json!({ "player_id": player_id }),
        )
        .await
    }

    pub async fn player_command_power_off(&self, player_id: &str) -> Result<()> {
        self.send_void(
            "players/player_command_power_off",
            json!({ "player_id": player_id }),
        )
        .await
    }

    /// Set player volume (0-100).
    pub async fn player_command_volume_set(&self, player_id: &str, volume: u8) -> Result<()> {
        self.send_void(
            "players/cmd/volume_set",
            json!({ "player_id": player_id, "volume_level": volume.min(100) }),
        )
        .await
    }

    pub async fn player_command_volume_up(&self, player_id: &str, step: u8) -> Result<()> {
        self.send_void(
            "players/cmd/volume_up",
            json!({ "player_id": player_id, "step": step }),
        )
        .await
    }

    pub async fn player_command_volume_down(&self, player_id: &str, step: u8) -> Result<()> {
        self.send_void(
            "players/cmd/volume_down",
            json!({ "player_id": player_id, "step": step }),
        )
        .await
    }

    pub async fn player_command_volume_mute(&self, player_id: &str, muted: bool) -> Result<()> {
        self.send_void(
            "players/cmd/volume_mute",
            json!({ "player_id": player_id, "muted": muted }),
        )
        .await
    }

    // =========================================================================
    // State
    // =========================================================================

    pub async fn get_player_queue_items(
        &self,
        queue_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<QueueItem>> {
        let items: Option<Vec<QueueItem>> = self
            .send_command(
                "player_queues/items",
                json!({ "queue_id": queue_id, "limit": limit, "offset": offset }),
            )
            .await?;
        Ok(items.unwrap_or_default())
    }

    /// Active queue for a player. `None` when the player has no queue.
    pub async fn get_active_queue(&self, player_id: &str) -> Result<Option<PlayerQueue>> {
        self.send_command(
            "player_queues/get_active_queue",
            json!({ "player_id": player_id }),
        )
        .await
    }

    /// Current player state, or `None` if the player is unknown.
    pub async fn get_player_state(&self, player_id: &str) -> Result<Option<PlayerStateSummary>> {
        let Some(player) = self.get_player(player_id).await? else {
            return Ok(None);
        };

        let current_track = self.current_track(&player).await;

        Ok(Some(PlayerStateSummary {
            state: player.current_state(),
            powered: player.powered.unwrap_or(true),
            volume_level: player.volume_level,
            volume_muted: player.is_muted(),
            current_track,
            player_name: player.name.clone(),
        }))
    }

    /// Log the player's state after an action. Never fails.
    pub async fn show_current_state(&self, player_id: &str, action: &str) {
        match self.get_player_state(player_id).await {
            Ok(Some(state)) => {
                info!("   🔍 {} - {}", action, display::status_line(&state));
                info!("   🎵 Current: {}", state.current_track);
            }
            Ok(None) => {
                warn!("   🔍 {} - Could not get player state", action);
            }
            Err(e) => {
                error!(error = %e, "   🔍 {} - Error getting state", action);
            }
        }
    }

    /// Track description: "<artist> - <title>" from the loaded media,
    /// falling back to the head of the queue.
    async fn current_track(&self, player: &Player) -> String {
        if let Some(track) = track_from_media(player) {
            return track;
        }
        if let Some(track) = self.track_from_queue(player).await {
            return track;
        }
        NO_TRACK.to_string()
    }

    async fn track_from_queue(&self, player: &Player) -> Option<String> {
        player.current_item_id.as_ref().filter(|id| !id.is_empty())?;

        let queue_id = player
            .current_media
            .as_ref()
            .and_then(|m| m.queue_id.as_deref())
            .unwrap_or(&player.player_id);

        match self.get_player_queue_items(queue_id, 1, 0).await {
            Ok(items) => {
                let item = items.into_iter().next()?;
                if !item.name.is_empty() {
                    return Some(item.name);
                }
                item.media_item
                    .map(|m| m.name)
                    .filter(|name| !name.is_empty())
            }
            Err(e) => {
                error!(error = %e, queue_id = %queue_id, "Error extracting track from queue");
                None
            }
        }
    }
}

fn track_from_media(player: &Player) -> Option<String> {
    let media = player.current_media.as_ref()?;
    let title = media.title.as_deref().filter(|t| !t.is_empty())?;
    match media.artist.as_deref().filter(|a| !a.is_empty()) {
        Some(artist) => Some(format!("{} - {}", artist, title)),
        None => Some(title.to_string()),
    }
}
