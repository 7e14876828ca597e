//! Backend trait between intent handling and Music Assistant.

use async_trait::async_trait;
use mass_client::{
    MassClient, MediaType, Player, PlayerStateSummary, QueueOption, Result, SearchResults,
};

/// Music Assistant operations the skill needs.
///
/// [`MassClient`] is the production implementation; tests substitute a
/// mock so handlers can be exercised without a server.
#[async_trait]
pub trait MusicBackend: Send + Sync {
    // ========================================================================
    // Players and search
    // ========================================================================

    /// Get all players known to the server
    async fn get_players(&self) -> Result<Vec<Player>>;

    /// Search media, optionally restricted to some types
    async fn search_media(
        &self,
        query: &str,
        media_types: &[MediaType],
        limit: u32,
    ) -> Result<SearchResults>;

    /// Current state of a player, `None` if it is unknown
    async fn get_player_state(&self, player_id: &str) -> Result<Option<PlayerStateSummary>>;

    // ========================================================================
    // Queue commands
    // ========================================================================

    /// Play a media URI on a queue
    async fn play_media(
        &self,
        queue_id: &str,
        media: &str,
        option: QueueOption,
        radio_mode: bool,
    ) -> Result<()>;

    async fn queue_command_play(&self, queue_id: &str) -> Result<()>;
    async fn queue_command_pause(&self, queue_id: &str) -> Result<()>;
    async fn queue_command_stop(&self, queue_id: &str) -> Result<()>;
    async fn queue_command_next(&self, queue_id: &str) -> Result<()>;
    async fn queue_command_previous(&self, queue_id: &str) -> Result<()>;

    // ========================================================================
    // Player commands
    // ========================================================================

    async fn player_command_power_on(&self, player_id: &str) -> Result<()>;
    async fn player_command_power_off(&self, player_id: &str) -> Result<()>;
    async fn player_command_volume_set(&self, player_id: &str, volume: u8) -> Result<()>;
    async fn player_command_volume_up(&self, player_id: &str, step: u8) -> Result<()>;
    async fn player_command_volume_down(&self, player_id: &str, step: u8) -> Result<()>;
    async fn player_command_volume_mute(&self, player_id: &str, muted: bool) -> Result<()>;
}

#[async_trait]
impl MusicBackend for MassClient {
    async fn get_players(&self) -> Result<Vec<Player>> {
        MassClient::get_players(self).await
    }

    async fn search_media(
        &self,
        query: &str,
        media_types: &[MediaType],
        limit: u32,
    ) -> Result<SearchResults> {
        MassClient::search_media(self, query, media_types, limit).await
    }

    async fn get_player_state(&self, player_id: &str) -> Result<Option<PlayerStateSummary>> {
        MassClient::get_player_state(self, player_id).await
    }

    async fn play_media(
        &self,
        queue_id: &str,
        media: &str,
        option: QueueOption,
        radio_mode: bool,
    ) -> Result<()> {
        MassClient::play_media(self, queue_id, media, option, radio_mode).await
    }

    async fn queue_command_play(&self, queue_id: &str) -> Result<()> {
        MassClient::queue_command_play(self, queue_id).await
    }

    async fn queue_command_pause(&self, queue_id: &str) -> Result<()> {
        MassClient::queue_command_pause(self, queue_id).await
    }

    async fn queue_command_stop(&self, queue_id: &str) -> Result<()> {
        MassClient::queue_command_stop(self, queue_id).await
    }

    async fn queue_command_next(&self, queue_id: &str) -> Result<()> {
        MassClient::queue_command_next(self, queue_id).await
    }

    async fn queue_command_previous(&self, queue_id: &str) -> Result<()> {
        MassClient::queue_command_previous(self, queue_id).await
    }

    async fn player_command_power_on(&self, player_id: &str) -> Result<()> {
        MassClient::player_command_power_on(self, player_id).await
    }

    async fn player_command_power_off(&self, player_id: &str) -> Result<()> {
        MassClient::player_command_power_off(self, player_id).await
    }

    async fn player_command_volume_set(&self, player_id: &str, volume: u8) -> Result<()> {
        MassClient::player_command_volume_set(self, player_id, volume).await
    }

    async fn player_command_volume_up(&self, player_id: &str, step: u8) -> Result<()> {
        MassClient::player_command_volume_up(self, player_id, step).await
    }

    async fn player_command_volume_down(&self, player_id: &str, step: u8) -> Result<()> {
        MassClient::player_command_volume_down(self, player_id, step).await
    }

    async fn player_command_volume_mute(&self, player_id: &str, muted: bool) -> Result<()> {
        MassClient::player_command_volume_mute(self, player_id, muted).await
    }
}
