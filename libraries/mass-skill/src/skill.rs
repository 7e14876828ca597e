//! Intent handlers.
//!
//! [`MusicAssistantSkill`] turns recognised intents into Music Assistant
//! commands and answers with a rendered dialog. Backend failures never
//! escape a handler: they are logged and answered with
//! `generic_could_not`.

use crate::backend::MusicBackend;
use crate::config::SkillConfig;
use crate::dialog::DialogData;
use crate::error::Result;
use crate::intent::{IntentKind, IntentMessage};
use crate::locale::Locale;
use crate::lookup::find_player;
use crate::search::{select_generic, select_item};
use crate::volume::parse_volume_level;
use mass_client::{MassClient, MediaItem, MediaType, PlaybackState, Player, QueueOption};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// A spoken answer: dialog name, its data and the rendered text.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub dialog: String,
    pub data: DialogData,
    pub text: String,
}

/// Voice skill controlling Music Assistant players.
pub struct MusicAssistantSkill {
    config: SkillConfig,
    backend: Option<Arc<dyn MusicBackend>>,
    locale: Locale,
    last_player: Mutex<Option<String>>,
}

impl MusicAssistantSkill {
    /// Create a skill. Without a backend every command answers that no
    /// player could be found.
    pub fn new(config: SkillConfig, backend: Option<Arc<dyn MusicBackend>>) -> Result<Self> {
        config.validate()?;
        let locale = Locale::load(&config.lang, config.locale_dir.as_deref())?;

        info!(
            url = %config.music_assistant_url,
            lang = %locale.lang,
            default_player = ?config.default_player,
            "Music Assistant skill initialized"
        );

        Ok(Self {
            config,
            backend,
            locale,
            last_player: Mutex::new(None),
        })
    }

    /// Create a skill talking to the configured Music Assistant server.
    pub fn connect(config: SkillConfig) -> Result<Self> {
        let client = MassClient::new(config.client_config())?;
        Self::new(config, Some(Arc::new(client)))
    }

    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Player id of the most recently targeted player.
    pub async fn last_player(&self) -> Option<String> {
        self.last_player.lock().await.clone()
    }

    // =========================================================================
    // Players, search and playback
    // =========================================================================

    /// Resolve the player a command targets.
    ///
    /// A requested name must match a known player. Without one the last
    /// used player is preferred, then the configured default, then the
    /// first available player. The result is remembered as last used.
    pub async fn resolve_player(&self, requested: Option<&str>) -> Option<Player> {
        let backend = self.backend.as_ref()?;

        let players = match backend.get_players().await {
            Ok(players) => players,
            Err(e) => {
                warn!(error = %e, "Failed to fetch players");
                return None;
            }
        };

        let last = self.last_player.lock().await.clone();
        let player = choose_player(
            &players,
            requested,
            last.as_deref(),
            self.config.default_player.as_deref(),
        )
        .cloned();

        match &player {
            Some(player) => {
                debug!(player_id = %player.player_id, name = %player.name, "Resolved player");
                *self.last_player.lock().await = Some(player.player_id.clone());
            }
            None => {
                warn!(requested = ?requested, available = players.len(), "No matching player");
            }
        }
        player
    }

    pub async fn resolve_player_id(&self, requested: Option<&str>) -> Option<String> {
        self.resolve_player(requested)
            .await
            .map(|player| player.player_id)
    }

    /// Search one media type, keeping only items by `artist` when given.
    pub async fn search_media(
        &self,
        query: &str,
        media_type: MediaType,
        artist: Option<&str>,
    ) -> Option<MediaItem> {
        let backend = self.backend.as_ref()?;

        let results = match backend
            .search_media(query, &[media_type], self.config.search_limit)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!(query = %query, media_type = %media_type, error = %e, "Search failed");
                return None;
            }
        };

        let item = select_item(&results, media_type, artist);
        if item.is_none() {
            debug!(query = %query, media_type = %media_type, artist = ?artist, "No search results");
        }
        item
    }

    /// Start playing `item` on a player. Returns whether the server accepted it.
    pub async fn play_media_item(&self, item: &MediaItem, player_id: &str, radio_mode: bool) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            warn!("No Music Assistant client available");
            return false;
        };

        match backend
            .play_media(player_id, &item.uri, QueueOption::Play, radio_mode)
            .await
        {
            Ok(()) => {
                info!(player_id = %player_id, name = %item.name, uri = %item.uri, "Playback started");
                true
            }
            Err(e) => {
                error!(player_id = %player_id, uri = %item.uri, error = %e, "Failed to play media");
                false
            }
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Match an utterance and handle it. `None` when no intent matches.
    pub async fn handle_utterance(&self, utterance: &str) -> Option<Reply> {
        let Some(message) = self.locale.intents.match_utterance(utterance) else {
            debug!(utterance = %utterance, "No intent matched");
            return None;
        };
        Some(self.handle(&message).await)
    }

    pub async fn handle(&self, message: &IntentMessage) -> Reply {
        debug!(intent = %message.kind, slots = ?message.slots, "Handling intent");
        match message.kind {
            IntentKind::Play => self.handle_play(message).await,
            IntentKind::PlayArtist => self.handle_play_artist(message).await,
            IntentKind::PlayAlbum => self.handle_play_album(message).await,
            IntentKind::PlayTrack => self.handle_play_track(message).await,
            IntentKind::PlayPlaylist => self.handle_play_playlist(message).await,
            IntentKind::PlayRadio => self.handle_play_radio(message).await,
            IntentKind::Resume => self.handle_resume(message).await,
            IntentKind::Pause => self.handle_pause(message).await,
            IntentKind::Stop => self.handle_stop(message).await,
            IntentKind::Next => self.handle_next(message).await,
            IntentKind::Previous => self.handle_previous(message).await,
            IntentKind::VolumeSet => self.handle_volume_set(message).await,
            IntentKind::VolumeUp => self.handle_volume_up(message).await,
            IntentKind::VolumeDown => self.handle_volume_down(message).await,
            IntentKind::Mute => self.handle_mute(message).await,
            IntentKind::Unmute => self.handle_unmute(message).await,
            IntentKind::PowerOn => self.handle_power_on(message).await,
            IntentKind::PowerOff => self.handle_power_off(message).await,
            IntentKind::NowPlaying => self.handle_now_playing(message).await,
        }
    }

    // =========================================================================
    // Playback handlers
    // =========================================================================

    pub async fn handle_play(&self, message: &IntentMessage) -> Reply {
        let Some(query) = message.slot("query") else {
            return self.could_not("understand what to play.");
        };
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };

        let results = match backend
            .search_media(query, &[], self.config.search_limit)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed");
                return self.not_found(query);
            }
        };

        let Some((media_type, item)) = select_generic(&results, query) else {
            return self.not_found(query);
        };
        let radio_mode = media_type == MediaType::Artist && self.config.radio_mode;
        let dialog = match media_type {
            MediaType::Artist => "playing_artist",
            MediaType::Album => "playing_album",
            MediaType::Track => "playing_track",
            MediaType::Playlist => "playing_playlist",
            MediaType::Radio => "playing_radio",
            _ => "playing",
        };
        self.play(&item, &player, radio_mode, dialog).await
    }

    pub async fn handle_play_artist(&self, message: &IntentMessage) -> Reply {
        let Some(artist) = message.slot("artist") else {
            return self.could_not("understand which artist to play.");
        };
        self.search_and_play(
            message,
            artist,
            MediaType::Artist,
            None,
            self.config.radio_mode,
            "playing_artist",
        )
        .await
    }

    pub async fn handle_play_album(&self, message: &IntentMessage) -> Reply {
        let Some(album) = message.slot("album") else {
            return self.could_not("understand which album to play.");
        };
        let artist = message.slot("artist");
        self.search_and_play(message, album, MediaType::Album, artist, false, "playing_album")
            .await
    }

    pub async fn handle_play_track(&self, message: &IntentMessage) -> Reply {
        let Some(track) = message.slot("track") else {
            return self.could_not("understand which song to play.");
        };
        let artist = message.slot("artist");
        self.search_and_play(message, track, MediaType::Track, artist, false, "playing_track")
            .await
    }

    pub async fn handle_play_playlist(&self, message: &IntentMessage) -> Reply {
        let Some(playlist) = message.slot("playlist") else {
            return self.could_not("understand which playlist to play.");
        };
        self.search_and_play(
            message,
            playlist,
            MediaType::Playlist,
            None,
            false,
            "playing_playlist",
        )
        .await
    }

    pub async fn handle_play_radio(&self, message: &IntentMessage) -> Reply {
        let Some(station) = message.slot("station") else {
            return self.could_not("understand which station to play.");
        };
        self.search_and_play(message, station, MediaType::Radio, None, false, "playing_radio")
            .await
    }

    async fn search_and_play(
        &self,
        message: &IntentMessage,
        query: &str,
        media_type: MediaType,
        artist: Option<&str>,
        radio_mode: bool,
        dialog: &str,
    ) -> Reply {
        let Some((_, player)) = self.target(message).await else {
            return self.no_player();
        };
        let Some(item) = self.search_media(query, media_type, artist).await else {
            return self.not_found(query);
        };
        self.play(&item, &player, radio_mode, dialog).await
    }

    async fn play(&self, item: &MediaItem, player: &Player, radio_mode: bool, dialog: &str) -> Reply {
        if !self.play_media_item(item, &player.player_id, radio_mode).await {
            return self.could_not("start playback.");
        }
        let mut data = dialog_data(&[("name", item.name.as_str()), ("player", player.name.as_str())]);
        if let Some(artist) = item.primary_artist() {
            data.insert("artist".to_string(), artist.to_string());
        }
        self.reply(dialog, data)
    }

    // =========================================================================
    // Transport handlers
    // =========================================================================

    pub async fn handle_resume(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Resuming playback");
        let result = backend.queue_command_play(&player.player_id).await;
        self.finish(result, "resumed", &player, "resume playback.")
    }

    pub async fn handle_pause(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Pausing playback");
        let result = backend.queue_command_pause(&player.player_id).await;
        self.finish(result, "paused", &player, "pause the music.")
    }

    pub async fn handle_stop(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Stopping playback");
        let result = backend.queue_command_stop(&player.player_id).await;
        self.finish(result, "stopped", &player, "stop the music.")
    }

    pub async fn handle_next(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Skipping to next track");
        let result = backend.queue_command_next(&player.player_id).await;
        self.finish(result, "next_track", &player, "skip to the next track.")
    }

    pub async fn handle_previous(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Going to previous track");
        let result = backend.queue_command_previous(&player.player_id).await;
        self.finish(result, "previous_track", &player, "go back to the previous track.")
    }

    // =========================================================================
    // Volume handlers
    // =========================================================================

    pub async fn handle_volume_set(&self, message: &IntentMessage) -> Reply {
        let spoken = message.slot("volume").unwrap_or_default();
        let Some(level) = parse_volume_level(spoken) else {
            return self.reply("invalid_volume", dialog_data(&[("volume", spoken)]));
        };
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };

        if level == 0 {
            info!(player_id = %player.player_id, "Volume 0 requested, muting");
            let result = backend
                .player_command_volume_mute(&player.player_id, true)
                .await;
            return self.finish(result, "muted", &player, "mute the player.");
        }

        info!(player_id = %player.player_id, level, "Setting volume");
        let mut result = backend
            .player_command_volume_set(&player.player_id, level)
            .await;
        if result.is_ok() && player.is_muted() {
            result = backend
                .player_command_volume_mute(&player.player_id, false)
                .await;
        }

        match result {
            Ok(()) => self.reply("volume_set", dialog_data(&[("volume", level.to_string().as_str())])),
            Err(e) => {
                error!(player_id = %player.player_id, error = %e, "Failed to set volume");
                self.could_not("set the volume.")
            }
        }
    }

    pub async fn handle_volume_up(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        let step = self.config.volume_step;
        info!(player_id = %player.player_id, step, "Raising volume");

        let mut result = Ok(());
        if player.is_muted() {
            result = backend
                .player_command_volume_mute(&player.player_id, false)
                .await;
        }
        if result.is_ok() {
            result = backend
                .player_command_volume_up(&player.player_id, step)
                .await;
        }
        self.finish(result, "volume_up", &player, "turn the volume up.")
    }

    pub async fn handle_volume_down(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        let step = self.config.volume_step;
        info!(player_id = %player.player_id, step, "Lowering volume");
        let result = backend
            .player_command_volume_down(&player.player_id, step)
            .await;
        self.finish(result, "volume_down", &player, "turn the volume down.")
    }

    pub async fn handle_mute(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Muting");
        let result = backend
            .player_command_volume_mute(&player.player_id, true)
            .await;
        self.finish(result, "muted", &player, "mute the player.")
    }

    pub async fn handle_unmute(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Unmuting");
        let result = backend
            .player_command_volume_mute(&player.player_id, false)
            .await;
        self.finish(result, "unmuted", &player, "unmute the player.")
    }

    // =========================================================================
    // Power and state handlers
    // =========================================================================

    pub async fn handle_power_on(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Powering on");
        let result = backend.player_command_power_on(&player.player_id).await;
        self.finish(result, "powered_on", &player, "turn on the player.")
    }

    pub async fn handle_power_off(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };
        info!(player_id = %player.player_id, "Powering off");
        let result = backend.player_command_power_off(&player.player_id).await;
        self.finish(result, "powered_off", &player, "turn off the player.")
    }

    pub async fn handle_now_playing(&self, message: &IntentMessage) -> Reply {
        let Some((backend, player)) = self.target(message).await else {
            return self.no_player();
        };

        match backend.get_player_state(&player.player_id).await {
            Ok(Some(state))
                if matches!(state.state, PlaybackState::Playing | PlaybackState::Paused)
                    && state.current_track != mass_client::NO_TRACK =>
            {
                self.reply(
                    "now_playing",
                    dialog_data(&[("track", state.current_track.as_str()), ("player", player.name.as_str())]),
                )
            }
            Ok(_) => self.reply("nothing_playing", dialog_data(&[("player", player.name.as_str())])),
            Err(e) => {
                error!(player_id = %player.player_id, error = %e, "Failed to get player state");
                self.could_not("get the current track.")
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Backend and player for a command, honouring the `player` slot.
    async fn target(&self, message: &IntentMessage) -> Option<(Arc<dyn MusicBackend>, Player)> {
        let backend = self.backend.clone()?;
        let player = self.resolve_player(message.slot("player")).await?;
        Some((backend, player))
    }

    fn finish(
        &self,
        result: mass_client::Result<()>,
        dialog: &str,
        player: &Player,
        thing: &str,
    ) -> Reply {
        match result {
            Ok(()) => self.reply(dialog, dialog_data(&[("player", player.name.as_str())])),
            Err(e) => {
                error!(player_id = %player.player_id, error = %e, "Failed to {}", thing.trim_end_matches('.'));
                self.could_not(thing)
            }
        }
    }

    fn reply(&self, dialog: &str, data: DialogData) -> Reply {
        let text = self.locale.dialogs.render(dialog, &data);
        Reply {
            dialog: dialog.to_string(),
            data,
            text,
        }
    }

    fn could_not(&self, thing: &str) -> Reply {
        self.reply("generic_could_not", dialog_data(&[("thing", thing)]))
    }

    fn no_player(&self) -> Reply {
        self.could_not("find a player.")
    }

    fn not_found(&self, query: &str) -> Reply {
        self.reply("not_found", dialog_data(&[("query", query)]))
    }
}

/// Pick the target player from the current player list.
fn choose_player<'a>(
    players: &'a [Player],
    requested: Option<&str>,
    last: Option<&str>,
    default: Option<&str>,
) -> Option<&'a Player> {
    if let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) {
        return find_player(players, name);
    }

    if let Some(last) = last {
        if let Some(player) = players.iter().find(|p| p.player_id == last) {
            return Some(player);
        }
    }

    if let Some(player) = default.and_then(|name| find_player(players, name)) {
        return Some(player);
    }

    players.iter().find(|p| p.available)
}

fn dialog_data(pairs: &[(&str, &str)]) -> DialogData {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
