//! Music Assistant Client
//!
//! HTTP client library for the Music Assistant command API.
//!
//! # Features
//!
//! - **Players**: list players, read state, power and volume control
//! - **Queues**: play media, play/pause/stop/next/previous, queue items
//! - **Search**: library and provider search by media type
//! - **Fixtures**: optional recording of every command/response pair
//!
//! # Example
//!
//! ```ignore
//! use mass_client::{ClientConfig, MassClient, MediaType, QueueOption};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MassClient::new(ClientConfig::new("http://localhost:8095"))?;
//!
//!     let results = client.search_media("Carbon Leaf", &[MediaType::Artist], 5).await?;
//!     if let Some(artist) = results.artists.first() {
//!         client
//!             .play_media("media_player.office", &artist.uri, QueueOption::Play, false)
//!             .await?;
//!     }
//!
//!     client.show_current_state("media_player.office", "After play").await;
//!     Ok(())
//! }
//! ```

mod client;
pub mod display;
mod error;
mod recorder;
mod types;

pub use client::{MassClient, NO_TRACK};
pub use error::{ClientError, Result};
pub use recorder::{fixture_file_name, FixtureRecorder, FixtureStats};
pub use types::{
    ClientConfig, ItemMapping, MediaItem, MediaType, PlaybackState, Player, PlayerMedia,
    PlayerQueue, PlayerStateSummary, QueueItem, QueueOption, SearchResults,
};
