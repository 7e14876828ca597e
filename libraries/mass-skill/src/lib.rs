//! Music Assistant voice skill
//!
//! Maps spoken commands ("play Carbon Leaf in the office", "turn it up")
//! onto Music Assistant players.
//!
//! # Architecture
//!
//! - `intent`: template matching of utterances to [`IntentKind`]s
//! - `skill`: handlers turning intents into backend calls and a [`Reply`]
//! - `backend`: the [`MusicBackend`] seam, implemented by `MassClient`
//! - `locale`/`dialog`: per-language intent templates and spoken responses
//! - `manifest`: `skill.json` generation from `Cargo.toml`
//!
//! # Example
//!
//! ```ignore
//! use mass_skill::{MusicAssistantSkill, SkillConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let skill = MusicAssistantSkill::connect(SkillConfig::load(None)?)?;
//!
//!     if let Some(reply) = skill.handle_utterance("pause the music").await {
//!         println!("{}", reply.text);
//!     }
//!     Ok(())
//! }
//! ```

mod backend;
mod config;
mod dialog;
mod error;
mod intent;
mod locale;
mod lookup;
mod manifest;
mod search;
mod skill;
mod volume;

pub use backend::MusicBackend;
pub use config::{SkillConfig, DEFAULT_CONFIG_FILE};
pub use dialog::{DialogData, Dialogs};
pub use error::{Result, SkillError};
pub use intent::{IntentKind, IntentMatcher, IntentMessage};
pub use locale::Locale;
pub use lookup::{find_player, normalize_player_name, FUZZY_THRESHOLD};
pub use manifest::{update_skill_json, SkillManifest, MANIFEST_FILE};
pub use search::{select_generic, select_item, GENERIC_PRIORITY};
pub use skill::{MusicAssistantSkill, Reply};
pub use volume::parse_volume_level;
