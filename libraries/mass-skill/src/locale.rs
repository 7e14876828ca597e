//! Locale resources: dialog templates and intent templates per language.
//!
//! English resources are compiled in. A locale directory laid out as
//! `<dir>/<lang>/<name>.dialog` and `<dir>/<lang>/<name>.intent` adds
//! languages or replaces individual files.

use crate::dialog::Dialogs;
use crate::error::{Result, SkillError};
use crate::intent::IntentMatcher;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

macro_rules! resource {
    ($name:literal, $ext:literal) => {
        (
            $name,
            include_str!(concat!("../locale/en-us/", $name, ".", $ext)),
        )
    };
}

const EN_US_DIALOGS: &[(&str, &str)] = &[
    resource!("paused", "dialog"),
    resource!("resumed", "dialog"),
    resource!("stopped", "dialog"),
    resource!("next_track", "dialog"),
    resource!("previous_track", "dialog"),
    resource!("volume_set", "dialog"),
    resource!("volume_up", "dialog"),
    resource!("volume_down", "dialog"),
    resource!("muted", "dialog"),
    resource!("unmuted", "dialog"),
    resource!("powered_on", "dialog"),
    resource!("powered_off", "dialog"),
    resource!("playing", "dialog"),
    resource!("playing_artist", "dialog"),
    resource!("playing_album", "dialog"),
    resource!("playing_track", "dialog"),
    resource!("playing_playlist", "dialog"),
    resource!("playing_radio", "dialog"),
    resource!("not_found", "dialog"),
    resource!("generic_could_not", "dialog"),
    resource!("invalid_volume", "dialog"),
    resource!("now_playing", "dialog"),
    resource!("nothing_playing", "dialog"),
];

const EN_US_INTENTS: &[(&str, &str)] = &[
    resource!("play", "intent"),
    resource!("play_artist", "intent"),
    resource!("play_album", "intent"),
    resource!("play_track", "intent"),
    resource!("play_playlist", "intent"),
    resource!("play_radio", "intent"),
    resource!("resume", "intent"),
    resource!("pause", "intent"),
    resource!("stop", "intent"),
    resource!("next", "intent"),
    resource!("previous", "intent"),
    resource!("volume_set", "intent"),
    resource!("volume_up", "intent"),
    resource!("volume_down", "intent"),
    resource!("mute", "intent"),
    resource!("unmute", "intent"),
    resource!("power_on", "intent"),
    resource!("power_off", "intent"),
    resource!("now_playing", "intent"),
];

/// Dialogs and intents for one language.
#[derive(Debug)]
pub struct Locale {
    pub lang: String,
    pub dialogs: Dialogs,
    pub intents: IntentMatcher,
}

impl Locale {
    /// Load resources for `lang`, layering `dir` over the built-in set.
    pub fn load(lang: &str, dir: Option<&Path>) -> Result<Self> {
        let lang = lang.to_lowercase();
        let mut dialogs: BTreeMap<String, String> = BTreeMap::new();
        let mut intents: BTreeMap<String, String> = BTreeMap::new();

        if lang == "en-us" {
            for (name, text) in EN_US_DIALOGS {
                dialogs.insert((*name).to_string(), (*text).to_string());
            }
            for (name, text) in EN_US_INTENTS {
                intents.insert((*name).to_string(), (*text).to_string());
            }
        }

        if let Some(dir) = dir {
            let lang_dir = dir.join(&lang);
            if lang_dir.is_dir() {
                read_resources(&lang_dir, &mut dialogs, &mut intents)?;
            }
        }

        if intents.is_empty() {
            return Err(SkillError::Locale(format!(
                "No intent resources for language {}",
                lang
            )));
        }

        debug!(
            lang = %lang,
            dialogs = dialogs.len(),
            intents = intents.len(),
            "Loaded locale"
        );

        Ok(Self {
            dialogs: Dialogs::from_sources(&dialogs),
            intents: IntentMatcher::from_sources(&intents)?,
            lang,
        })
    }
}

fn read_resources(
    dir: &Path,
    dialogs: &mut BTreeMap<String, String>,
    intents: &mut BTreeMap<String, String>,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) else {
            continue;
        };
        let stem = stem.to_string_lossy().to_string();
        match ext.to_string_lossy().as_ref() {
            "dialog" => {
                dialogs.insert(stem, std::fs::read_to_string(&path)?);
            }
            "intent" => {
                intents.insert(stem, std::fs::read_to_string(&path)?);
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentKind;

    #[test]
    fn test_builtin_english() {
        let locale = Locale::load("en-US", None).unwrap();
        assert_eq!(locale.lang, "en-us");
        assert!(locale.dialogs.contains("paused"));
        assert!(locale.dialogs.contains("generic_could_not"));

        for kind in IntentKind::ALL {
            assert!(
                locale.intents.has_intent(*kind),
                "missing intent templates for {}",
                kind
            );
        }
    }

    #[test]
    fn test_unknown_language_without_dir_fails() {
        assert!(matches!(
            Locale::load("xx-yy", None),
            Err(SkillError::Locale(_))
        ));
    }

    #[test]
    fn test_directory_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let lang_dir = dir.path().join("en-us");
        std::fs::create_dir_all(&lang_dir).unwrap();
        std::fs::write(lang_dir.join("paused.dialog"), "Hold on.\n").unwrap();

        let locale = Locale::load("en-us", Some(dir.path())).unwrap();
        assert_eq!(
            locale.dialogs.render("paused", &Default::default()),
            "Hold on."
        );
        // Untouched files still come from the built-in set
        assert!(locale.dialogs.contains("resumed"));
    }

    #[test]
    fn test_directory_adds_language() {
        let dir = tempfile::tempdir().unwrap();
        let lang_dir = dir.path().join("de-de");
        std::fs::create_dir_all(&lang_dir).unwrap();
        std::fs::write(lang_dir.join("pause.intent"), "pause\nmusik anhalten\n").unwrap();
        std::fs::write(lang_dir.join("paused.dialog"), "Pausiert.\n").unwrap();

        let locale = Locale::load("de-de", Some(dir.path())).unwrap();
        let message = locale.intents.match_utterance("Musik anhalten").unwrap();
        assert_eq!(message.kind, IntentKind::Pause);
        assert!(!locale.dialogs.contains("resumed"));
    }
}
