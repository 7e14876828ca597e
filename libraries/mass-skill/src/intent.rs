//! Voice intents and template-based utterance matching.
//!
//! Intent files hold one template per line:
//!
//! - `{slot}` captures free text (`play {artist}`)
//! - `(a|b)` requires one of the alternatives
//! - `[a]` / `[a|b]` is optional
//!
//! Templates are expanded into plain variants and compiled to anchored,
//! case-insensitive regexes. When several variants match an utterance the
//! one with the most literal text wins, so `play the album {album}` beats
//! `play {query}`.

use crate::error::{Result, SkillError};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Upper bound on variants produced by a single template line.
const MAX_VARIANTS: usize = 512;

/// Voice commands the skill understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Play,
    PlayArtist,
    PlayAlbum,
    PlayTrack,
    PlayPlaylist,
    PlayRadio,
    Resume,
    Pause,
    Stop,
    Next,
    Previous,
    VolumeSet,
    VolumeUp,
    VolumeDown,
    Mute,
    Unmute,
    PowerOn,
    PowerOff,
    NowPlaying,
}

impl IntentKind {
    pub const ALL: &'static [IntentKind] = &[
        IntentKind::Play,
        IntentKind::PlayArtist,
        IntentKind::PlayAlbum,
        IntentKind::PlayTrack,
        IntentKind::PlayPlaylist,
        IntentKind::PlayRadio,
        IntentKind::Resume,
        IntentKind::Pause,
        IntentKind::Stop,
        IntentKind::Next,
        IntentKind::Previous,
        IntentKind::VolumeSet,
        IntentKind::VolumeUp,
        IntentKind::VolumeDown,
        IntentKind::Mute,
        IntentKind::Unmute,
        IntentKind::PowerOn,
        IntentKind::PowerOff,
        IntentKind::NowPlaying,
    ];

    /// Intent file stem (`play_artist` for `play_artist.intent`).
    pub fn name(&self) -> &'static str {
        match self {
            IntentKind::Play => "play",
            IntentKind::PlayArtist => "play_artist",
            IntentKind::PlayAlbum => "play_album",
            IntentKind::PlayTrack => "play_track",
            IntentKind::PlayPlaylist => "play_playlist",
            IntentKind::PlayRadio => "play_radio",
            IntentKind::Resume => "resume",
            IntentKind::Pause => "pause",
            IntentKind::Stop => "stop",
            IntentKind::Next => "next",
            IntentKind::Previous => "previous",
            IntentKind::VolumeSet => "volume_set",
            IntentKind::VolumeUp => "volume_up",
            IntentKind::VolumeDown => "volume_down",
            IntentKind::Mute => "mute",
            IntentKind::Unmute => "unmute",
            IntentKind::PowerOn => "power_on",
            IntentKind::PowerOff => "power_off",
            IntentKind::NowPlaying => "now_playing",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntentKind {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| SkillError::Locale(format!("Unknown intent: {}", s)))
    }
}

/// A recognised intent with its captured slots.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMessage {
    pub kind: IntentKind,
    pub slots: HashMap<String, String>,
    pub utterance: String,
}

impl IntentMessage {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            slots: HashMap::new(),
            utterance: String::new(),
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }

    /// Slot value, trimmed; empty values count as absent.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug)]
struct CompiledTemplate {
    kind: IntentKind,
    source: String,
    regex: Regex,
    slot_names: Vec<String>,
    literal_len: usize,
}

/// Matches utterances against compiled intent templates.
#[derive(Debug, Default)]
pub struct IntentMatcher {
    templates: Vec<CompiledTemplate>,
}

impl IntentMatcher {
    /// Build from `intent name -> file contents`. Unknown intent names are
    /// skipped with a warning.
    pub fn from_sources(sources: &BTreeMap<String, String>) -> Result<Self> {
        let mut templates = Vec::new();

        for (name, text) in sources {
            let Ok(kind) = name.parse::<IntentKind>() else {
                warn!(intent = %name, "Ignoring templates for unknown intent");
                continue;
            };

            for line in text.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                for variant in expand(line)? {
                    templates.push(compile(kind, &variant)?);
                }
            }
        }

        // Ties are broken by intent order, so keep templates sorted by it
        templates.sort_by_key(|t| t.kind.position());

        debug!(templates = templates.len(), "Compiled intent templates");
        Ok(Self { templates })
    }

    pub fn has_intent(&self, kind: IntentKind) -> bool {
        self.templates.iter().any(|t| t.kind == kind)
    }

    /// Best matching intent for an utterance.
    pub fn match_utterance(&self, utterance: &str) -> Option<IntentMessage> {
        let normalized = normalize_utterance(utterance);
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<(&CompiledTemplate, HashMap<String, String>)> = None;

        for template in &self.templates {
            let Some(captures) = template.regex.captures(&normalized) else {
                continue;
            };

            let slots: HashMap<String, String> = template
                .slot_names
                .iter()
                .filter_map(|name| {
                    let value = captures.name(name)?.as_str().trim();
                    (!value.is_empty()).then(|| (name.clone(), value.to_string()))
                })
                .collect();
            if slots.len() != template.slot_names.len() {
                continue;
            }

            let better = match &best {
                None => true,
                Some((current, _)) => {
                    template.literal_len > current.literal_len
                        || (template.literal_len == current.literal_len
                            && template.slot_names.len() < current.slot_names.len())
                }
            };
            if better {
                best = Some((template, slots));
            }
        }

        best.map(|(template, slots)| {
            debug!(
                intent = %template.kind,
                template = %template.source,
                "Matched utterance"
            );
            IntentMessage {
                kind: template.kind,
                slots,
                utterance: utterance.to_string(),
            }
        })
    }
}

fn normalize_utterance(utterance: &str) -> String {
    utterance
        .replace('\u{2019}', "'")
        .trim()
        .trim_end_matches(['.', '!', '?', ','])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

enum Segment {
    Text(String),
    Choice(Vec<String>),
}

fn parse_segments(line: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        let close = match c {
            '(' => ')',
            '[' => ']',
            _ => {
                text.push(c);
                continue;
            }
        };

        let mut inner = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == close {
                closed = true;
                break;
            }
            inner.push(c);
        }
        if !closed {
            return Err(SkillError::Locale(format!(
                "Unclosed '{}' in intent template: {}",
                c, line
            )));
        }

        if !text.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut text)));
        }
        let mut options: Vec<String> = inner.split('|').map(|o| o.trim().to_string()).collect();
        if c == '[' {
            options.push(String::new());
        }
        segments.push(Segment::Choice(options));
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(segments)
}

/// Expand alternatives and optional words into plain variants.
fn expand(line: &str) -> Result<Vec<String>> {
    let mut variants = vec![String::new()];

    for segment in parse_segments(line)? {
        match segment {
            Segment::Text(text) => {
                for v in &mut variants {
                    v.push_str(&text);
                }
            }
            Segment::Choice(options) => {
                let mut next = Vec::with_capacity(variants.len() * options.len());
                for v in &variants {
                    for option in &options {
                        // Keep words separated when the option is adjacent to text
                        next.push(format!("{} {} ", v, option));
                    }
                }
                if next.len() > MAX_VARIANTS {
                    return Err(SkillError::Locale(format!(
                        "Intent template expands to too many variants: {}",
                        line
                    )));
                }
                variants = next;
            }
        }
    }

    let mut variants: Vec<String> = variants
        .into_iter()
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty())
        .collect();
    variants.dedup();
    Ok(variants)
}

fn compile(kind: IntentKind, variant: &str) -> Result<CompiledTemplate> {
    let mut pattern = String::from("(?i)^");
    let mut slot_names = Vec::new();
    let mut literal_len = 0;
    let mut rest = variant;

    let mut push_literal = |pattern: &mut String, literal: &str| {
        literal_len += literal.chars().filter(|c| !c.is_whitespace()).count();
        let escaped: Vec<String> = literal.split(' ').map(regex::escape).collect();
        pattern.push_str(&escaped.join(r"\s+"));
    };

    while let Some(start) = rest.find('{') {
        push_literal(&mut pattern, &rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            SkillError::Locale(format!("Unclosed '{{' in intent template: {}", variant))
        })?;
        let name = after[..end].trim();
        if name.is_empty()
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            || name.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(SkillError::Locale(format!(
                "Invalid slot name '{}' in intent template: {}",
                name, variant
            )));
        }
        if slot_names.iter().any(|n| n == name) {
            return Err(SkillError::Locale(format!(
                "Duplicate slot '{}' in intent template: {}",
                name, variant
            )));
        }
        pattern.push_str(&format!("(?P<{}>.+?)", name));
        slot_names.push(name.to_string());
        rest = &after[end + 1..];
    }
    push_literal(&mut pattern, rest);
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|e| {
        SkillError::Locale(format!("Bad intent template '{}': {}", variant, e))
    })?;

    Ok(CompiledTemplate {
        kind,
        source: variant.to_string(),
        regex,
        slot_names,
        literal_len,
    })
}
