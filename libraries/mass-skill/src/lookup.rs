//! Player lookup by spoken name.
//!
//! Speech-to-text rarely returns a player name verbatim ("the office"
//! for "Office Speaker"), so lookup runs progressively looser passes and
//! stops at the first hit:
//!
//! 1. player id
//! 2. exact name (case-insensitive)
//! 3. normalized name (punctuation, "the", "player"/"speaker" removed)
//! 4. substring in either direction, shortest name first
//! 5. fuzzy match (normalized Levenshtein), best score above threshold
//!
//! Within each pass, available players are tried before unavailable ones.

use mass_client::Player;
use strsim::normalized_levenshtein;

/// Minimum similarity for a fuzzy match (0.0-1.0)
pub const FUZZY_THRESHOLD: f64 = 0.6;

const FILLER_PREFIXES: &[&str] = &["the"];
const FILLER_SUFFIXES: &[&str] = &["player", "speaker", "speakers"];

/// Find the player a spoken name refers to.
pub fn find_player<'a>(players: &'a [Player], query: &str) -> Option<&'a Player> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let wanted = normalize_player_name(query);

    let (available, unavailable): (Vec<&Player>, Vec<&Player>) =
        players.iter().partition(|p| p.available);

    let passes: [Pass; 5] = [by_id, by_exact_name, by_normalized_name, by_substring, by_similarity];
    for pass in passes {
        for group in [&available, &unavailable] {
            if let Some(index) = pass(group, query, &wanted) {
                return Some(group[index]);
            }
        }
    }
    None
}

/// One lookup pass: index of the matching player in the group.
type Pass = fn(&[&Player], &str, &str) -> Option<usize>;

fn by_id(players: &[&Player], query: &str, _wanted: &str) -> Option<usize> {
    players.iter().position(|p| p.player_id == query)
}

fn by_exact_name(players: &[&Player], query: &str, _wanted: &str) -> Option<usize> {
    let lowered = query.to_lowercase();
    players.iter().position(|p| p.name.to_lowercase() == lowered)
}

fn by_normalized_name(players: &[&Player], _query: &str, wanted: &str) -> Option<usize> {
    if wanted.is_empty() {
        return None;
    }
    players
        .iter()
        .position(|p| normalize_player_name(&p.name) == wanted)
}

fn by_substring(players: &[&Player], _query: &str, wanted: &str) -> Option<usize> {
    if wanted.is_empty() {
        return None;
    }
    players
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            let name = normalize_player_name(&p.name);
            !name.is_empty() && (name.contains(wanted) || wanted.contains(name.as_str()))
        })
        .min_by_key(|(_, p)| p.name.len())
        .map(|(index, _)| index)
}

fn by_similarity(players: &[&Player], _query: &str, wanted: &str) -> Option<usize> {
    if wanted.is_empty() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (index, player) in players.iter().enumerate() {
        let similarity = normalized_levenshtein(wanted, &normalize_player_name(&player.name));
        if similarity >= FUZZY_THRESHOLD {
            match best {
                Some((_, best_similarity)) if similarity <= best_similarity => {}
                _ => best = Some((index, similarity)),
            }
        }
    }
    best.map(|(index, _)| index)
}

/// Lowercase, drop punctuation and filler words, collapse whitespace.
pub fn normalize_player_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    while words.len() > 1 && FILLER_PREFIXES.contains(&words[0]) {
        words.remove(0);
    }
    while words.len() > 1 && words.last().is_some_and(|w| FILLER_SUFFIXES.contains(w)) {
        words.pop();
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn players() -> Vec<Player> {
        serde_json::from_value(json!([
            {"player_id": "media_player.office_speaker", "name": "Office Speaker"},
            {"player_id": "media_player.kitchen", "name": "Kitchen"},
            {"player_id": "media_player.living_room", "name": "Living Room TV"},
            {"player_id": "media_player.kids", "name": "Kids' Room", "available": false},
            {"player_id": "media_player.kitchen_old", "name": "Kitchen", "available": false}
        ]))
        .unwrap()
    }

    fn lookup(query: &str) -> Option<String> {
        let players = players();
        find_player(&players, query).map(|p| p.player_id.clone())
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_player_name("The Office Speaker"), "office");
        assert_eq!(normalize_player_name("Kids' Room"), "kids room");
        assert_eq!(normalize_player_name("  living   room "), "living room");
        // A lone filler word is kept
        assert_eq!(normalize_player_name("Speaker"), "speaker");
    }

    #[test]
    fn test_by_id_and_exact_name() {
        assert_eq!(lookup("media_player.kitchen").as_deref(), Some("media_player.kitchen"));
        assert_eq!(lookup("office speaker").as_deref(), Some("media_player.office_speaker"));
    }

    #[test]
    fn test_normalized_and_substring() {
        assert_eq!(lookup("the office").as_deref(), Some("media_player.office_speaker"));
        assert_eq!(lookup("living room").as_deref(), Some("media_player.living_room"));
        assert_eq!(lookup("kids room").as_deref(), Some("media_player.kids"));
    }

    #[test]
    fn test_fuzzy() {
        assert_eq!(lookup("kitchin").as_deref(), Some("media_player.kitchen"));
        assert_eq!(lookup("ofice").as_deref(), Some("media_player.office_speaker"));
    }

    #[test]
    fn test_available_players_preferred() {
        assert_eq!(lookup("Kitchen").as_deref(), Some("media_player.kitchen"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(lookup("garage"), None);
        assert_eq!(lookup(""), None);
        assert!(find_player(&[], "Any").is_none());
    }
}
