//! Picking the item to play from search results.

use mass_client::{MediaItem, MediaType, SearchResults};

/// Order in which result types are considered for a generic "play X".
pub const GENERIC_PRIORITY: &[MediaType] = &[
    MediaType::Artist,
    MediaType::Album,
    MediaType::Playlist,
    MediaType::Track,
    MediaType::Radio,
];

/// First result of `media_type`, restricted to items by `artist` when given.
///
/// The artist filter is a case-insensitive substring match against every
/// artist attached to the item; items without artists never pass it.
pub fn select_item(
    results: &SearchResults,
    media_type: MediaType,
    artist: Option<&str>,
) -> Option<MediaItem> {
    let items = results.items(media_type);
    match artist.map(str::trim).filter(|a| !a.is_empty()) {
        Some(artist) => {
            let wanted = artist.to_lowercase();
            items
                .iter()
                .find(|item| {
                    item.artist_names()
                        .iter()
                        .any(|name| name.to_lowercase().contains(&wanted))
                })
                .cloned()
        }
        None => items.first().cloned(),
    }
}

/// Best match for an untyped query.
///
/// An item whose name equals the query wins, checked in
/// [`GENERIC_PRIORITY`] order; otherwise the first result of the first
/// non-empty type.
pub fn select_generic(results: &SearchResults, query: &str) -> Option<(MediaType, MediaItem)> {
    let wanted = query.trim().to_lowercase();

    let exact = GENERIC_PRIORITY.iter().find_map(|media_type| {
        results
            .items(*media_type)
            .iter()
            .find(|item| item.name.trim().to_lowercase() == wanted)
            .map(|item| (*media_type, item.clone()))
    });
    if exact.is_some() {
        return exact;
    }

    GENERIC_PRIORITY.iter().find_map(|media_type| {
        results
            .items(*media_type)
            .first()
            .map(|item| (*media_type, item.clone()))
    })
}
