//! Source selection rules.
//!
//! Pure functions over a [`SourceMatrix`]; the resolver owns the session
//! state and calls into these on load and on every user choice.

use crate::playback::{PlaybackState, ServerId, StreamMode, Unavailable};
use shared::{Host, Resolution, SourceMatrix};

/// Resolutions searched, in order, when the primary stream is not used
pub const FALLBACK_RESOLUTIONS: [Resolution; 2] = [Resolution::P720, Resolution::P480];

/// Outcome of a selection step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub resolution: Resolution,
    pub server: Option<ServerId>,
    pub state: PlaybackState,
}

/// First embed mirror at `resolution` in host priority order
pub fn find_embed_mirror(matrix: &SourceMatrix, resolution: Resolution) -> Option<(Host, &str)> {
    matrix
        .embed
        .at(resolution)
        .first_available(&Host::EMBED_PRIORITY)
}

/// First embed mirror across the fallback resolutions
pub fn find_fallback_mirror(matrix: &SourceMatrix) -> Option<(Resolution, Host, &str)> {
    FALLBACK_RESOLUTIONS.into_iter().find_map(|resolution| {
        find_embed_mirror(matrix, resolution).map(|(host, url)| (resolution, host, url))
    })
}

/// Resolution shown while the primary stream plays: the preferred one when it
/// has mirrors, otherwise the highest with mirrors, otherwise the preferred one
pub fn display_resolution(matrix: &SourceMatrix, preferred: Resolution) -> Resolution {
    if matrix.embed.at(preferred).has_embed() {
        return preferred;
    }
    matrix.embed.highest_embed().unwrap_or(preferred)
}

/// State for the primary stream
pub fn main_state(matrix: &SourceMatrix) -> PlaybackState {
    if matrix.main.trim().is_empty() {
        return PlaybackState::unavailable(Unavailable::NoPlayableSource);
    }
    let mode = if matrix.main_is_hls() {
        StreamMode::Hls
    } else {
        StreamMode::Embedded
    };
    PlaybackState::resolved(matrix.main.clone(), mode)
}

/// Selection made when a matrix is first loaded.
///
/// A direct primary stream is used as is. An HLS primary stream is only used
/// when no embed mirror exists at 720p or 480p. An empty primary stream is
/// not a direct stream: the mirror search runs, and with no mirror there is
/// nothing to play.
pub fn initial_selection(matrix: &SourceMatrix, preferred: Resolution) -> Selection {
    let main_usable = !matrix.main.trim().is_empty();

    if main_usable && !matrix.main_is_hls() {
        return Selection {
            resolution: display_resolution(matrix, preferred),
            server: Some(ServerId::Main),
            state: PlaybackState::resolved(matrix.main.clone(), StreamMode::Embedded),
        };
    }

    if let Some((resolution, host, url)) = find_fallback_mirror(matrix) {
        return Selection {
            resolution,
            server: Some(ServerId::Host(host)),
            state: PlaybackState::resolved(url, StreamMode::Embedded),
        };
    }

    if main_usable {
        return Selection {
            resolution: display_resolution(matrix, preferred),
            server: Some(ServerId::Main),
            state: PlaybackState::resolved(matrix.main.clone(), StreamMode::Hls),
        };
    }

    Selection {
        resolution: display_resolution(matrix, preferred),
        server: None,
        state: PlaybackState::unavailable(Unavailable::NoPlayableSource),
    }
}

/// Selection after the user picks a resolution.
///
/// The primary stream has no resolution variants and keeps playing. A host
/// that serves the new resolution is kept; otherwise the host choice is reset
/// and the priority search runs at the new resolution.
pub fn select_resolution(
    matrix: &SourceMatrix,
    current: &Selection,
    resolution: Resolution,
) -> Selection {
    match current.server {
        Some(ServerId::Main) => {
            return Selection {
                resolution,
                server: current.server,
                state: current.state.clone(),
            };
        }
        Some(ServerId::Host(host)) => {
            if let Some(url) = matrix.embed.at(resolution).embed_url(host) {
                return Selection {
                    resolution,
                    server: current.server,
                    state: PlaybackState::resolved(url, StreamMode::Embedded),
                };
            }
        }
        None => {}
    }

    match find_embed_mirror(matrix, resolution) {
        Some((host, url)) => Selection {
            resolution,
            server: Some(ServerId::Host(host)),
            state: PlaybackState::resolved(url, StreamMode::Embedded),
        },
        None => Selection {
            resolution,
            server: None,
            state: PlaybackState::unavailable(Unavailable::NoMirrorAtResolution { resolution }),
        },
    }
}

/// Selection after the user picks a server. The resolution never changes.
pub fn select_server(matrix: &SourceMatrix, current: &Selection, server: ServerId) -> Selection {
    let state = match server {
        ServerId::Main => main_state(matrix),
        ServerId::Host(host) => match matrix.embed.at(current.resolution).embed_url(host) {
            Some(url) => PlaybackState::resolved(url, StreamMode::Embedded),
            None => PlaybackState::unavailable(Unavailable::ServerUnavailableAtResolution {
                host,
                resolution: current.resolution,
            }),
        },
    };

    Selection {
        resolution: current.resolution,
        server: Some(server),
        state,
    }
}
