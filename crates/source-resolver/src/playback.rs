//! Playback state handed to the player surface.

use serde::{Deserialize, Serialize};
use shared::{Host, Resolution};
use thiserror::Error;

/// Server choice on the watch page: the primary stream or an embed host
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "String", try_from = "String")]
pub enum ServerId {
    Main,
    Host(Host),
}

impl ServerId {
    /// Label shown in the server selector
    pub fn label(self) -> String {
        match self {
            ServerId::Main => "Default Server".to_string(),
            ServerId::Host(host) => host.label(),
        }
    }
}

impl From<Host> for ServerId {
    fn from(host: Host) -> Self {
        ServerId::Host(host)
    }
}

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerId::Main => f.write_str("main"),
            ServerId::Host(host) => write!(f, "{}", host),
        }
    }
}

impl From<ServerId> for String {
    fn from(server: ServerId) -> Self {
        server.to_string()
    }
}

impl TryFrom<String> for ServerId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for ServerId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("main") {
            return Ok(ServerId::Main);
        }
        s.parse::<Host>()
            .map(ServerId::Host)
            .map_err(|_| anyhow::anyhow!("Invalid server: {}", s))
    }
}

/// How a resolved URL must be played
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    /// Segmented stream for an HLS-capable media element
    Hls,
    /// Direct file or host page rendered in an embedded frame
    Embedded,
}

/// Why no URL can be handed to the player
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unavailable {
    /// Matrix loaded but neither the primary stream nor any mirror is usable
    #[error("No playable source for this episode")]
    NoPlayableSource,

    /// The explicitly selected host has no mirror at the current resolution
    #[error("{host} is not available at {resolution}")]
    ServerUnavailableAtResolution { host: Host, resolution: Resolution },

    /// No host at all serves the requested resolution
    #[error("No mirror available at {resolution}")]
    NoMirrorAtResolution { resolution: Resolution },
}

/// Resolver state machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    /// No source matrix loaded yet
    Uninitialized,
    /// A URL is ready to play
    Resolved { url: String, mode: StreamMode },
    /// Nothing to play for the current selection
    Unavailable { cause: Unavailable },
}

impl PlaybackState {
    pub(crate) fn resolved(url: impl Into<String>, mode: StreamMode) -> Self {
        PlaybackState::Resolved {
            url: url.into(),
            mode,
        }
    }

    pub(crate) fn unavailable(cause: Unavailable) -> Self {
        PlaybackState::Unavailable { cause }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, PlaybackState::Resolved { .. })
    }
}

/// Flattened playback mode, as consumed by the player surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    Hls,
    Embedded,
    Unavailable,
}

/// URL and mode the player surface renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playback {
    pub url: String,
    pub mode: PlaybackMode,
}

impl From<&PlaybackState> for Playback {
    fn from(state: &PlaybackState) -> Self {
        match state {
            PlaybackState::Resolved { url, mode } => Playback {
                url: url.clone(),
                mode: match mode {
                    StreamMode::Hls => PlaybackMode::Hls,
                    StreamMode::Embedded => PlaybackMode::Embedded,
                },
            },
            PlaybackState::Uninitialized | PlaybackState::Unavailable { .. } => Playback {
                url: String::new(),
                mode: PlaybackMode::Unavailable,
            },
        }
    }
}

/// Download entry for the current resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: String,
    pub url: String,
}

/// Entry of the server selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerOption {
    pub server: ServerId,
    pub label: String,
}

/// Entry of the quality selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityOption {
    pub resolution: Resolution,
    pub label: String,
    /// At least one embed mirror serves this resolution
    pub available: bool,
}
