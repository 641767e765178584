//! Watch-page source resolver.
//!
//! Owns the playback selection of one watch session and keeps the player
//! surface informed through a `watch` channel.

use crate::playback::{
    DownloadLink, Playback, PlaybackState, QualityOption, ServerId, ServerOption,
};
use crate::selection::{self, Selection};
use shared::{Host, Resolution, SourceMatrix};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Session-local source resolver
pub struct SourceResolver {
    /// Sources of the loaded episode
    matrix: Option<SourceMatrix>,
    /// Resolution used when the matrix gives no better hint
    default_resolution: Resolution,
    /// Current resolution, server and state
    selection: Selection,
    /// Publishes every state change to subscribers
    state_tx: watch::Sender<PlaybackState>,
}

impl SourceResolver {
    /// Create an uninitialized resolver
    pub fn new(default_resolution: Resolution) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::Uninitialized);

        Self {
            matrix: None,
            default_resolution,
            selection: Selection {
                resolution: default_resolution,
                server: None,
                state: PlaybackState::Uninitialized,
            },
            state_tx,
        }
    }

    /// Load an episode's sources and run the initial selection.
    ///
    /// Loading again (next episode) discards the previous selection.
    pub fn load(&mut self, matrix: SourceMatrix) -> PlaybackState {
        let selection = selection::initial_selection(&matrix, self.default_resolution);

        if matrix.main_is_hls() && selection.server == Some(ServerId::Main) {
            warn!(main = %matrix.main, "No embed mirror at 720p or 480p, falling back to HLS stream");
        }

        self.matrix = Some(matrix);
        self.apply(selection, "load")
    }

    /// Switch to a resolution
    pub fn set_resolution(&mut self, resolution: Resolution) -> PlaybackState {
        let Some(matrix) = &self.matrix else {
            debug!(resolution = %resolution, "Ignoring resolution change before load");
            return self.state();
        };

        let selection = selection::select_resolution(matrix, &self.selection, resolution);
        self.apply(selection, "resolution")
    }

    /// Switch to a server at the current resolution
    pub fn set_server(&mut self, server: ServerId) -> PlaybackState {
        let Some(matrix) = &self.matrix else {
            debug!(server = %server, "Ignoring server change before load");
            return self.state();
        };

        let selection = selection::select_server(matrix, &self.selection, server);
        self.apply(selection, "server")
    }

    fn apply(&mut self, selection: Selection, trigger: &str) -> PlaybackState {
        let state = selection.state.clone();

        match &state {
            PlaybackState::Resolved { url, mode } => info!(
                trigger = trigger,
                resolution = %selection.resolution,
                server = ?selection.server.map(|s| s.to_string()),
                mode = ?mode,
                url = %url,
                "Playback resolved"
            ),
            PlaybackState::Unavailable { cause } => warn!(
                trigger = trigger,
                resolution = %selection.resolution,
                server = ?selection.server.map(|s| s.to_string()),
                cause = %cause,
                "Playback unavailable"
            ),
            PlaybackState::Uninitialized => {}
        }

        self.selection = selection;
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });

        state
    }

    /// Current state machine state
    pub fn state(&self) -> PlaybackState {
        self.selection.state.clone()
    }

    /// URL and mode for the player surface
    pub fn playback(&self) -> Playback {
        Playback::from(&self.selection.state)
    }

    /// Receive every playback state change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    /// Current resolution
    pub fn resolution(&self) -> Resolution {
        self.selection.resolution
    }

    /// Current server, `None` after a reset found nothing
    pub fn server(&self) -> Option<ServerId> {
        self.selection.server
    }

    /// Download links at the current resolution.
    ///
    /// `None` until a matrix is loaded; an empty list means nothing to download.
    pub fn download_links(&self) -> Option<Vec<DownloadLink>> {
        let matrix = self.matrix.as_ref()?;

        let links = matrix
            .download
            .at(self.selection.resolution)
            .available(&Host::DOWNLOAD_ORDER)
            .map(|(host, url)| DownloadLink {
                label: host.label(),
                url: url.to_string(),
            })
            .collect();

        Some(links)
    }

    /// Server selector entries: the primary stream, then every host with a
    /// 720p embed mirror
    pub fn server_options(&self) -> Vec<ServerOption> {
        let Some(matrix) = &self.matrix else {
            return Vec::new();
        };

        std::iter::once(ServerId::Main)
            .chain(
                matrix
                    .embed
                    .v720p
                    .available(&Host::EMBED_ORDER)
                    .map(|(host, _)| ServerId::Host(host)),
            )
            .map(|server| ServerOption {
                server,
                label: server.label(),
            })
            .collect()
    }

    /// Quality selector entries, highest first
    pub fn quality_options(&self) -> Vec<QualityOption> {
        Resolution::DESCENDING
            .into_iter()
            .map(|resolution| QualityOption {
                resolution,
                label: resolution.label().to_string(),
                available: self
                    .matrix
                    .as_ref()
                    .is_some_and(|matrix| matrix.embed.at(resolution).has_embed()),
            })
            .collect()
    }
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}
