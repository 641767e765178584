//! Watch-page session: fetch an episode, resolve its sources and apply the
//! viewer's quality and server choices.

use anime_api::{EpisodeProvider, ProviderResult};
use serde::Serialize;
use shared::{Episode, Resolution};
use source_resolver::{
    DownloadLink, Playback, PlaybackState, QualityOption, ServerId, ServerOption, SourceResolver,
};
use tokio::sync::watch;
use tracing::{debug, info};

/// Viewer choices given on the command line
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub default_resolution: Resolution,
    pub quality: Option<Resolution>,
    pub server: Option<ServerId>,
}

/// Everything the player surface shows for one episode
#[derive(Debug, Serialize)]
pub struct WatchReport {
    pub episode: Episode,
    pub resolution: Resolution,
    pub server: Option<ServerId>,
    pub playback: Playback,
    pub state: PlaybackState,
    pub servers: Vec<ServerOption>,
    pub qualities: Vec<QualityOption>,
    pub downloads: Vec<DownloadLink>,
    /// Number of state changes published to the player
    pub updates: usize,
}

/// Run one watch session
pub async fn watch_episode<P: EpisodeProvider>(
    provider: &mut P,
    episode_id: &str,
    options: &WatchOptions,
) -> ProviderResult<WatchReport> {
    let episode = provider.episode(episode_id).await?;
    info!(
        episode = %episode.slug,
        title = %episode.title,
        "Episode loaded"
    );

    let mut resolver = SourceResolver::new(options.default_resolution);
    let mut player = resolver.subscribe();
    let mut updates = 0;

    resolver.load(episode.sources.clone());
    updates += notify_player(&mut player);

    if let Some(quality) = options.quality {
        resolver.set_resolution(quality);
        updates += notify_player(&mut player);
    }

    if let Some(server) = options.server {
        resolver.set_server(server);
        updates += notify_player(&mut player);
    }

    Ok(WatchReport {
        resolution: resolver.resolution(),
        server: resolver.server(),
        playback: resolver.playback(),
        state: resolver.state(),
        servers: resolver.server_options(),
        qualities: resolver.quality_options(),
        downloads: resolver.download_links().unwrap_or_default(),
        updates,
        episode,
    })
}

/// Consume a pending state change, if any
fn notify_player(player: &mut watch::Receiver<PlaybackState>) -> usize {
    if !player.has_changed().unwrap_or(false) {
        return 0;
    }

    let state = player.borrow_and_update().clone();
    debug!(state = ?state, "Player updated");
    1
}
