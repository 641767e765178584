//! Episode identifier handling and response reshaping.
//!
//! Episode identifiers look like `nonton-<anime-slug>-episode-<n>`.

use crate::api::EpisodeResponse;
use crate::error::{ProviderError, ProviderResult};
use chrono::Utc;
use shared::{Episode, SourceMatrix};

/// Longest identifier accepted
pub const MAX_ID_LEN: usize = 200;

/// Reject identifiers that cannot name an upstream page
pub fn validate_id(id: &str) -> ProviderResult<&str> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(id)
    } else {
        Err(ProviderError::MalformedId { id: id.to_string() })
    }
}

/// Anime slug embedded in an episode identifier, or empty
pub fn anime_slug(id: &str) -> String {
    let parts: Vec<&str> = id.split('-').collect();
    if parts.len() <= 2 || parts[0] != "nonton" {
        return String::new();
    }

    match parts.iter().position(|&part| part == "episode") {
        Some(ep_index) if ep_index > 0 => parts[1..ep_index].join("-"),
        _ => String::new(),
    }
}

/// Episode number embedded in an episode identifier, or empty
pub fn episode_number(id: &str) -> String {
    id.split("episode-")
        .nth(1)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Leading decimal digits of an episode number, e.g. 12 for `12-end`
fn leading_number(episode_number: &str) -> Option<u32> {
    let trimmed = episode_number.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().ok()
}

/// Previous and next episode identifiers
pub fn neighbours(anime_slug: &str, episode_number: &str) -> (Option<String>, Option<String>) {
    let Some(number) = leading_number(episode_number) else {
        return (None, None);
    };

    let link = |n: u32| format!("nonton-{}-episode-{}", anime_slug, n);
    let prev = (number > 1).then(|| link(number - 1));
    (prev, Some(link(number + 1)))
}

/// Reshape the upstream response for the watch page
pub fn reshape(id: &str, response: EpisodeResponse) -> Episode {
    let anime_slug = anime_slug(id);
    let episode_number = episode_number(id);
    let (prev_episode, next_episode) = neighbours(&anime_slug, &episode_number);

    let anime_title = response
        .judul_episode
        .replacen(&format!(" Episode {}", episode_number), "", 1);

    let sources = SourceMatrix {
        main: response.api_data.src.unwrap_or_default(),
        embed: response.api_data.mirror.embed,
        download: response.api_data.mirror.download,
    };

    Episode {
        id: format!("episode-{}", id),
        title: response.judul_episode,
        slug: id.to_string(),
        anime_slug,
        anime_title,
        episode_title: format!("Episode {}", episode_number),
        episode_number,
        image: response.gambar,
        kind: "TV".to_string(),
        posted_at: response.metadata.published_time,
        prev_episode,
        next_episode,
        sources,
        fetched_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiData, EpisodeMetadata, Mirrors};

    #[test]
    fn test_validate_id() {
        assert!(validate_id("nonton-frieren-episode-3").is_ok());
        assert!(validate_id("nonton_x-1").is_ok());
        assert!(matches!(
            validate_id(""),
            Err(ProviderError::MalformedId { .. })
        ));
        assert!(validate_id("../etc/passwd").is_err());
        assert!(validate_id("a b").is_err());
        assert!(validate_id("x?url=y").is_err());
        assert!(validate_id(&"a".repeat(MAX_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_anime_slug() {
        assert_eq!(anime_slug("nonton-sousou-no-frieren-episode-3"), "sousou-no-frieren");
        assert_eq!(anime_slug("nonton-frieren-episode-12"), "frieren");
        assert_eq!(anime_slug("watch-frieren-episode-3"), "");
        assert_eq!(anime_slug("nonton-frieren"), "");
        assert_eq!(anime_slug("nonton-frieren-movie"), "");
    }

    #[test]
    fn test_episode_number() {
        assert_eq!(episode_number("nonton-frieren-episode-3"), "3");
        assert_eq!(episode_number("nonton-frieren-episode-12-end"), "12-end");
        assert_eq!(episode_number("nonton-frieren-movie"), "");
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(
            neighbours("frieren", "3"),
            (
                Some("nonton-frieren-episode-2".to_string()),
                Some("nonton-frieren-episode-4".to_string())
            )
        );
        assert_eq!(
            neighbours("frieren", "1"),
            (None, Some("nonton-frieren-episode-2".to_string()))
        );
        assert_eq!(
            neighbours("frieren", "12-end"),
            (
                Some("nonton-frieren-episode-11".to_string()),
                Some("nonton-frieren-episode-13".to_string())
            )
        );
        assert_eq!(neighbours("frieren", "end"), (None, None));
        assert_eq!(neighbours("frieren", ""), (None, None));
    }

    #[test]
    fn test_reshape() {
        let response = EpisodeResponse {
            judul_episode: "Sousou no Frieren Episode 3".to_string(),
            gambar: "https://img/3.jpg".to_string(),
            metadata: EpisodeMetadata {
                published_time: "2024-01-01".to_string(),
                ..Default::default()
            },
            api_data: ApiData {
                src: None,
                mirror: Mirrors::default(),
            },
        };

        let episode = reshape("nonton-sousou-no-frieren-episode-3", response);
        assert_eq!(episode.id, "episode-nonton-sousou-no-frieren-episode-3");
        assert_eq!(episode.anime_title, "Sousou no Frieren");
        assert_eq!(episode.episode_title, "Episode 3");
        assert_eq!(episode.anime_slug, "sousou-no-frieren");
        assert_eq!(episode.kind, "TV");
        assert_eq!(episode.posted_at, "2024-01-01");
        assert_eq!(
            episode.prev_episode.as_deref(),
            Some("nonton-sousou-no-frieren-episode-2")
        );
        assert_eq!(episode.sources.main, "");
    }

    #[test]
    fn test_reshape_strips_first_episode_suffix_only() {
        let response = EpisodeResponse {
            judul_episode: "Recap Episode 2 Episode 2".to_string(),
            gambar: String::new(),
            metadata: EpisodeMetadata::default(),
            api_data: ApiData {
                src: Some("https://x/video.mp4".to_string()),
                mirror: Mirrors::default(),
            },
        };

        let episode = reshape("nonton-recap-episode-2", response);
        assert_eq!(episode.anime_title, "Recap Episode 2");
        assert_eq!(episode.next_episode.as_deref(), Some("nonton-recap-episode-3"));
    }
}
