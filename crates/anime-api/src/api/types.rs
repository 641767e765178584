//! Upstream anime API response types.
//!
//! These types represent the JSON returned by the episode endpoint. Catalog
//! endpoints are passed through as untyped JSON.

use serde::{Deserialize, Serialize};
use shared::MirrorMatrix;

/// Episode endpoint response (`/api/nonton`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeResponse {
    /// Full episode title, e.g. "Frieren Episode 3"
    pub judul_episode: String,
    /// Thumbnail URL
    #[serde(default)]
    pub gambar: String,
    #[serde(default)]
    pub metadata: EpisodeMetadata,
    pub api_data: ApiData,
}

/// Page metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeMetadata {
    #[serde(default)]
    pub deskripsi: String,
    #[serde(default)]
    pub published_time: String,
    #[serde(default)]
    pub og_image: String,
    #[serde(default)]
    pub canonical_url: String,
}

/// Player payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiData {
    /// Primary stream URL
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub mirror: Mirrors,
}

/// Mirror matrices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mirrors {
    #[serde(default)]
    pub embed: MirrorMatrix,
    #[serde(default)]
    pub download: MirrorMatrix,
}

/// Season endpoint selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeasonQuery {
    /// Current season
    Current,
    /// List of known seasons
    List,
    /// A specific season, e.g. year 2024, season "spring"
    Specific { year: u16, season: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Host;

    #[test]
    fn test_parse_episode_response() {
        let json = r#"{
            "judulEpisode": "Frieren Episode 3",
            "gambar": "https://img/3.jpg",
            "metadata": {
                "deskripsi": "desc",
                "publishedTime": "2024-01-01T00:00:00+00:00",
                "ogImage": "https://img/og.jpg",
                "canonicalUrl": "https://site/nonton-frieren-episode-3"
            },
            "apiData": {
                "token": "t",
                "blog": "b",
                "src": "https://x/stream.m3u8",
                "mirror": {
                    "embed": {
                        "v360p": { "filelions": null, "doodstream": null, "pixeldrain": null, "mp4upload": null, "krakenfiles": null },
                        "v720p": { "filelions": null, "doodstream": "https://d/720", "pixeldrain": null, "mp4upload": null, "krakenfiles": null }
                    },
                    "download": {
                        "v720p": { "filelions": null, "pixeldrain": "https://p/720", "mp4upload": null, "krakenfiles": null, "gofile": "https://g/720" }
                    },
                    "filelions": null,
                    "blog": null,
                    "raw": null
                }
            }
        }"#;

        let response: EpisodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.judul_episode, "Frieren Episode 3");
        assert_eq!(response.metadata.published_time, "2024-01-01T00:00:00+00:00");
        assert_eq!(response.api_data.src.as_deref(), Some("https://x/stream.m3u8"));
        assert_eq!(
            response.api_data.mirror.embed.v720p.get(Host::Doodstream),
            Some("https://d/720")
        );
        assert_eq!(
            response.api_data.mirror.download.v720p.get(Host::Gofile),
            Some("https://g/720")
        );
        assert_eq!(
            response
                .api_data
                .mirror
                .download
                .v1080p
                .available(&Host::DOWNLOAD_ORDER)
                .count(),
            0
        );
    }

    #[test]
    fn test_parse_minimal_response() {
        let json = r#"{ "judulEpisode": "X Episode 1", "apiData": { "src": null } }"#;
        let response: EpisodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.api_data.src, None);
        assert!(!response.api_data.mirror.embed.v720p.has_embed());
    }
}
