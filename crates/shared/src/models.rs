//! Data models for the project.
//!
//! This module defines the episode source payload (primary stream plus the
//! mirror matrix), the fixed host and resolution sets, and the reshaped
//! episode record returned by the provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Video resolution offered by the upstream mirrors
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Resolution {
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    /// All resolutions, highest first (selector order)
    pub const DESCENDING: [Resolution; 4] = [
        Resolution::P1080,
        Resolution::P720,
        Resolution::P480,
        Resolution::P360,
    ];

    /// Short label, e.g. `720p`
    pub fn label(self) -> &'static str {
        match self {
            Resolution::P360 => "360p",
            Resolution::P480 => "480p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Resolution {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.trim_start_matches('v').trim_end_matches('p');
        match normalized {
            "360" => Ok(Resolution::P360),
            "480" => Ok(Resolution::P480),
            "720" => Ok(Resolution::P720),
            "1080" => Ok(Resolution::P1080),
            _ => Err(anyhow::anyhow!("Invalid resolution: {}", s)),
        }
    }
}

/// Third-party file host serving a mirror
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    Filelions,
    Doodstream,
    Pixeldrain,
    Mp4upload,
    Krakenfiles,
    /// Download-only host
    Gofile,
}

impl Host {
    /// Order in which embed mirrors are tried when the primary stream is not used
    pub const EMBED_PRIORITY: [Host; 5] = [
        Host::Mp4upload,
        Host::Doodstream,
        Host::Krakenfiles,
        Host::Filelions,
        Host::Pixeldrain,
    ];

    /// Field order of the upstream embed mirror sets
    pub const EMBED_ORDER: [Host; 5] = [
        Host::Filelions,
        Host::Doodstream,
        Host::Pixeldrain,
        Host::Mp4upload,
        Host::Krakenfiles,
    ];

    /// Field order of the upstream download mirror sets. Doodstream never
    /// appears in downloads upstream and is listed last.
    pub const DOWNLOAD_ORDER: [Host; 6] = [
        Host::Filelions,
        Host::Pixeldrain,
        Host::Mp4upload,
        Host::Krakenfiles,
        Host::Gofile,
        Host::Doodstream,
    ];

    /// Identifier used on the wire and in server selections
    pub fn id(self) -> &'static str {
        match self {
            Host::Filelions => "filelions",
            Host::Doodstream => "doodstream",
            Host::Pixeldrain => "pixeldrain",
            Host::Mp4upload => "mp4upload",
            Host::Krakenfiles => "krakenfiles",
            Host::Gofile => "gofile",
        }
    }

    /// Human-readable name
    pub fn label(self) -> String {
        host_label(self.id())
    }

    /// Whether the host can be played inline; gofile only serves downloads
    pub fn is_embed(self) -> bool {
        Host::EMBED_ORDER.contains(&self)
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Host {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filelions" => Ok(Host::Filelions),
            "doodstream" => Ok(Host::Doodstream),
            "pixeldrain" => Ok(Host::Pixeldrain),
            "mp4upload" => Ok(Host::Mp4upload),
            "krakenfiles" => Ok(Host::Krakenfiles),
            "gofile" => Ok(Host::Gofile),
            _ => Err(anyhow::anyhow!("Invalid host: {}", s)),
        }
    }
}

/// Display name for a host identifier. Unknown identifiers get their first
/// letter capitalized.
pub fn host_label(id: &str) -> String {
    match id {
        "filelions" => "FileLions".to_string(),
        "doodstream" => "DoodStream".to_string(),
        "pixeldrain" => "PixelDrain".to_string(),
        "mp4upload" => "MP4Upload".to_string(),
        "krakenfiles" => "KrakenFiles".to_string(),
        "gofile" => "GoFile".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Mirror URLs for one resolution, keyed by host
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorSet {
    #[serde(default, deserialize_with = "non_empty_url")]
    pub filelions: Option<String>,
    #[serde(default, deserialize_with = "non_empty_url")]
    pub doodstream: Option<String>,
    #[serde(default, deserialize_with = "non_empty_url")]
    pub pixeldrain: Option<String>,
    #[serde(default, deserialize_with = "non_empty_url")]
    pub mp4upload: Option<String>,
    #[serde(default, deserialize_with = "non_empty_url")]
    pub krakenfiles: Option<String>,
    #[serde(default, deserialize_with = "non_empty_url")]
    pub gofile: Option<String>,
}

impl MirrorSet {
    /// URL for a host, if that host serves this resolution
    pub fn get(&self, host: Host) -> Option<&str> {
        let url = match host {
            Host::Filelions => &self.filelions,
            Host::Doodstream => &self.doodstream,
            Host::Pixeldrain => &self.pixeldrain,
            Host::Mp4upload => &self.mp4upload,
            Host::Krakenfiles => &self.krakenfiles,
            Host::Gofile => &self.gofile,
        };
        url.as_deref()
    }

    /// First available host in the given order
    pub fn first_available(&self, order: &[Host]) -> Option<(Host, &str)> {
        order
            .iter()
            .find_map(|&host| self.get(host).map(|url| (host, url)))
    }

    /// Available (host, URL) pairs in the given order
    pub fn available<'a>(&'a self, order: &'a [Host]) -> impl Iterator<Item = (Host, &'a str)> + 'a {
        order
            .iter()
            .filter_map(move |&host| self.get(host).map(|url| (host, url)))
    }

    /// Embed URL for a host; download-only hosts never have one
    pub fn embed_url(&self, host: Host) -> Option<&str> {
        self.get(host).filter(|_| host.is_embed())
    }

    /// True when at least one embeddable host serves this resolution
    pub fn has_embed(&self) -> bool {
        self.available(&Host::EMBED_ORDER).next().is_some()
    }
}

/// Mirror sets for every resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorMatrix {
    #[serde(default)]
    pub v360p: MirrorSet,
    #[serde(default)]
    pub v480p: MirrorSet,
    #[serde(default)]
    pub v720p: MirrorSet,
    #[serde(default)]
    pub v1080p: MirrorSet,
}

impl MirrorMatrix {
    /// Mirror set for a resolution
    pub fn at(&self, resolution: Resolution) -> &MirrorSet {
        match resolution {
            Resolution::P360 => &self.v360p,
            Resolution::P480 => &self.v480p,
            Resolution::P720 => &self.v720p,
            Resolution::P1080 => &self.v1080p,
        }
    }

    /// Highest resolution with at least one embeddable mirror
    pub fn highest_embed(&self) -> Option<Resolution> {
        Resolution::DESCENDING
            .into_iter()
            .find(|&resolution| self.at(resolution).has_embed())
    }
}

/// All playable and downloadable sources for one episode
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceMatrix {
    /// Primary stream URL (may be empty, never null)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub main: String,
    /// Mirrors for inline embed playback
    #[serde(default)]
    pub embed: MirrorMatrix,
    /// Mirrors for file downloads
    #[serde(default)]
    pub download: MirrorMatrix,
}

impl SourceMatrix {
    /// Whether the primary stream is a segmented HLS playlist
    pub fn main_is_hls(&self) -> bool {
        is_hls_url(&self.main)
    }
}

/// HLS playlists are recognized by their `.m3u8` extension anywhere in the URL
pub fn is_hls_url(url: &str) -> bool {
    url.contains(".m3u8")
}

fn non_empty_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|url| !url.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Episode metadata and sources, reshaped from the upstream API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub anime_slug: String,
    pub anime_title: String,
    pub episode_title: String,
    pub episode_number: String,
    pub image: String,
    pub kind: String,           // TV, Movie, ...
    pub posted_at: String,      // As published upstream
    pub prev_episode: Option<String>,
    pub next_episode: Option<String>,
    pub sources: SourceMatrix,

    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parse() {
        assert_eq!("720p".parse::<Resolution>().unwrap(), Resolution::P720);
        assert_eq!("v1080p".parse::<Resolution>().unwrap(), Resolution::P1080);
        assert_eq!("480".parse::<Resolution>().unwrap(), Resolution::P480);
        assert!("4k".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_host_labels() {
        assert_eq!(Host::Mp4upload.label(), "MP4Upload");
        assert_eq!(Host::Gofile.label(), "GoFile");
        assert_eq!(host_label("streamtape"), "Streamtape");
        assert_eq!(host_label(""), "");
    }

    #[test]
    fn test_matrix_deserialize_sparse() {
        let json = r#"{
            "main": "https://x/stream.m3u8",
            "embed": {
                "v720p": { "mp4upload": null, "doodstream": "https://d/720", "filelions": "" }
            }
        }"#;

        let matrix: SourceMatrix = serde_json::from_str(json).unwrap();
        assert!(matrix.main_is_hls());
        assert_eq!(matrix.embed.v720p.get(Host::Doodstream), Some("https://d/720"));
        assert_eq!(matrix.embed.v720p.get(Host::Filelions), None);
        assert!(!matrix.embed.v1080p.has_embed());
        assert_eq!(matrix.download.v720p.available(&Host::DOWNLOAD_ORDER).count(), 0);
    }

    #[test]
    fn test_null_main_becomes_empty() {
        let matrix: SourceMatrix = serde_json::from_str(r#"{ "main": null }"#).unwrap();
        assert_eq!(matrix.main, "");
        assert!(!matrix.main_is_hls());
    }

    #[test]
    fn test_highest_embed() {
        let mut matrix = MirrorMatrix::default();
        assert_eq!(matrix.highest_embed(), None);

        matrix.v480p.pixeldrain = Some("https://p/480".to_string());
        assert_eq!(matrix.highest_embed(), Some(Resolution::P480));

        // A gofile entry is not an embed source
        matrix.v1080p.gofile = Some("https://g/1080".to_string());
        assert_eq!(matrix.highest_embed(), Some(Resolution::P480));

        matrix.v1080p.krakenfiles = Some("https://k/1080".to_string());
        assert_eq!(matrix.highest_embed(), Some(Resolution::P1080));
    }

    #[test]
    fn test_gofile_is_download_only() {
        assert!(!Host::Gofile.is_embed());
        assert!(Host::EMBED_PRIORITY.iter().all(|host| host.is_embed()));

        let set = MirrorSet {
            gofile: Some("https://g/720".to_string()),
            ..Default::default()
        };
        assert!(!set.has_embed());
        assert_eq!(set.embed_url(Host::Gofile), None);
        assert_eq!(set.get(Host::Gofile), Some("https://g/720"));
    }

    #[test]
    fn test_default_resolution() {
        assert_eq!(Resolution::default(), Resolution::P720);
    }

    #[test]
    fn test_first_available_respects_order() {
        let set = MirrorSet {
            filelions: Some("https://f".to_string()),
            krakenfiles: Some("https://k".to_string()),
            ..Default::default()
        };

        assert_eq!(
            set.first_available(&Host::EMBED_PRIORITY),
            Some((Host::Krakenfiles, "https://k"))
        );
        assert_eq!(set.available(&Host::DOWNLOAD_ORDER).count(), 2);
    }
}
