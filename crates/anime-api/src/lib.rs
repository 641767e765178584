//! Anime API library for fetching episodes and catalog listings.
//!
//! This library provides a client for the upstream anime API, reshapes
//! episode responses into [`shared::Episode`] and caches catalog responses.

pub mod api;
pub mod cache;
pub mod episode;
pub mod error;

pub use api::{AnimeApiClient, EpisodeProvider, SeasonQuery};
pub use cache::{CacheManager, CacheStats};
pub use error::{ProviderError, ProviderResult};
