//! Anime API client implementation.
//!
//! This module provides a timeout-bounded client for the upstream anime API.
//! Requests are never retried; failures are surfaced to the caller.

pub mod client;
pub mod types;

pub use client::{AnimeApiClient, EpisodeProvider};
pub use types::*;
