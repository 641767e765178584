//! Video source resolution for the watch page.
//!
//! Given an episode's primary stream and mirror matrix, this library decides
//! which URL the player gets, in which playback mode, and how that decision
//! follows the user's quality and server choices.

pub mod playback;
pub mod resolver;
pub mod selection;

pub use playback::{
    DownloadLink, Playback, PlaybackMode, PlaybackState, QualityOption, ServerId, ServerOption,
    StreamMode, Unavailable,
};
pub use resolver::SourceResolver;
pub use selection::Selection;
