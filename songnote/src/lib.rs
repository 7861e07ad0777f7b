//! songnote library interface
//!
//! Resolves song metadata for a music-sharing link and turns a slice of the
//! song's video into a Telegram video note.
//!
//! # Modules
//! - `text` - pure string normalization
//! - `resolvers` - oEmbed and page-scraping stages
//! - `orchestrator` - stage sequencing and fragment merge
//! - `presentation` - display label and file name
//! - `services` - yt-dlp, ffmpeg, Telegram and working directory
//! - `pipeline` - end-to-end run used by the binary

pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod presentation;
pub mod resolvers;
pub mod services;
pub mod text;
pub mod types;

pub use crate::error::{DeliveryError, MediaError, PipelineError, ResolutionError};
pub use crate::orchestrator::{FallbackOrchestrator, Resolution};
pub use crate::presentation::PresentationStrings;
pub use crate::types::{RawMetadataFragment, ResolvedMetadata, SongOverride, SourceLink};
