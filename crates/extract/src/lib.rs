//! Framemark Extraction Engine
//!
//! Turns a parsed marker sequence into still images on disk:
//!
//! ```text
//! project.fcpxml ──▶ framemark-timeline ──▶ [Marker, ...]
//!                                                │
//!                          ffprobe ◀── probe ────┤
//!                                                │
//!                   geometry (quality tier + aspect ratio)
//!                                                │
//!                                                ▼
//!                               ffmpeg -ss <t> -vframes 1 ... <name>.jpg
//! ```
//!
//! One ffmpeg process is spawned per marker, sequentially; a failed marker
//! is reported and skipped without aborting the batch.

pub mod extract;
pub mod geometry;
pub mod probe;

pub use extract::*;
