//! Framemark Timeline Parser
//!
//! Reads a Final Cut Pro X project file (FCPXML) and resolves its marker
//! annotations into absolute timestamps on source media:
//! - **Assets:** source-media references from the `resources` section,
//!   each carrying a filesystem path and a frame rate
//! - **Markers:** named points on `asset-clip` elements, normalized to
//!   `(seconds, frame)` pairs and bound to the referenced asset's path
//! - **Timecode:** conversion between FCPXML's rational and decimal
//!   duration strings
//!
//! Only flat asset-clip structures are handled; transitions, compound
//! clips, and multi-track compositing are out of scope.

pub mod document;
pub mod timecode;

pub use document::*;
pub use timecode::*;
