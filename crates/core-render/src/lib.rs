//! Rendering projection of a layered body.
//!
//! The run structure in `core-text` is the document; everything here is a
//! read-only projection of it:
//! - `style`: per-run colors from the owning layer's color mode, and run
//!   visibility from the layer's visibility plus the display mode.
//! - `project`: body -> lines of styled segments (placeholders stripped,
//!   collapsed runs dropped).
//! - `writer`: ordered terminal command list flushed through crossterm.
//! - `preview`: projection -> ANSI text for terminal previews.

pub mod preview;
pub mod project;
pub mod style;
pub mod writer;

pub use preview::{preview_string, render};
pub use project::{Line, Projection, Segment, project};
pub use style::{
    HIGHLIGHT_ALPHA, NEUTRAL_FG, Rgba, RunStyle, Visibility, compute_run_style,
    compute_run_visibility,
};
pub use writer::{Command, Writer};
