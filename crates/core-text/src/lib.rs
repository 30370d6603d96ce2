//! Layer-tagged run model.
//!
//! A `Body` is an ordered list of blocks (paragraphs, list items); each block
//! is an ordered list of runs; each run is text owned by one layer, with an
//! opaque decoration payload and an optional trailing line break. The
//! normalizer restores the structural invariants after any edit:
//! - no nested runs;
//! - every run tagged with a layer;
//! - no empty runs (a lone placeholder anchoring an empty line is not empty);
//! - no two same-layer runs adjacent on the same line.

pub mod block;
pub mod body;
pub mod decoration;
pub mod normalize;
pub mod run;
pub mod segment;
pub mod stats;

/// Zero-width anchor keeping a caret position alive on an otherwise empty line.
pub const PLACEHOLDER: char = '\u{200B}';

pub use block::{Alignment, Block, BlockKind, ListKind, Locate};
pub use body::{Body, TextPosition};
pub use decoration::{Decoration, MarkSpan, Marks};
pub use normalize::{NormalizeReport, Normalizer, Pass, anchor_list_items, normalize};
pub use run::Run;
pub use segment::normalize_input;
pub use stats::Stats;
