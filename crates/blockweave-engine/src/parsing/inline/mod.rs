//! # Inline Segmentation
//!
//! Tokenizes block content into typed [`Segment`]s for rendering and link
//! extraction. Inline parsing runs over a whole block's content after the block
//! tree is built, and again whenever the content changes.
//!
//! ## Modules
//!
//! - **`types`**: `Segment` and `SegmentKind`
//! - **`parser`**: `parse_segments()`, a single ordered alternation scanned left to right
//!
//! ## Precedence
//!
//! At a given offset the earliest alternative wins: queries and embeds are taken
//! whole before their inner `[[links]]` are seen, and `**bold**` wins over `*italic*`.

pub mod parser;
pub mod types;

pub use parser::parse_segments;
pub use types::{Segment, SegmentKind};
