//! # Cross-document Index
//!
//! The [`BacklinkIndex`] records which blocks of which pages reference which other
//! pages, in both directions. It is built from whole pages and then kept current by
//! per-block updates as content changes.

pub mod backlinks;

pub use backlinks::{BacklinkIndex, BlockReference, IndexError, ReferenceSource};
