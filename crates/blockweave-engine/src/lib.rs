//! Outline document engine.
//!
//! Parses bullet-outline notes into addressable block trees with typed inline
//! segments, and keeps a backlink index across a collection of pages.
//!
//! ## Modules
//!
//! - **`parsing`**: line classification, block tree construction, inline segmentation
//! - **`models`**: `Block`, the arena `Outline`, `Page`, and serializable snapshots
//! - **`editing`**: path-based addressing for inserting and removing blocks
//! - **`index`**: the forward/backward `BacklinkIndex`
//! - **`collection`**: batch loading of many documents
//! - **`io`**: the `DocumentSource` boundary and a filesystem implementation

pub mod collection;
pub mod editing;
pub mod index;
pub mod io;
pub mod models;
pub mod parsing;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use collection::{Collection, CollectionError, load_collection, parse_collection};
pub use editing::{AddressError, BlockPath, PathShift};
pub use index::{BacklinkIndex, BlockReference, ReferenceSource};
pub use io::{DocumentSource, FsSource, IoError, MemorySource, title_to_filename};
pub use models::{Block, BlockHandle, Outline, Page, PageSnapshot};
pub use parsing::{Diagnostic, ParseOptions, ParseResult, parse_document};
