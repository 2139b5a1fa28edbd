//! # Positional Editing
//!
//! Blocks have no identity that survives re-parsing, so edits address them by
//! [`BlockPath`]: child indices from the top of the outline. Inserting a block moves
//! the paths of its later siblings; [`compute_shifts`] reports those moves so
//! callers holding paths can update them.

pub mod path;

pub use path::{
    AddressError, BlockPath, PathShift, compute_shifts, find_by_path, insert_at_path, path_of,
    paths, remove_at_path,
};
