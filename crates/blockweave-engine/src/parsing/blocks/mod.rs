//! # Block Tree Construction
//!
//! Second phase of document parsing. Classified lines are pushed, with their
//! indentation level, into a [`BlockBuilder`], which nests bullets into an
//! [`Outline`](crate::models::Outline).
//!
//! ## Rules
//!
//! - Empty lines and headers never become blocks
//! - A bullet nests under the nearest preceding bullet with a smaller indentation level
//! - A plain-text line indented deeper than the current bullet is a continuation line
//!   of that bullet (typically `key:: value` properties)
//! - Property lines above the first bullet are page properties

pub mod builder;

pub use builder::{BlockBuilder, BuiltOutline};
