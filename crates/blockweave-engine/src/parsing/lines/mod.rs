//! # Line Classification
//!
//! First phase of document parsing. Every physical line is classified on its own,
//! without reference to its neighbours, into a [`Line`] carrying its kind and the
//! metadata found on it.
//!
//! ## Modules
//!
//! - **`classify`**: `Line`, `LineKind`, and the two entry points `classify_line`
//!   (document lines) and `classify_content_line` (lines of edited block content)
//! - **`task`**: task keywords, priorities and checkboxes
//! - **`extract`**: page references, block ids, properties, tags and block references
//!
//! Header lines carry no metadata. Block and plain-text lines run every extractor.

pub mod classify;
pub mod extract;
pub mod task;

pub use classify::{Line, LineKind, classify_content_line, classify_line};
pub use task::{CheckboxState, TaskInfo, TaskState, parse_task_info, strip_task_prefix};
