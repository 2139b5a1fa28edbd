//! Document model: blocks held in an arena [`Outline`], owned by a [`Page`].

pub mod block;
pub mod outline;
pub mod page;
pub mod snapshot;

pub use block::{Block, BlockHandle};
pub use outline::Outline;
pub use page::Page;
pub use snapshot::{BlockSnapshot, PageSnapshot};
