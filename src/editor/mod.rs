//! The editable markdown source.
//!
//! A rope-backed buffer with a single cursor, driven by the TEA update loop.

mod buffer;

pub use buffer::{Direction, SourceBuffer};
