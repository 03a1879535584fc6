//! Terminal renderer - the "blind" output layer.
//!
//! The renderer knows only about cells. It takes a filled target
//! [`CellGrid`], diffs it against its shadow buffer and emits the minimal
//! ANSI traffic to bring the terminal in sync.

pub mod ansi;
pub mod buffer;
pub mod diff;
pub mod output;

pub use buffer::{char_width, chars_width, string_width, CellGrid};
pub use diff::DiffRenderer;
pub use output::{OutputBuffer, StatefulCellRenderer};
