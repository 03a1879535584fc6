//! Terminal plumbing around the render loop: mode setup, size queries and
//! resize notifications.

#[cfg(unix)]
pub mod signals;
pub mod terminal;

#[cfg(unix)]
pub use signals::watch_resize;
pub use terminal::{terminal_size, Terminal};
