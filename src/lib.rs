//! # cellpane
//!
//! Character-cell terminal UI toolkit.
//!
//! ## Architecture
//!
//! Input bytes are decoded on a reader thread and sent to a single render
//! loop, which owns every panel and is the only writer to the screen:
//!
//! ```text
//! stdin → Decoder → Event channel → WindowManager → Panel / widget
//!                                                     ↓
//!                 terminal ← DiffRenderer ← target CellGrid (Screen)
//! ```
//!
//! The renderer keeps a shadow copy of what the terminal shows and writes only
//! the cells that differ, so a flush with nothing changed writes nothing.
//!
//! ## Modules
//!
//! - [`types`] - Cells, attributes, colors
//! - [`renderer`] - ANSI output, cell grid, diff rendering
//! - [`drawable`] - Screen and nested windows
//! - [`input`] - Byte-stream decoder and stdin reader
//! - [`widgets`] - List, InputField, Prompt
//! - [`manager`] - Panel stack, input routing, redraw coalescing
//! - [`worker`] - Repeating background pollers
//! - [`pipeline`] - Raw mode, terminal size, resize signal

pub mod config;
pub mod drawable;
pub mod error;
pub mod input;
pub mod manager;
pub mod pipeline;
pub mod renderer;
pub mod types;
pub mod widgets;
pub mod worker;

// Re-export commonly used items
pub use types::*;

pub use config::Config;
pub use error::{Error, Result};

pub use drawable::{Canvas, Drawable, Screen, WindowId};

pub use input::{Decoder, EscapeKey, Key, Mouse};

pub use manager::{Context, Event, ManagerHandle, Panel, PanelId, WidgetId, WindowManager};

pub use renderer::{CellGrid, DiffRenderer, OutputBuffer};

pub use widgets::{FieldEvent, InputField, List, Prompt};

pub use worker::{with_suspended, RepeatingWorker, Worker, WorkerList};

pub use pipeline::{terminal_size, Terminal};
#[cfg(unix)]
pub use input::InputReader;
#[cfg(unix)]
pub use pipeline::watch_resize;
