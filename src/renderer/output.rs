//! Output buffering and stateful cell rendering.
//!
//! These components keep terminal traffic small by:
//! - Batching a whole flush into a single write
//! - Tracking the terminal's running style so only deltas are emitted
//! - Skipping cursor moves for cells written in sequence

use std::io::{self, Write};

use crate::types::{Attr, Cell, Style};

use super::ansi;
use super::buffer::char_width;

// =============================================================================
// OutputBuffer
// =============================================================================

/// A buffer that accumulates output for batch writing.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(16384)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear the buffer without deallocating.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Write everything to `writer` and empty the buffer.
    pub fn flush_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        self.data.clear();
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The accumulated data as a string (lossy).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// StatefulCellRenderer
// =============================================================================

/// Renders cells while tracking terminal state to minimize output.
///
/// Tracks:
/// - Last cursor position (to skip redundant moves)
/// - Box-drawing mode
/// - Active attributes (toggled by delta, never by full reset)
/// - Active color pair
///
/// [`finish`](Self::finish) returns the terminal to a neutral state.
#[derive(Debug)]
pub struct StatefulCellRenderer {
    last_row: i32,
    last_col: i32,
    state: Style,
}

impl StatefulCellRenderer {
    /// Create a renderer assuming a neutral terminal.
    pub fn new() -> Self {
        Self {
            last_row: -1,
            last_col: -1,
            state: Style::default(),
        }
    }

    /// Forget the cursor position. Call at the start of each pass.
    pub fn reset(&mut self) {
        self.last_row = -1;
        self.last_col = -1;
    }

    /// Style the terminal is currently in.
    #[inline]
    pub fn state(&self) -> Style {
        self.state
    }

    /// Render a single cell to the output buffer.
    ///
    /// Wide continuation cells produce no output.
    pub fn render_cell(&mut self, output: &mut OutputBuffer, row: u16, col: u16, cell: &Cell) {
        if cell.wide {
            return;
        }

        // 1. Cursor movement (only if not sequential)
        if row as i32 != self.last_row || col as i32 != self.last_col + 1 {
            ansi::cursor_to(output, row, col).ok();
        }

        // 2. Box-drawing mode
        if cell.box_mode != self.state.box_mode {
            if cell.box_mode {
                ansi::begin_box_drawing(output).ok();
            } else {
                ansi::end_box_drawing(output).ok();
            }
            self.state.box_mode = cell.box_mode;
        }

        // 3. Attributes, by delta
        let turn_off = self.state.attrs - cell.attrs;
        let turn_on = cell.attrs - self.state.attrs;
        ansi::attrs_off(output, turn_off).ok();
        ansi::attrs_on(output, turn_on).ok();
        self.state.attrs = cell.attrs;

        // 4. Color pair
        if cell.color != self.state.color {
            match cell.color {
                Some(pair) => ansi::color_on(output, pair).ok(),
                None => ansi::color_off(output).ok(),
            };
            self.state.color = cell.color;
        }

        // 5. The character
        output.write_char(cell.symbol);

        self.last_row = row as i32;
        self.last_col = col as i32 + char_width(cell.symbol).max(1) as i32 - 1;
    }

    /// Turn off whatever styling is still active.
    pub fn finish(&mut self, output: &mut OutputBuffer) {
        if self.state.attrs != Attr::NONE {
            ansi::attrs_off(output, self.state.attrs).ok();
        }
        if self.state.box_mode {
            ansi::end_box_drawing(output).ok();
        }
        if self.state.color.is_some() {
            ansi::color_off(output).ok();
        }
        self.state = Style::default();
    }
}

impl Default for StatefulCellRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
