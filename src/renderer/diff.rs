//! Differential renderer.
//!
//! The DiffRenderer owns the shadow buffer - its record of what was last
//! physically written - and emits only the cells where the target differs.
//!
//! # Algorithm
//!
//! 1. For each cell of the target, row by row:
//!    - Skip wide continuation cells
//!    - If the cell differs from the shadow cell (or a full redraw was
//!      requested): render it with the StatefulCellRenderer
//! 2. Turn off any styling still active
//! 3. Copy the target into the shadow, changed or not
//!
//! A second pass with no intervening writes therefore emits nothing.

use super::buffer::CellGrid;
use super::output::{OutputBuffer, StatefulCellRenderer};

/// Differential renderer.
#[derive(Debug)]
pub struct DiffRenderer {
    cell_renderer: StatefulCellRenderer,
    shadow: CellGrid,
    force: bool,
}

impl DiffRenderer {
    /// Create a renderer whose shadow matches a blank `height` x `width` screen.
    pub fn new(height: u16, width: u16) -> Self {
        Self {
            cell_renderer: StatefulCellRenderer::new(),
            shadow: CellGrid::new(height, width),
            force: false,
        }
    }

    /// Render `target` into `output`, emitting only changed cells.
    ///
    /// Returns true if any cell was written.
    pub fn render(&mut self, target: &CellGrid, output: &mut OutputBuffer) -> bool {
        if self.shadow.width() != target.width() || self.shadow.height() != target.height() {
            self.shadow.resize(target.height(), target.width());
            self.force = true;
        }

        self.cell_renderer.reset();
        let mut has_changes = false;

        for row in 0..target.height() {
            let cells = target.row(row);
            let shadow = self.shadow.row(row);
            for (col, cell) in cells.iter().enumerate() {
                if cell.wide {
                    continue;
                }
                if self.force || *cell != shadow[col] {
                    has_changes = true;
                    self.cell_renderer.render_cell(output, row, col as u16, cell);
                }
            }
        }

        self.cell_renderer.finish(output);
        self.shadow.copy_from(target);
        self.force = false;

        has_changes
    }

    /// Next render rewrites every cell.
    ///
    /// Use after a resize or anything else that may have corrupted the
    /// physical screen.
    pub fn invalidate(&mut self) {
        self.force = true;
    }

    /// Reshape the shadow buffer; implies a full redraw.
    pub fn resize(&mut self, height: u16, width: u16) {
        self.shadow.resize(height, width);
        self.force = true;
    }

    /// What the renderer believes is on the terminal.
    #[inline]
    pub fn shadow(&self) -> &CellGrid {
        &self.shadow
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attr, Style};

    #[test]
    fn test_blank_screen_emits_nothing() {
        let mut renderer = DiffRenderer::new(3, 5);
        let target = CellGrid::new(3, 5);
        let mut output = OutputBuffer::new();
        assert!(!renderer.render(&target, &mut output));
        assert!(output.is_empty());
    }

    #[test]
    fn test_only_changed_cells_are_written() {
        let mut renderer = DiffRenderer::new(2, 6);
        let mut target = CellGrid::new(2, 6);
        target.print(1, 2, "hi", Style::default());

        let mut output = OutputBuffer::new();
        assert!(renderer.render(&target, &mut output));
        assert_eq!(output.as_str().as_ref(), "\x1b[2;3Hhi");
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut renderer = DiffRenderer::new(2, 6);
        let mut target = CellGrid::new(2, 6);
        let style = Style {
            attrs: Attr::REVERSED,
            ..Style::default()
        };
        target.print(0, 0, "abc", style);

        let mut output = OutputBuffer::new();
        renderer.render(&target, &mut output);
        assert!(!output.is_empty());

        output.clear();
        assert!(!renderer.render(&target, &mut output));
        assert!(output.is_empty());
        assert_eq!(renderer.shadow(), &target);
    }

    #[test]
    fn test_invalidate_forces_full_pass() {
        let mut renderer = DiffRenderer::new(1, 3);
        let target = CellGrid::new(1, 3);
        let mut output = OutputBuffer::new();
        renderer.render(&target, &mut output);

        renderer.invalidate();
        assert!(renderer.render(&target, &mut output));
        assert_eq!(output.as_str().as_ref(), "\x1b[1;1H   ");
    }

    #[test]
    fn test_shape_change_forces_full_pass() {
        let mut renderer = DiffRenderer::new(1, 2);
        let target = CellGrid::new(1, 3);
        let mut output = OutputBuffer::new();
        assert!(renderer.render(&target, &mut output));
        assert_eq!(renderer.shadow().width(), 3);
    }
}
