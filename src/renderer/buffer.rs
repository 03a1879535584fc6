//! CellGrid and text placement.
//!
//! The CellGrid is a 2D grid of Cells that represents what should be on the
//! terminal. The Screen keeps two of them (target and shadow) with identical
//! shapes.
//!
//! # Design Decisions
//!
//! - **Flat storage**: `Vec<Cell>` with row-major indexing.
//! - **Clipping**: text is clipped to the remaining width of its row.
//! - **Wide characters**: a double-width glyph writes its primary cell and a
//!   blank continuation cell marked `wide`. Overwriting either half of an
//!   existing wide glyph blanks the other half so no orphan halves remain.

use unicode_width::UnicodeWidthChar;

use crate::types::{Cell, Style};

// =============================================================================
// CellGrid
// =============================================================================

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = row * width + col`
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Create a new grid filled with blank cells.
    pub fn new(height: u16, width: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; size],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn index(&self, row: u16, col: u16) -> usize {
        row as usize * self.width as usize + col as usize
    }

    #[inline]
    pub fn in_bounds(&self, row: u16, col: u16) -> bool {
        row < self.height && col < self.width
    }

    /// Get a cell reference (None if out of bounds).
    #[inline]
    pub fn get(&self, row: u16, col: u16) -> Option<&Cell> {
        if self.in_bounds(row, col) {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Get a mutable cell reference (None if out of bounds).
    #[inline]
    pub fn get_mut(&mut self, row: u16, col: u16) -> Option<&mut Cell> {
        if self.in_bounds(row, col) {
            let idx = self.index(row, col);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// One row of cells.
    #[inline]
    pub fn row(&self, row: u16) -> &[Cell] {
        let start = self.index(row, 0);
        &self.cells[start..start + self.width as usize]
    }

    /// Raw cells slice, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Fill every cell with `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Resize the grid (clears content).
    pub fn resize(&mut self, height: u16, width: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::BLANK; width as usize * height as usize];
    }

    /// Copy all cells from a grid of the same shape.
    pub fn copy_from(&mut self, other: &CellGrid) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        self.cells.copy_from_slice(&other.cells);
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Write `text` at (row, col) with `style`.
    ///
    /// Wide glyphs expand into a primary cell plus a `wide` continuation.
    /// Output is clipped to the row; a wide glyph that would straddle the
    /// right edge is replaced by a blank. Zero-width code points are skipped.
    ///
    /// Returns the number of columns written.
    pub fn print(&mut self, row: u16, col: u16, text: &str, style: Style) -> u16 {
        debug_assert!(row < self.height, "print row {row} outside grid of height {}", self.height);
        if row >= self.height || col >= self.width {
            return 0;
        }

        let mut x = col;
        for ch in text.chars() {
            if x >= self.width {
                break;
            }

            let w = char_width(ch);
            if w == 0 {
                continue;
            }

            if w == 2 && x + 1 >= self.width {
                self.repair_span(row, x, x + 1);
                self.put(row, x, Cell::styled(' ', style));
                x += 1;
                break;
            }

            self.repair_span(row, x, x + w);
            self.put(row, x, Cell::styled(ch, style));
            if w == 2 {
                let mut continuation = Cell::styled(' ', style);
                continuation.wide = true;
                self.put(row, x + 1, continuation);
            }
            x += w;
        }

        x - col
    }

    /// Overwrite a rectangular region with `cell`, clipped to the grid.
    pub fn fill_region(&mut self, row: u16, col: u16, height: u16, width: u16, cell: Cell) {
        let row_end = row.saturating_add(height).min(self.height);
        let col_end = col.saturating_add(width).min(self.width);
        if col >= col_end {
            return;
        }

        for r in row..row_end {
            self.repair_span(r, col, col_end);
            let start = self.index(r, col);
            let end = self.index(r, col_end);
            self.cells[start..end].fill(cell);
        }
    }

    /// Check the wide-glyph invariant: every `wide` cell follows a non-wide
    /// primary cell in the same row.
    pub fn wide_cells_consistent(&self) -> bool {
        (0..self.height).all(|r| {
            let row = self.row(r);
            row.iter().enumerate().all(|(c, cell)| {
                !cell.wide || (c > 0 && !row[c - 1].wide)
            })
        })
    }

    #[inline]
    fn put(&mut self, row: u16, col: u16, cell: Cell) {
        let idx = self.index(row, col);
        self.cells[idx] = cell;
    }

    /// Blank the halves of wide glyphs that [start, end) is about to cut.
    fn repair_span(&mut self, row: u16, start: u16, end: u16) {
        let first = self.index(row, start);
        if start > 0 && self.cells[first].wide {
            self.cells[first - 1].symbol = ' ';
        }
        if end < self.width {
            let after = self.index(row, end);
            if self.cells[after].wide {
                self.cells[after].wide = false;
                self.cells[after].symbol = ' ';
            }
        }
    }
}

// =============================================================================
// Width helpers
// =============================================================================

/// Number of terminal columns a code point occupies (0, 1 or 2).
#[inline]
pub fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0).min(2) as u16
}

/// Number of terminal columns a string occupies.
pub fn string_width(s: &str) -> usize {
    s.chars().map(|c| char_width(c) as usize).sum()
}

/// Number of terminal columns a rune slice occupies.
pub fn chars_width(chars: &[char]) -> usize {
    chars.iter().map(|&c| char_width(c) as usize).sum()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attr, Color, ColorPair};

    fn symbols(grid: &CellGrid, row: u16) -> String {
        grid.row(row).iter().filter(|c| !c.wide).map(|c| c.symbol).collect()
    }

    #[test]
    fn test_print_ascii() {
        let mut grid = CellGrid::new(2, 10);
        let used = grid.print(0, 2, "abc", Style::default());
        assert_eq!(used, 3);
        assert_eq!(symbols(&grid, 0), "  abc     ");
    }

    #[test]
    fn test_print_clips_to_row() {
        let mut grid = CellGrid::new(1, 5);
        let used = grid.print(0, 3, "hello", Style::default());
        assert_eq!(used, 2);
        assert_eq!(symbols(&grid, 0), "   he");
    }

    #[test]
    fn test_print_wide_glyph() {
        let mut grid = CellGrid::new(1, 6);
        let used = grid.print(0, 0, "日本", Style::default());
        assert_eq!(used, 4);
        let row = grid.row(0);
        assert_eq!(row[0].symbol, '日');
        assert!(!row[0].wide);
        assert!(row[1].wide);
        assert_eq!(row[1].symbol, ' ');
        assert_eq!(row[2].symbol, '本');
        assert!(row[3].wide);
        assert!(grid.wide_cells_consistent());
    }

    #[test]
    fn test_wide_glyph_at_edge_becomes_blank() {
        let mut grid = CellGrid::new(1, 3);
        let used = grid.print(0, 2, "日", Style::default());
        assert_eq!(used, 1);
        assert_eq!(grid.get(0, 2).unwrap().symbol, ' ');
        assert!(grid.wide_cells_consistent());
    }

    #[test]
    fn test_overwrite_half_of_wide_glyph() {
        let mut grid = CellGrid::new(1, 6);
        grid.print(0, 0, "日本", Style::default());

        // Narrow glyph over the continuation of '日'.
        grid.print(0, 1, "x", Style::default());
        assert_eq!(grid.get(0, 0).unwrap().symbol, ' ');
        assert!(!grid.get(0, 1).unwrap().wide);

        // Narrow glyph over the primary of '本'.
        grid.print(0, 2, "y", Style::default());
        assert!(!grid.get(0, 3).unwrap().wide);
        assert!(grid.wide_cells_consistent());
    }

    #[test]
    fn test_style_is_copied() {
        let mut grid = CellGrid::new(1, 4);
        let style = Style {
            attrs: Attr::BOLD,
            color: Some(ColorPair::new(Color::Black, Color::Cyan)),
            box_mode: false,
        };
        grid.print(0, 0, "ab", style);
        assert_eq!(grid.get(0, 1).unwrap().style(), style);
        assert_eq!(grid.get(0, 2).unwrap().style(), Style::default());
    }

    #[test]
    fn test_fill_region_clips() {
        let mut grid = CellGrid::new(3, 3);
        grid.print(1, 0, "xyz", Style::default());
        grid.fill_region(1, 1, 10, 10, Cell::BLANK);
        assert_eq!(symbols(&grid, 1), "x  ");
    }

    #[test]
    fn test_resize_clears() {
        let mut grid = CellGrid::new(2, 2);
        grid.print(0, 0, "ab", Style::default());
        grid.resize(3, 4);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(grid.cells().iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn test_widths() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('日'), 2);
        assert_eq!(char_width('\u{301}'), 0);
        assert_eq!(string_width("a日b"), 4);
        assert_eq!(chars_width(&['ア', 'x']), 3);
    }
}
