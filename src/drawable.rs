//! The drawable composition tree.
//!
//! A [`Screen`] is the root; windows are nested rectangles addressed by
//! [`WindowId`] and stored in an arena the Screen owns. A window never owns
//! its parent: it records the parent's id, so detaching a panel's window is a
//! matter of clearing arena slots.
//!
//! ```text
//! Screen (0,0 .. H,W)
//!   └─ Window #0  (full-screen panel)
//!        └─ Window #1  (dialog, offset inside #0)
//! ```
//!
//! All coordinates given to a window are local to it. A [`Canvas`] - a
//! borrowed view of one window - translates them through the chain of
//! ancestors and forwards the write to the Screen's target buffer.
//!
//! Styling (`with_attributes`, `with_color`) sets the Screen's pen for the
//! duration of a closure and restores the previous pen afterwards.

use std::io::{self, Write};

use crate::error::Result;
use crate::pipeline::terminal::terminal_size;
use crate::renderer::ansi;
use crate::renderer::{char_width, CellGrid, DiffRenderer, OutputBuffer};
use crate::types::{Attr, Cell, ColorPair, Style};

// =============================================================================
// Drawable trait
// =============================================================================

/// Position, size and drawing primitives shared by the Screen and windows.
///
/// Coordinates are `(row, col)` and local to the node.
pub trait Drawable {
    /// Row offset inside the parent (0 for the Screen).
    fn row(&self) -> u16;
    /// Column offset inside the parent (0 for the Screen).
    fn col(&self) -> u16;
    fn height(&self) -> u16;
    fn width(&self) -> u16;

    /// Allocate a child window anchored at (row, col) of this node.
    fn sub(&mut self, row: u16, col: u16, height: u16, width: u16) -> WindowId;

    /// Print `text` at (row, col) with the current pen. Returns columns used.
    fn move_print(&mut self, row: u16, col: u16, text: &str) -> u16;

    /// Rest the hardware cursor at (row, col) after the next flush.
    fn move_to(&mut self, row: u16, col: u16);

    /// Reset a rectangle to blank cells in the default style.
    fn clear_box(&mut self, row: u16, col: u16, height: u16, width: u16);

    /// The pen applied to subsequent writes.
    fn style(&self) -> Style;
    fn set_style(&mut self, style: Style);

    /// Repeat `symbol` `width` times starting at (row, col).
    fn line(&mut self, row: u16, col: u16, symbol: char, width: u16) {
        let text: String = std::iter::repeat_n(symbol, width as usize).collect();
        self.move_print(row, col, &text);
    }

    /// Horizontal rule in the line-drawing set.
    fn hline(&mut self, row: u16, col: u16, width: u16) {
        let saved = self.style();
        self.set_style(Style {
            box_mode: true,
            ..saved
        });
        self.line(row, col, ansi::BOX_HLINE, width);
        self.set_style(saved);
    }

    /// Bordered rectangle; the interior is painted with spaces.
    ///
    /// Rectangles smaller than 2x2 are ignored.
    fn line_box(&mut self, row: u16, col: u16, height: u16, width: u16) {
        if height < 2 || width < 2 {
            return;
        }
        let inner = (width - 2) as usize;
        let rule: String = std::iter::repeat_n(ansi::BOX_HLINE, inner).collect();
        let blank = " ".repeat(inner);

        let saved = self.style();
        self.set_style(Style {
            box_mode: true,
            ..saved
        });
        self.move_print(
            row,
            col,
            &format!("{}{}{}", ansi::BOX_TOP_LEFT, rule, ansi::BOX_TOP_RIGHT),
        );
        for r in row + 1..row + height - 1 {
            self.move_print(r, col, &format!("{}{}{}", ansi::BOX_VLINE, blank, ansi::BOX_VLINE));
        }
        self.move_print(
            row + height - 1,
            col,
            &format!("{}{}{}", ansi::BOX_BOTTOM_LEFT, rule, ansi::BOX_BOTTOM_RIGHT),
        );
        self.set_style(saved);
    }

    /// Border around the whole node.
    fn draw_box(&mut self) {
        let (height, width) = (self.height(), self.width());
        self.line_box(0, 0, height, width);
    }

    /// Reset the whole node to blank cells.
    fn erase(&mut self) {
        let (height, width) = (self.height(), self.width());
        self.clear_box(0, 0, height, width);
    }

    /// Paint the whole node with spaces in the current pen.
    fn clear(&mut self) {
        let (height, width) = (self.height(), self.width());
        for r in 0..height {
            self.line(r, 0, ' ', width);
        }
    }

    /// Draw with `attrs` added to the pen, then restore it.
    fn with_attributes<F>(&mut self, attrs: Attr, block: F)
    where
        Self: Sized,
        F: FnOnce(&mut Self),
    {
        let saved = self.style();
        self.set_style(Style {
            attrs: saved.attrs | attrs,
            ..saved
        });
        block(self);
        self.set_style(saved);
    }

    /// Draw with `pair` as the color, then restore the pen.
    fn with_color<F>(&mut self, pair: ColorPair, block: F)
    where
        Self: Sized,
        F: FnOnce(&mut Self),
    {
        let saved = self.style();
        self.set_style(Style {
            color: Some(pair),
            ..saved
        });
        block(self);
        self.set_style(saved);
    }
}

// =============================================================================
// Window arena
// =============================================================================

/// Handle to a window in a Screen's arena. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowNode {
    parent: Option<WindowId>,
    row: u16,
    col: u16,
    height: u16,
    width: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CursorState {
    position: Option<(u16, u16)>,
    visible: bool,
}

// =============================================================================
// Screen
// =============================================================================

/// Root of the drawable tree.
///
/// Owns the target buffer (what should be displayed), the diff renderer with
/// its shadow buffer (what was last written) and the output sink.
pub struct Screen {
    target: CellGrid,
    renderer: DiffRenderer,
    output: OutputBuffer,
    sink: Box<dyn Write>,
    pen: Style,
    windows: Vec<Option<WindowNode>>,
    cursor: CursorState,
    emitted_cursor: Option<CursorState>,
}

impl Screen {
    /// Screen sized to the controlling terminal, writing to stdout.
    pub fn init() -> Result<Self> {
        let (height, width) = terminal_size()?;
        Ok(Self::with_output(height, width, Box::new(io::stdout())))
    }

    /// Screen of a fixed size writing to stdout.
    pub fn new(height: u16, width: u16) -> Self {
        Self::with_output(height, width, Box::new(io::stdout()))
    }

    /// Screen of a fixed size writing to `sink`.
    pub fn with_output(height: u16, width: u16, sink: Box<dyn Write>) -> Self {
        let hidden = CursorState {
            position: None,
            visible: false,
        };
        Self {
            target: CellGrid::new(height, width),
            renderer: DiffRenderer::new(height, width),
            output: OutputBuffer::new(),
            sink,
            pen: Style::default(),
            windows: Vec::new(),
            cursor: hidden,
            // Terminal setup leaves the cursor hidden.
            emitted_cursor: Some(hidden),
        }
    }

    // =========================================================================
    // Buffers
    // =========================================================================

    /// What should be on the terminal.
    #[inline]
    pub fn target(&self) -> &CellGrid {
        &self.target
    }

    /// What was last written to the terminal.
    #[inline]
    pub fn shadow(&self) -> &CellGrid {
        self.renderer.shadow()
    }

    /// Target cell at an absolute position.
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        self.target.get(row, col)
    }

    /// Symbols of one target row, continuation cells omitted.
    pub fn row_text(&self, row: u16) -> String {
        self.target
            .row(row)
            .iter()
            .filter(|c| !c.wide)
            .map(|c| c.symbol)
            .collect()
    }

    /// Re-query the terminal size and reallocate both buffers.
    pub fn refresh(&mut self) -> Result<()> {
        let (height, width) = terminal_size()?;
        self.resize(height, width);
        Ok(())
    }

    /// Reallocate both buffers at the given size. Contents are lost.
    pub fn resize(&mut self, height: u16, width: u16) {
        log::debug!("screen resized to {}x{}", height, width);
        self.target.resize(height, width);
        self.renderer.resize(height, width);
    }

    // =========================================================================
    // Flushing
    // =========================================================================

    /// Send the difference between target and shadow to the output sink.
    pub fn flush(&mut self) -> Result<()> {
        self.render_pending()?;
        self.output.flush_to(&mut *self.sink)?;
        Ok(())
    }

    /// Like [`flush`](Self::flush) but to an explicit writer.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        self.render_pending()?;
        self.output.flush_to(writer)?;
        Ok(())
    }

    /// Clear the physical screen and repaint every cell.
    pub fn redraw(&mut self) -> Result<()> {
        ansi::clear_screen(&mut self.output)?;
        self.renderer.invalidate();
        self.emitted_cursor = None;
        self.flush()
    }

    fn render_pending(&mut self) -> io::Result<()> {
        let wrote = self.renderer.render(&self.target, &mut self.output);
        if wrote || self.emitted_cursor != Some(self.cursor) {
            if self.cursor.visible {
                if let Some((row, col)) = self.cursor.position {
                    ansi::cursor_to(&mut self.output, row, col)?;
                }
                ansi::cursor_show(&mut self.output)?;
            } else if self.emitted_cursor.is_none_or(|c| c.visible) {
                ansi::cursor_hide(&mut self.output)?;
            }
            self.emitted_cursor = Some(self.cursor);
        }
        Ok(())
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.visible = visible;
    }

    #[inline]
    pub fn cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    /// Absolute resting position of the hardware cursor, if one was set.
    #[inline]
    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor.position
    }

    // =========================================================================
    // Windows
    // =========================================================================

    /// Borrow a window for drawing.
    pub fn window(&mut self, id: WindowId) -> Canvas<'_> {
        Canvas { screen: self, id }
    }

    /// Allocate a window under `parent` (or the Screen itself).
    pub fn sub_window(
        &mut self,
        parent: Option<WindowId>,
        row: u16,
        col: u16,
        height: u16,
        width: u16,
    ) -> WindowId {
        let id = WindowId(self.windows.len());
        self.windows.push(Some(WindowNode {
            parent,
            row,
            col,
            height,
            width,
        }));
        id
    }

    /// Remove a window and all of its descendants from the tree.
    pub fn detach(&mut self, id: WindowId) {
        if let Some(slot) = self.windows.get_mut(id.0) {
            *slot = None;
        }
        loop {
            let orphans: Vec<usize> = self
                .windows
                .iter()
                .enumerate()
                .filter_map(|(i, node)| {
                    let parent = node.as_ref()?.parent?;
                    self.node(parent).is_none().then_some(i)
                })
                .collect();
            if orphans.is_empty() {
                break;
            }
            for i in orphans {
                self.windows[i] = None;
            }
        }
    }

    #[inline]
    pub fn is_attached(&self, id: WindowId) -> bool {
        self.node(id).is_some()
    }

    /// Offset inside the parent and size, as `(row, col, height, width)`.
    pub fn window_rect(&self, id: WindowId) -> Option<(u16, u16, u16, u16)> {
        self.node(id).map(|n| (n.row, n.col, n.height, n.width))
    }

    /// Absolute origin of a window, `None` if it or an ancestor is detached.
    pub fn absolute_origin(&self, id: WindowId) -> Option<(u16, u16)> {
        let mut node = self.node(id)?;
        let (mut row, mut col) = (node.row, node.col);
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            row = row.saturating_add(node.row);
            col = col.saturating_add(node.col);
        }
        Some((row, col))
    }

    /// Set a window's size.
    pub fn resize_window(&mut self, id: WindowId, height: u16, width: u16) {
        if let Some(node) = self.node_mut(id) {
            node.height = height;
            node.width = width;
        }
    }

    /// Clamp a window's size to the space left in its parent.
    pub fn refresh_window(&mut self, id: WindowId) {
        let Some(node) = self.node(id) else { return };
        let (parent_height, parent_width) = self.parent_size(node.parent);
        if let Some(node) = self.node_mut(id) {
            node.height = node.height.min(parent_height.saturating_sub(node.row));
            node.width = node.width.min(parent_width.saturating_sub(node.col));
        }
    }

    /// Reposition a window inside its parent, clamped so it stays inside.
    pub fn move_window(&mut self, id: WindowId, row: u16, col: u16) {
        let Some(node) = self.node(id) else { return };
        let (parent_height, parent_width) = self.parent_size(node.parent);
        if let Some(node) = self.node_mut(id) {
            node.row = row.min(parent_height.saturating_sub(node.height));
            node.col = col.min(parent_width.saturating_sub(node.width));
        }
    }

    fn parent_size(&self, parent: Option<WindowId>) -> (u16, u16) {
        match parent.and_then(|p| self.node(p)) {
            Some(p) => (p.height, p.width),
            None => (self.target.height(), self.target.width()),
        }
    }

    #[inline]
    fn node(&self, id: WindowId) -> Option<&WindowNode> {
        self.windows.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    fn node_mut(&mut self, id: WindowId) -> Option<&mut WindowNode> {
        self.windows.get_mut(id.0).and_then(Option::as_mut)
    }

    // =========================================================================
    // Absolute primitives
    // =========================================================================

    fn print_at(&mut self, row: u16, col: u16, text: &str) -> u16 {
        self.target.print(row, col, text, self.pen)
    }

    fn clear_at(&mut self, row: u16, col: u16, height: u16, width: u16) {
        self.target.fill_region(row, col, height, width, Cell::BLANK);
    }
}

impl Drawable for Screen {
    #[inline]
    fn row(&self) -> u16 {
        0
    }

    #[inline]
    fn col(&self) -> u16 {
        0
    }

    #[inline]
    fn height(&self) -> u16 {
        self.target.height()
    }

    #[inline]
    fn width(&self) -> u16 {
        self.target.width()
    }

    fn sub(&mut self, row: u16, col: u16, height: u16, width: u16) -> WindowId {
        self.sub_window(None, row, col, height, width)
    }

    fn move_print(&mut self, row: u16, col: u16, text: &str) -> u16 {
        self.print_at(row, col, text)
    }

    fn move_to(&mut self, row: u16, col: u16) {
        self.cursor.position = Some((row, col));
    }

    fn clear_box(&mut self, row: u16, col: u16, height: u16, width: u16) {
        self.clear_at(row, col, height, width);
    }

    #[inline]
    fn style(&self) -> Style {
        self.pen
    }

    #[inline]
    fn set_style(&mut self, style: Style) {
        self.pen = style;
    }
}

// =============================================================================
// Canvas - a borrowed window
// =============================================================================

/// Drawing view of one window.
///
/// Writes are translated to absolute coordinates and clipped to the window's
/// bounds. Every operation is a no-op once the window has been detached.
pub struct Canvas<'a> {
    screen: &'a mut Screen,
    id: WindowId,
}

impl Canvas<'_> {
    #[inline]
    pub fn id(&self) -> WindowId {
        self.id
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.screen.is_attached(self.id)
    }

    /// Reposition inside the parent (clamped).
    pub fn move_to_origin(&mut self, row: u16, col: u16) {
        self.screen.move_window(self.id, row, col);
    }

    pub fn resize(&mut self, height: u16, width: u16) {
        self.screen.resize_window(self.id, height, width);
    }

    /// Clamp the size to the space left in the parent.
    pub fn refresh(&mut self) {
        self.screen.refresh_window(self.id);
    }

    /// The Screen this window belongs to.
    pub fn screen(&mut self) -> &mut Screen {
        self.screen
    }

    /// Absolute position of local `(row, col)` plus the rows and columns left
    /// from there, bounded by both the window and the screen.
    fn translate(&self, row: u16, col: u16) -> Option<(u16, u16, u16, u16)> {
        let node = self.screen.node(self.id)?;
        if row >= node.height || col >= node.width {
            return None;
        }
        let (abs_row, abs_col) = self.screen.absolute_origin(self.id)?;
        let (abs_row, abs_col) = (abs_row.saturating_add(row), abs_col.saturating_add(col));
        let (screen_height, screen_width) = (self.screen.height(), self.screen.width());
        if abs_row >= screen_height || abs_col >= screen_width {
            return None;
        }
        let rows = (node.height - row).min(screen_height - abs_row);
        let cols = (node.width - col).min(screen_width - abs_col);
        Some((abs_row, abs_col, rows, cols))
    }

    fn rect(&self) -> (u16, u16, u16, u16) {
        self.screen
            .window_rect(self.id)
            .unwrap_or((0, 0, 0, 0))
    }
}

impl Drawable for Canvas<'_> {
    fn row(&self) -> u16 {
        self.rect().0
    }

    fn col(&self) -> u16 {
        self.rect().1
    }

    fn height(&self) -> u16 {
        self.rect().2
    }

    fn width(&self) -> u16 {
        self.rect().3
    }

    fn sub(&mut self, row: u16, col: u16, height: u16, width: u16) -> WindowId {
        self.screen.sub_window(Some(self.id), row, col, height, width)
    }

    fn move_print(&mut self, row: u16, col: u16, text: &str) -> u16 {
        let Some((abs_row, abs_col, _, room)) = self.translate(row, col) else {
            return 0;
        };
        let clipped = clip_to_width(text, room);
        self.screen.print_at(abs_row, abs_col, clipped)
    }

    fn move_to(&mut self, row: u16, col: u16) {
        if let Some((abs_row, abs_col)) = self.screen.absolute_origin(self.id) {
            self.screen.cursor.position = Some((abs_row + row, abs_col + col));
        }
    }

    fn clear_box(&mut self, row: u16, col: u16, height: u16, width: u16) {
        let Some((abs_row, abs_col, rows, cols)) = self.translate(row, col) else {
            return;
        };
        self.screen
            .clear_at(abs_row, abs_col, height.min(rows), width.min(cols));
    }

    fn style(&self) -> Style {
        self.screen.pen
    }

    fn set_style(&mut self, style: Style) {
        self.screen.pen = style;
    }
}

/// Longest prefix of `text` that fits in `width` columns.
fn clip_to_width(text: &str, width: u16) -> &str {
    let mut used = 0u16;
    for (idx, ch) in text.char_indices() {
        used += char_width(ch);
        if used > width {
            return &text[..idx];
        }
    }
    text
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn screen(height: u16, width: u16) -> Screen {
        Screen::with_output(height, width, Box::new(io::sink()))
    }

    #[test]
    fn test_window_translates_to_absolute() {
        let mut scr = screen(10, 20);
        let outer = scr.sub(2, 3, 6, 10);
        let inner = scr.window(outer).sub(1, 1, 3, 5);

        scr.window(inner).move_print(0, 0, "ab");
        assert_eq!(scr.cell(3, 4).unwrap().symbol, 'a');
        assert_eq!(scr.cell(3, 5).unwrap().symbol, 'b');
        assert_eq!(scr.absolute_origin(inner), Some((3, 4)));
    }

    #[test]
    fn test_window_clips_to_its_width() {
        let mut scr = screen(3, 20);
        let win = scr.sub(0, 0, 1, 4);
        let used = scr.window(win).move_print(0, 1, "hello");
        assert_eq!(used, 3);
        assert_eq!(scr.row_text(0).trim_end(), " hel");
    }

    #[test]
    fn test_window_clips_to_its_height() {
        let mut scr = screen(8, 10);
        let win = scr.sub(0, 0, 2, 5);
        assert_eq!(scr.window(win).move_print(5, 0, "X"), 0);
        assert_eq!(scr.window(win).move_print(2, 0, "X"), 0);
        assert_eq!(scr.cell(5, 0).unwrap().symbol, ' ');
        assert_eq!(scr.cell(2, 0).unwrap().symbol, ' ');

        scr.with_attributes(Attr::REVERSED, |s| s.clear());
        scr.window(win).clear_box(1, 0, 6, 5);
        assert_eq!(*scr.cell(1, 0).unwrap(), Cell::BLANK);
        assert_eq!(scr.cell(2, 0).unwrap().attrs, Attr::REVERSED);
    }

    #[test]
    fn test_window_past_screen_edge_is_clipped() {
        let mut scr = screen(6, 10);
        let win = scr.sub(2, 2, 4, 6);
        scr.resize(3, 10);
        // Still 4 rows tall until refreshed; rows past the screen are dropped.
        assert_eq!(scr.window(win).move_print(1, 0, "Y"), 0);
        scr.window(win).draw_box();
        assert_eq!(scr.cell(2, 2).unwrap().symbol, 'l');
    }

    #[test]
    fn test_detach_drops_descendants() {
        let mut scr = screen(10, 10);
        let outer = scr.sub(0, 0, 5, 5);
        let inner = scr.window(outer).sub(1, 1, 2, 2);
        let sibling = scr.sub(5, 5, 2, 2);

        scr.detach(outer);
        assert!(!scr.is_attached(outer));
        assert!(!scr.is_attached(inner));
        assert!(scr.is_attached(sibling));

        assert_eq!(scr.window(inner).move_print(0, 0, "x"), 0);
        assert!(scr.target().cells().iter().all(|c| *c == Cell::BLANK));

        let fresh = scr.sub(0, 0, 1, 1);
        assert_ne!(fresh, outer);
        assert_ne!(fresh, inner);
    }

    #[test]
    fn test_refresh_window_clamps_to_parent() {
        let mut scr = screen(10, 10);
        let win = scr.sub(6, 4, 8, 8);
        scr.refresh_window(win);
        assert_eq!(scr.window_rect(win), Some((6, 4, 4, 6)));
    }

    #[test]
    fn test_move_window_stays_inside_parent() {
        let mut scr = screen(10, 10);
        let win = scr.sub(0, 0, 4, 4);
        scr.window(win).move_to_origin(20, 3);
        assert_eq!(scr.window_rect(win), Some((6, 3, 4, 4)));
    }

    #[test]
    fn test_with_attributes_restores_pen() {
        let mut scr = screen(2, 10);
        let win = scr.sub(0, 0, 2, 10);
        let mut canvas = scr.window(win);
        canvas.with_attributes(Attr::BOLD, |c| {
            c.with_color(ColorPair::new(Color::White, Color::Blue), |c| {
                c.move_print(0, 0, "x");
            });
            c.move_print(0, 1, "y");
        });
        canvas.move_print(0, 2, "z");

        let x = *scr.cell(0, 0).unwrap();
        let y = *scr.cell(0, 1).unwrap();
        let z = *scr.cell(0, 2).unwrap();
        assert_eq!(x.attrs, Attr::BOLD);
        assert!(x.color.is_some());
        assert_eq!(y.attrs, Attr::BOLD);
        assert!(y.color.is_none());
        assert_eq!(z.style(), Style::default());
        assert_eq!(scr.style(), Style::default());
    }

    #[test]
    fn test_line_box_and_hline() {
        let mut scr = screen(4, 6);
        scr.draw_box();
        assert_eq!(scr.row_text(0), "lqqqqk");
        assert_eq!(scr.row_text(1), "x    x");
        assert_eq!(scr.row_text(3), "mqqqqj");
        assert!(scr.cell(0, 0).unwrap().box_mode);

        scr.hline(2, 0, 6);
        assert_eq!(scr.row_text(2), "qqqqqq");
        assert!(!scr.style().box_mode);
    }

    #[test]
    fn test_erase_resets_to_blank() {
        let mut scr = screen(3, 3);
        let win = scr.sub(1, 1, 2, 2);
        scr.with_attributes(Attr::REVERSED, |s| s.clear());
        scr.window(win).erase();
        assert_eq!(*scr.cell(1, 1).unwrap(), Cell::BLANK);
        assert_eq!(*scr.cell(2, 2).unwrap(), Cell::BLANK);
        assert_eq!(scr.cell(0, 0).unwrap().attrs, Attr::REVERSED);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut scr = screen(2, 5);
        scr.move_print(0, 0, "hey");
        let mut first = Vec::new();
        scr.flush_to(&mut first).unwrap();
        assert!(!first.is_empty());

        let mut second = Vec::new();
        scr.flush_to(&mut second).unwrap();
        assert!(second.is_empty());
        assert_eq!(scr.shadow(), scr.target());
    }

    #[test]
    fn test_cursor_emitted_only_on_change() {
        let mut scr = screen(3, 10);
        let win = scr.sub(1, 2, 1, 5);
        scr.window(win).move_to(0, 3);
        scr.set_cursor_visible(true);

        let mut out = Vec::new();
        scr.flush_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\x1b[2;6H\x1b[?25h");

        let mut out = Vec::new();
        scr.flush_to(&mut out).unwrap();
        assert!(out.is_empty());

        scr.set_cursor_visible(false);
        let mut out = Vec::new();
        scr.flush_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\x1b[?25l");
    }

    #[test]
    fn test_resize_reallocates_both_buffers() {
        let mut scr = screen(2, 2);
        scr.resize(4, 7);
        assert_eq!(scr.target().height(), 4);
        assert_eq!(scr.shadow().width(), 7);
    }

    #[test]
    fn test_clip_to_width_handles_wide_glyphs() {
        assert_eq!(clip_to_width("日本語", 5), "日本");
        assert_eq!(clip_to_width("abc", 10), "abc");
        assert_eq!(clip_to_width("abc", 0), "");
    }
}
