//! Core types for cellpane.
//!
//! These are the building blocks shared by the renderer, the drawable tree
//! and the widgets:
//! - [`Cell`] - one styled character position on the terminal grid
//! - [`Attr`] - text attributes as bitflags
//! - [`Color`] / [`ColorPair`] - 4-bit foreground/background selection
//! - [`Identifiable`] - stable integer identity for list items

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::REVERSED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const REVERSED = 1 << 1;
    }
}

impl Attr {
    /// SGR parameter that turns this single attribute on.
    pub(crate) fn sgr_on(self) -> &'static str {
        if self == Attr::BOLD { "1" } else { "7" }
    }

    /// SGR parameter that turns this single attribute off.
    ///
    /// Bold is cleared with 22 (normal intensity), not 21.
    pub(crate) fn sgr_off(self) -> &'static str {
        if self == Attr::BOLD { "22" } else { "27" }
    }
}

// =============================================================================
// Colors
// =============================================================================

/// 4-bit ANSI color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// ANSI color index (0-7), used as the second digit of `3x`/`4x` SGR codes.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Magenta => 5,
            Color::Cyan => 6,
            Color::White => 7,
        }
    }
}

/// Foreground/background pair applied to a cell.
///
/// A cell without a pair renders in the terminal's default colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorPair {
    pub fg: Color,
    pub bg: Color,
}

impl ColorPair {
    #[inline]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self { fg, bg }
    }
}

// =============================================================================
// Style - the "pen" a Screen draws with
// =============================================================================

/// Styling state applied to every cell written while it is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub attrs: Attr,
    pub color: Option<ColorPair>,
    pub box_mode: bool,
}

// =============================================================================
// Cell - one terminal grid position
// =============================================================================

/// A single terminal cell.
///
/// A double-width glyph occupies two adjacent cells: the primary one holds the
/// glyph, the next one is marked `wide` and holds a blank. Wide cells are
/// skipped when flushing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Code point to display (a space for blank cells).
    pub symbol: char,
    /// Second half of a double-width glyph.
    pub wide: bool,
    /// Attribute flags (bold, reversed).
    pub attrs: Attr,
    /// Optional color pair; `None` is the terminal default.
    pub color: Option<ColorPair>,
    /// Symbol is drawn from the alternate line-drawing character set.
    pub box_mode: bool,
}

impl Cell {
    /// A blank cell in the terminal's default style.
    pub const BLANK: Cell = Cell {
        symbol: ' ',
        wide: false,
        attrs: Attr::NONE,
        color: None,
        box_mode: false,
    };

    /// Create a cell carrying `symbol` drawn with `style`.
    #[inline]
    pub fn styled(symbol: char, style: Style) -> Self {
        Self {
            symbol,
            wide: false,
            attrs: style.attrs,
            color: style.color,
            box_mode: style.box_mode,
        }
    }

    /// The style this cell requires from the terminal.
    #[inline]
    pub fn style(&self) -> Style {
        Style {
            attrs: self.attrs,
            color: self.color,
            box_mode: self.box_mode,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BLANK
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Anything with a stable integer identity.
///
/// Lists keep their selection by identity, so an item that moves to another
/// position across a refresh stays selected.
pub trait Identifiable {
    fn id(&self) -> i64;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_sgr_codes() {
        assert_eq!(Attr::BOLD.sgr_on(), "1");
        assert_eq!(Attr::BOLD.sgr_off(), "22");
        assert_eq!(Attr::REVERSED.sgr_on(), "7");
        assert_eq!(Attr::REVERSED.sgr_off(), "27");
    }

    #[test]
    fn test_color_index() {
        assert_eq!(Color::Black.index(), 0);
        assert_eq!(Color::Cyan.index(), 6);
        assert_eq!(Color::White.index(), 7);
    }

    #[test]
    fn test_styled_cell_carries_style() {
        let style = Style {
            attrs: Attr::BOLD,
            color: Some(ColorPair::new(Color::Red, Color::Black)),
            box_mode: true,
        };
        let cell = Cell::styled('q', style);
        assert_eq!(cell.style(), style);
        assert!(!cell.wide);
        assert_eq!(Cell::default(), Cell::BLANK);
    }
}
