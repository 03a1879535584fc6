//! ANSI escape sequences for terminal control.
//!
//! The whole output vocabulary of the toolkit:
//! - Cursor positioning and visibility
//! - Screen clearing and the alternate screen buffer
//! - DEC line-drawing character set (box-drawing mode)
//! - SGR attributes (bold, reverse) and 4-bit colors
//! - X10 mouse reporting
//!
//! No capability negotiation is done; a VT100/ANSI terminal is assumed.

use std::io::Write;

use crate::types::{Attr, ColorPair};

// =============================================================================
// Constants
// =============================================================================

/// Escape character.
pub const ESC: &str = "\x1b";

/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";

/// Line-drawing symbols, valid while box-drawing mode is on.
pub const BOX_HLINE: char = 'q';
pub const BOX_VLINE: char = 'x';
pub const BOX_TOP_LEFT: char = 'l';
pub const BOX_TOP_RIGHT: char = 'k';
pub const BOX_BOTTOM_LEFT: char = 'm';
pub const BOX_BOTTOM_RIGHT: char = 'j';

// =============================================================================
// Cursor
// =============================================================================

/// Move cursor to absolute position (0-indexed in, 1-indexed on the wire).
#[inline]
pub fn cursor_to<W: Write>(w: &mut W, row: u16, col: u16) -> std::io::Result<()> {
    write!(w, "\x1b[{};{}H", row + 1, col + 1)
}

/// Hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25l")
}

/// Show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25h")
}

// =============================================================================
// Screen Control
// =============================================================================

/// Clear entire screen and home the cursor.
#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[2J\x1b[H")
}

/// Enter alternate screen buffer.
#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1049h")
}

/// Exit alternate screen buffer.
#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1049l")
}

// =============================================================================
// Box Drawing
// =============================================================================

/// Select the DEC special graphics set for G0.
#[inline]
pub fn begin_box_drawing<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b(0")
}

/// Back to US-ASCII for G0.
#[inline]
pub fn end_box_drawing<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b(B")
}

// =============================================================================
// Attributes
// =============================================================================

/// Turn on every attribute in `attr`, one SGR sequence each.
pub fn attrs_on<W: Write>(w: &mut W, attr: Attr) -> std::io::Result<()> {
    for flag in attr.iter() {
        write!(w, "\x1b[{}m", flag.sgr_on())?;
    }
    Ok(())
}

/// Turn off every attribute in `attr`, one SGR sequence each.
pub fn attrs_off<W: Write>(w: &mut W, attr: Attr) -> std::io::Result<()> {
    for flag in attr.iter() {
        write!(w, "\x1b[{}m", flag.sgr_off())?;
    }
    Ok(())
}

/// Reset all attributes and colors.
#[inline]
pub fn reset<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[0m")
}

// =============================================================================
// Colors
// =============================================================================

/// Select a 4-bit foreground/background pair.
#[inline]
pub fn color_on<W: Write>(w: &mut W, pair: ColorPair) -> std::io::Result<()> {
    write!(w, "\x1b[3{};4{}m", pair.fg.index(), pair.bg.index())
}

/// Restore terminal default foreground and background.
#[inline]
pub fn color_off<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[39m\x1b[49m")
}

// =============================================================================
// Mouse Support
// =============================================================================

/// Enable X10-encoded button reporting (`ESC [ M b x y`).
#[inline]
pub fn enable_mouse<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1000h")
}

/// Disable mouse reporting.
#[inline]
pub fn disable_mouse<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1000l")
}

// =============================================================================
// Tests
// =============================================================================
