//! Byte-stream decoder for terminal input.
//!
//! Classifies raw stdin bytes into [`Key`] events, in priority order:
//! - `ESC [` / `ESC O` sequences: X10 mouse reports (`ESC [ M b x y`) and
//!   named keys (arrows, Home/End, Insert/Delete, PageUp/Down, F1-F12, BackTab)
//! - C0 control codes and DEL (line feed is normalized to [`ENTER`])
//! - UTF-8 code points
//!
//! Bytes are buffered across calls to [`Decoder::feed`], so a sequence split
//! over several reads decodes exactly as if it had arrived at once. A lone ESC
//! stays pending until more bytes arrive or the reader's escape timeout
//! expires and calls [`Decoder::flush_pending`].
//!
//! Escape sequences longer than the working-buffer bound without a terminator
//! are discarded rather than waited on.

use crate::config::MIN_BUFFER_SIZE;

// =============================================================================
// Control codes
// =============================================================================

pub const CTRL_C: u8 = 3;
pub const BACKSPACE: u8 = 8;
pub const TAB: u8 = 9;
pub const ENTER: u8 = 13;
pub const ESC: u8 = 27;
pub const DELETE: u8 = 127;

const LINE_FEED: u8 = 10;

// =============================================================================
// Mouse buttons
// =============================================================================

pub const BUTTON_1_PRESS: u8 = 0;
pub const BUTTON_2_PRESS: u8 = 1;
pub const BUTTON_3_PRESS: u8 = 2;
pub const BUTTON_RELEASE: u8 = 3;

const MOUSE_ENCODING_OFFSET: u8 = 32;
const MOUSE_BUTTON_MASK: u8 = 3;
const MOUSE_SHIFT_MASK: u8 = 4;
const MOUSE_META_MASK: u8 = 8;
const MOUSE_CONTROL_MASK: u8 = 16;

// =============================================================================
// Types
// =============================================================================

/// A decoded input event. Exactly one classification per byte run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Printable code point.
    Rune(char),
    /// C0 control code or DEL.
    Control(u8),
    /// Named escape sequence.
    Escape(EscapeKey),
    /// X10 mouse report.
    Mouse(Mouse),
}

impl Key {
    /// True if this is the control code `code`.
    #[inline]
    pub fn is_control(&self, code: u8) -> bool {
        matches!(self, Key::Control(c) if *c == code)
    }
}

/// Keys that arrive as escape sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    /// Function key 1-12.
    F(u8),
    /// Shift-Tab.
    BackTab,
    /// Well-formed but unrecognized; the raw bytes including ESC.
    Unknown(Vec<u8>),
}

/// A mouse report. Coordinates are 1-based, as sent by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mouse {
    pub button: u8,
    pub shift: bool,
    pub meta: bool,
    pub control: bool,
    pub x: u16,
    pub y: u16,
}

enum ParseResult {
    Event(Key),
    Incomplete,
    /// Nothing to emit; drop this many bytes.
    Discard(usize),
}

// =============================================================================
// Decoder
// =============================================================================

/// Incremental input decoder.
#[derive(Debug)]
pub struct Decoder {
    buf: Vec<u8>,
    bound: usize,
}

impl Decoder {
    /// Decoder whose escape sequences may span at most `bound` bytes.
    pub fn new(bound: usize) -> Self {
        let bound = bound.max(MIN_BUFFER_SIZE);
        Self {
            buf: Vec::with_capacity(bound),
            bound,
        }
    }

    /// Append `data` and decode every complete event now buffered.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Key> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();

        while !self.buf.is_empty() {
            match self.try_parse_one() {
                ParseResult::Event(key) => keys.push(key),
                ParseResult::Incomplete => break,
                ParseResult::Discard(n) => {
                    log::trace!("dropping {} undecodable input bytes", n);
                    self.consume(n);
                }
            }
        }

        keys
    }

    /// Bytes are waiting for the rest of their sequence.
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve whatever is pending once no more bytes are coming.
    ///
    /// A lone ESC becomes the Esc control code; a partial escape sequence or
    /// code point is dropped.
    pub fn flush_pending(&mut self) -> Vec<Key> {
        if self.buf.as_slice() == [ESC] {
            self.buf.clear();
            return vec![Key::Control(ESC)];
        }
        if !self.buf.is_empty() {
            log::trace!("timed out on partial input {:?}", self.buf);
            self.buf.clear();
        }
        Vec::new()
    }

    #[inline]
    fn consume(&mut self, n: usize) {
        let n = n.min(self.buf.len());
        self.buf.drain(..n);
    }

    fn try_parse_one(&mut self) -> ParseResult {
        let first = self.buf[0];

        if first == ESC {
            return self.parse_escape();
        }

        if first < 0x20 || first == DELETE {
            self.consume(1);
            let code = if first == LINE_FEED { ENTER } else { first };
            return ParseResult::Event(Key::Control(code));
        }

        if first < 0x80 {
            self.consume(1);
            return ParseResult::Event(Key::Rune(first as char));
        }

        self.parse_utf8()
    }

    fn parse_escape(&mut self) -> ParseResult {
        if self.buf.len() < 2 {
            return ParseResult::Incomplete;
        }

        let introducer = self.buf[1];
        if introducer != b'[' && introducer != b'O' {
            // Not a sequence: ESC on its own, the next byte decodes separately.
            self.consume(1);
            return ParseResult::Event(Key::Control(ESC));
        }

        if self.buf.len() < 3 {
            return ParseResult::Incomplete;
        }

        if introducer == b'[' && self.buf[2] == b'M' {
            return self.parse_x10_mouse();
        }

        // Scan for the terminator within the working-buffer bound.
        let limit = self.buf.len().min(self.bound);
        let Some(end) = (2..limit).find(|&i| (0x40..=0x7E).contains(&self.buf[i])) else {
            if self.buf.len() >= self.bound {
                return ParseResult::Discard(self.bound);
            }
            return ParseResult::Incomplete;
        };

        let raw: Vec<u8> = self.buf[..=end].to_vec();
        self.consume(end + 1);
        ParseResult::Event(Key::Escape(name_sequence(&raw)))
    }

    fn parse_x10_mouse(&mut self) -> ParseResult {
        // ESC [ M Cb Cx Cy
        if self.buf.len() < 6 {
            return ParseResult::Incomplete;
        }

        let raw_button = self.buf[3].wrapping_sub(MOUSE_ENCODING_OFFSET);
        let mouse = Mouse {
            button: raw_button & MOUSE_BUTTON_MASK,
            shift: raw_button & MOUSE_SHIFT_MASK != 0,
            meta: raw_button & MOUSE_META_MASK != 0,
            control: raw_button & MOUSE_CONTROL_MASK != 0,
            x: self.buf[4].saturating_sub(MOUSE_ENCODING_OFFSET) as u16,
            y: self.buf[5].saturating_sub(MOUSE_ENCODING_OFFSET) as u16,
        };
        self.consume(6);
        ParseResult::Event(Key::Mouse(mouse))
    }

    fn parse_utf8(&mut self) -> ParseResult {
        let need = match self.buf[0] {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return ParseResult::Discard(1),
        };

        if self.buf.len() < need {
            // A bad continuation byte can be detected before the rest arrives.
            if self.buf[1..].iter().any(|b| b & 0xC0 != 0x80) {
                return ParseResult::Discard(1);
            }
            return ParseResult::Incomplete;
        }

        match std::str::from_utf8(&self.buf[..need])
            .ok()
            .and_then(|s| s.chars().next())
        {
            Some(ch) => {
                self.consume(need);
                ParseResult::Event(Key::Rune(ch))
            }
            None => ParseResult::Discard(1),
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BUFFER_SIZE)
    }
}

// =============================================================================
// Sequence naming
// =============================================================================

/// Map a complete `ESC [ ...` / `ESC O ...` sequence to a key.
fn name_sequence(raw: &[u8]) -> EscapeKey {
    let introducer = raw[1];
    let final_byte = raw[raw.len() - 1];
    let params = &raw[2..raw.len() - 1];

    // Modified forms (`ESC [ 1 ; 5 A`) name the same key as the plain one.
    let plain = params.is_empty() || params.starts_with(b"1;");

    match (introducer, final_byte) {
        (_, b'A') if plain => EscapeKey::Up,
        (_, b'B') if plain => EscapeKey::Down,
        (_, b'C') if plain => EscapeKey::Right,
        (_, b'D') if plain => EscapeKey::Left,
        (_, b'H') if plain => EscapeKey::Home,
        (_, b'F') if plain => EscapeKey::End,
        (_, b'P') if plain => EscapeKey::F(1),
        (_, b'Q') if plain => EscapeKey::F(2),
        (_, b'R') if plain => EscapeKey::F(3),
        (_, b'S') if plain => EscapeKey::F(4),
        (b'[', b'Z') if params.is_empty() => EscapeKey::BackTab,
        (b'[', b'~') => tilde_key(params).unwrap_or_else(|| EscapeKey::Unknown(raw.to_vec())),
        _ => EscapeKey::Unknown(raw.to_vec()),
    }
}

/// Keys encoded as `ESC [ n ~` (optionally `ESC [ n ; m ~`).
fn tilde_key(params: &[u8]) -> Option<EscapeKey> {
    let number = params.split(|&b| b == b';').next()?;
    let n: u8 = std::str::from_utf8(number).ok()?.parse().ok()?;
    let key = match n {
        1 | 7 => EscapeKey::Home,
        2 => EscapeKey::Insert,
        3 => EscapeKey::Delete,
        4 | 8 => EscapeKey::End,
        5 => EscapeKey::PageUp,
        6 => EscapeKey::PageDown,
        11..=15 => EscapeKey::F(n - 10),
        17..=21 => EscapeKey::F(n - 11),
        23 | 24 => EscapeKey::F(n - 12),
        _ => return None,
    };
    Some(key)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Vec<Key> {
        Decoder::default().feed(bytes)
    }

    #[test]
    fn test_printable_and_controls() {
        assert_eq!(
            decode(b"a\t\x7f\n\r"),
            vec![
                Key::Rune('a'),
                Key::Control(TAB),
                Key::Control(DELETE),
                Key::Control(ENTER),
                Key::Control(ENTER),
            ]
        );
    }

    #[test]
    fn test_arrow_in_one_read() {
        assert_eq!(decode(b"\x1b[A"), vec![Key::Escape(EscapeKey::Up)]);
    }

    #[test]
    fn test_arrow_split_across_reads() {
        let mut decoder = Decoder::default();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.feed(b"[").is_empty());
        assert_eq!(decoder.feed(b"A"), vec![Key::Escape(EscapeKey::Up)]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_ss3_f1_normalized() {
        assert_eq!(decode(b"\x1bOP"), vec![Key::Escape(EscapeKey::F(1))]);
        assert_eq!(decode(b"\x1bOA"), vec![Key::Escape(EscapeKey::Up)]);
    }

    #[test]
    fn test_tilde_keys() {
        assert_eq!(decode(b"\x1b[3~"), vec![Key::Escape(EscapeKey::Delete)]);
        assert_eq!(decode(b"\x1b[5~"), vec![Key::Escape(EscapeKey::PageUp)]);
        assert_eq!(decode(b"\x1b[6~"), vec![Key::Escape(EscapeKey::PageDown)]);
        assert_eq!(decode(b"\x1b[15~"), vec![Key::Escape(EscapeKey::F(5))]);
        assert_eq!(decode(b"\x1b[24~"), vec![Key::Escape(EscapeKey::F(12))]);
        assert_eq!(decode(b"\x1b[Z"), vec![Key::Escape(EscapeKey::BackTab)]);
    }

    #[test]
    fn test_unknown_sequence_kept_raw() {
        assert_eq!(
            decode(b"\x1b[99~"),
            vec![Key::Escape(EscapeKey::Unknown(b"\x1b[99~".to_vec()))]
        );
    }

    #[test]
    fn test_mouse_left_shift() {
        // button 0 + shift (4), column 5, row 3
        let bytes = [0x1b, b'[', b'M', 32 + 4, 32 + 5, 32 + 3];
        assert_eq!(
            decode(&bytes),
            vec![Key::Mouse(Mouse {
                button: BUTTON_1_PRESS,
                shift: true,
                meta: false,
                control: false,
                x: 5,
                y: 3,
            })]
        );
    }

    #[test]
    fn test_mouse_waits_for_all_bytes() {
        let mut decoder = Decoder::default();
        assert!(decoder.feed(&[0x1b, b'[', b'M', 32 + 3]).is_empty());
        let keys = decoder.feed(&[33, 33]);
        assert!(matches!(
            keys.as_slice(),
            [Key::Mouse(Mouse { button: BUTTON_RELEASE, x: 1, y: 1, .. })]
        ));
    }

    #[test]
    fn test_multiple_events_in_one_read() {
        assert_eq!(
            decode("ab\x1b[Bé".as_bytes()),
            vec![
                Key::Rune('a'),
                Key::Rune('b'),
                Key::Escape(EscapeKey::Down),
                Key::Rune('é'),
            ]
        );
    }

    #[test]
    fn test_utf8_split_across_reads() {
        let bytes = "日".as_bytes();
        let mut decoder = Decoder::default();
        assert!(decoder.feed(&bytes[..1]).is_empty());
        assert!(decoder.feed(&bytes[1..2]).is_empty());
        assert_eq!(decoder.feed(&bytes[2..]), vec![Key::Rune('日')]);
    }

    #[test]
    fn test_invalid_utf8_does_not_stall() {
        assert_eq!(decode(&[0xFF, b'x']), vec![Key::Rune('x')]);
        assert_eq!(decode(&[0xE6, b'x']), vec![Key::Rune('x')]);
    }

    #[test]
    fn test_unterminated_sequence_discarded() {
        let mut decoder = Decoder::new(6);
        assert!(decoder.feed(b"\x1b[1234").is_empty());
        assert_eq!(decoder.feed(b"z"), vec![Key::Rune('z')]);
    }

    #[test]
    fn test_lone_escape_resolved_by_flush() {
        let mut decoder = Decoder::default();
        assert!(decoder.feed(&[ESC]).is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.flush_pending(), vec![Key::Control(ESC)]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_escape_followed_by_rune() {
        assert_eq!(decode(b"\x1bx"), vec![Key::Control(ESC), Key::Rune('x')]);
    }

    #[test]
    fn test_partial_sequence_dropped_by_flush() {
        let mut decoder = Decoder::default();
        assert!(decoder.feed(b"\x1b[").is_empty());
        assert!(decoder.flush_pending().is_empty());
        assert!(!decoder.has_pending());
    }
}
