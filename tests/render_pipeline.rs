//! Drawing through the Screen and its windows, then flushing.
//!
//! Every test writes to an in-memory sink so the exact bytes that would reach
//! the terminal can be checked.

use std::io;

use cellpane::{Attr, Color, ColorPair, Drawable, Screen};

fn screen(height: u16, width: u16) -> Screen {
    Screen::with_output(height, width, Box::new(io::sink()))
}

fn flush(screen: &mut Screen) -> String {
    let mut out = Vec::new();
    screen.flush_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// =============================================================================
// Flush properties
// =============================================================================

#[test]
fn test_second_flush_writes_nothing() {
    let mut s = screen(4, 20);
    s.move_print(0, 0, "hello");
    s.with_attributes(Attr::BOLD, |s| {
        s.move_print(1, 2, "bold");
    });
    s.with_color(ColorPair::new(Color::Red, Color::Black), |s| {
        s.move_print(2, 0, "red");
    });
    s.hline(3, 0, 20);

    let first = flush(&mut s);
    assert!(!first.is_empty());
    assert_eq!(flush(&mut s), "");
}

#[test]
fn test_shadow_matches_target_after_flush() {
    let mut s = screen(3, 12);
    s.move_print(0, 0, "abc");
    s.move_print(1, 3, "日本語");
    s.move_print(2, 10, "overflow");
    flush(&mut s);
    assert_eq!(s.shadow(), s.target());

    s.move_print(1, 4, "x");
    flush(&mut s);
    assert_eq!(s.shadow(), s.target());
}

#[test]
fn test_wide_cells_follow_their_glyph() {
    let mut s = screen(2, 10);
    s.move_print(0, 1, "a日b本");
    s.move_print(1, 0, "日日日日日日");

    for row in 0..2 {
        for col in 0..10 {
            let cell = s.cell(row, col).unwrap();
            if cell.wide {
                assert!(col > 0);
                let lead = s.cell(row, col - 1).unwrap();
                assert!(!lead.wide);
                assert_eq!(cell.symbol, ' ');
            }
        }
    }
    assert_eq!(s.row_text(0), " a日b本   ");
}

#[test]
fn test_styling_is_closed_after_each_flush() {
    let mut s = screen(1, 10);
    s.with_attributes(Attr::BOLD, |s| {
        s.move_print(0, 0, "b");
    });
    let out = flush(&mut s);
    assert!(out.starts_with("\x1b[1;1H\x1b[1mb"), "{out:?}");
    assert!(out.ends_with("\x1b[22m"), "{out:?}");
}

#[test]
fn test_only_the_changed_cell_is_sent() {
    let mut s = screen(2, 10);
    s.move_print(0, 0, "abcdef");
    flush(&mut s);

    s.move_print(0, 2, "X");
    assert_eq!(flush(&mut s), "\x1b[1;3HX");
}

// =============================================================================
// Windows
// =============================================================================

#[test]
fn test_nested_window_writes_land_at_absolute_position() {
    let mut s = screen(10, 20);
    let outer = s.sub_window(None, 2, 3, 6, 12);
    let inner = s.window(outer).sub(1, 2, 3, 5);

    s.window(inner).move_print(0, 0, "abcdefgh");
    assert_eq!(s.absolute_origin(inner), Some((3, 5)));
    assert_eq!(&s.row_text(3)[5..10], "abcde");
    assert_eq!(s.cell(3, 10).unwrap().symbol, ' ');
}

#[test]
fn test_detached_window_draws_nothing() {
    let mut s = screen(5, 10);
    let w = s.sub_window(None, 1, 1, 3, 5);
    s.detach(w);
    s.window(w).move_print(0, 0, "gone");
    s.window(w).draw_box();
    assert_eq!(flush(&mut s), "");
}

#[test]
fn test_box_uses_line_drawing_set() {
    let mut s = screen(3, 4);
    s.draw_box();
    let out = flush(&mut s);
    assert!(out.contains("\x1b(0lqqk"), "{out:?}");
    assert!(out.ends_with("\x1b(B"), "{out:?}");
}

#[test]
fn test_redraw_repaints_everything() {
    let mut s = Screen::with_output(2, 3, Box::new(io::sink()));
    s.move_print(0, 0, "ab");
    flush(&mut s);

    // redraw() goes to the sink; the next flush must be empty again.
    s.redraw().unwrap();
    assert_eq!(flush(&mut s), "");
    assert_eq!(s.shadow(), s.target());
}
