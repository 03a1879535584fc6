//! Terminal input: the byte-stream decoder and the thread that feeds it.

pub mod parser;
#[cfg(unix)]
pub mod reader;

pub use parser::{
    Decoder, EscapeKey, Key, Mouse, BACKSPACE, BUTTON_1_PRESS, BUTTON_2_PRESS, BUTTON_3_PRESS,
    BUTTON_RELEASE, CTRL_C, DELETE, ENTER, ESC, TAB,
};
#[cfg(unix)]
pub use reader::InputReader;
