//! Terminal setup and teardown.
//!
//! [`Terminal::enter`] puts the controlling terminal into raw mode, switches
//! to the alternate screen, hides the cursor and enables mouse reporting. The
//! previous settings are kept in the returned handle and restored exactly when
//! it is dropped (or [`Terminal::restore`] is called).
//!
//! All terminal protocol writes are done via ANSI escape sequences.

use std::io;

use crate::config::TerminalConfig;
use crate::error::{Error, Result};
use crate::renderer::ansi;
use crate::renderer::OutputBuffer;

/// Current terminal size as `(rows, cols)`.
pub fn terminal_size() -> Result<(u16, u16)> {
    let (cols, rows) = crossterm::terminal::size()?;
    Ok((rows, cols))
}

/// Raw-mode handle. Restores the terminal on drop.
pub struct Terminal {
    #[cfg(unix)]
    saved: Option<libc::termios>,
    alternate_screen: bool,
    mouse: bool,
    active: bool,
}

impl Terminal {
    /// Enter raw mode and apply `config`.
    pub fn enter(config: &TerminalConfig) -> Result<Self> {
        let mut term = Self {
            #[cfg(unix)]
            saved: None,
            alternate_screen: false,
            mouse: false,
            active: true,
        };

        term.enable_raw_mode()?;

        let mut out = OutputBuffer::new();
        if config.alternate_screen {
            ansi::enter_alt_screen(&mut out)?;
            term.alternate_screen = true;
        }
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        if config.mouse {
            ansi::enable_mouse(&mut out)?;
            term.mouse = true;
        }
        out.flush_to(&mut io::stdout())?;

        log::debug!(
            "terminal ready (alternate screen: {}, mouse: {})",
            term.alternate_screen,
            term.mouse
        );
        Ok(term)
    }

    /// Undo everything `enter` did. Safe to call more than once.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut out = OutputBuffer::new();
        if self.mouse {
            ansi::disable_mouse(&mut out)?;
        }
        ansi::end_box_drawing(&mut out)?;
        ansi::reset(&mut out)?;
        ansi::cursor_show(&mut out)?;
        if self.alternate_screen {
            ansi::exit_alt_screen(&mut out)?;
        }
        out.flush_to(&mut io::stdout())?;

        self.disable_raw_mode()?;
        log::debug!("terminal restored");
        Ok(())
    }

    /// Disable canonical input and echo, saving the current settings.
    fn enable_raw_mode(&mut self) -> Result<()> {
        #[cfg(unix)]
        {
            let fd = libc::STDIN_FILENO;

            // Not a TTY (piped input): nothing to configure.
            if unsafe { libc::isatty(fd) } == 0 {
                log::warn!("stdin is not a terminal; raw mode skipped");
                return Ok(());
            }

            unsafe {
                let mut termios: libc::termios = std::mem::zeroed();
                if libc::tcgetattr(fd, &mut termios) != 0 {
                    return Err(Error::Terminal(format!(
                        "tcgetattr: {}",
                        io::Error::last_os_error()
                    )));
                }
                self.saved = Some(termios);

                termios.c_iflag &= !(libc::IGNBRK
                    | libc::BRKINT
                    | libc::PARMRK
                    | libc::ISTRIP
                    | libc::INLCR
                    | libc::IGNCR
                    | libc::ICRNL
                    | libc::IXON);
                termios.c_oflag &= !libc::OPOST;
                termios.c_lflag &=
                    !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
                termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
                termios.c_cflag |= libc::CS8;
                termios.c_cc[libc::VMIN] = 1;
                termios.c_cc[libc::VTIME] = 0;

                if libc::tcsetattr(fd, libc::TCSAFLUSH, &termios) != 0 {
                    return Err(Error::Terminal(format!(
                        "tcsetattr: {}",
                        io::Error::last_os_error()
                    )));
                }
            }
        }
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        #[cfg(unix)]
        {
            if let Some(termios) = self.saved.take() {
                if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &termios) } != 0
                {
                    return Err(Error::Terminal(format!(
                        "tcsetattr: {}",
                        io::Error::last_os_error()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("failed to restore terminal: {}", e);
        }
    }
}
