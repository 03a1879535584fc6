//! stdin reader thread.
//!
//! Owns the input file descriptor, decodes bytes with a [`Decoder`] and
//! delivers each key to the render loop through a [`ManagerHandle`]. While a
//! partial sequence is buffered the next read is guarded by `poll(2)` with the
//! escape timeout, so a lone ESC press is reported promptly.
//!
//! EOF or a read error is reported as [`Event::Fatal`](crate::Event::Fatal)
//! and ends the thread.

use std::io;
use std::os::unix::io::RawFd;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::InputConfig;
use crate::error::Error;
use crate::manager::ManagerHandle;

use super::parser::Decoder;

/// Handle to the input thread. The thread runs until its input closes or the
/// render loop goes away; dropping the handle detaches it.
pub struct InputReader {
    handle: Option<JoinHandle<()>>,
}

impl InputReader {
    /// Read stdin.
    pub fn spawn(sink: ManagerHandle, config: &InputConfig) -> io::Result<Self> {
        Self::spawn_fd(libc::STDIN_FILENO, sink, config)
    }

    /// Read an arbitrary file descriptor (which must outlive the thread).
    pub fn spawn_fd(fd: RawFd, sink: ManagerHandle, config: &InputConfig) -> io::Result<Self> {
        let decoder = Decoder::new(config.effective_buffer_size());
        let timeout = config.escape_timeout();

        let handle = thread::Builder::new()
            .name("cellpane-input".to_string())
            .spawn(move || read_loop(fd, decoder, timeout, sink))?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the thread to finish. Only returns once input has closed or
    /// the render loop is gone.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

fn read_loop(fd: RawFd, mut decoder: Decoder, timeout: Duration, sink: ManagerHandle) {
    let mut buf = [0u8; 256];

    loop {
        if decoder.has_pending() {
            match wait_readable(fd, timeout) {
                Ok(true) => {}
                Ok(false) => {
                    for key in decoder.flush_pending() {
                        if !sink.send_key(key) {
                            return;
                        }
                    }
                    continue;
                }
                Err(e) => {
                    log::error!("polling input failed: {}", e);
                    sink.send_fatal(Error::Io(e));
                    return;
                }
            }
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n == 0 {
            for key in decoder.flush_pending() {
                if !sink.send_key(key) {
                    return;
                }
            }
            log::debug!("input closed");
            sink.send_fatal(Error::InputClosed);
            return;
        }
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            log::error!("reading input failed: {}", err);
            sink.send_fatal(Error::Io(err));
            return;
        }

        for key in decoder.feed(&buf[..n as usize]) {
            if !sink.send_key(key) {
                return;
            }
        }
    }
}

/// Wait up to `timeout` for `fd` to become readable.
fn wait_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    loop {
        let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(rc > 0);
    }
}
