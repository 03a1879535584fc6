//! SIGWINCH watcher.
//!
//! The signal handler only writes a byte to a self-pipe. A watcher thread
//! blocks on the read end and turns every wake-up into a resize request on
//! the render loop.

use std::io;
use std::sync::atomic::{AtomicI32, Ordering};
use std::thread;

use crate::manager::ManagerHandle;

/// Write end of the self-pipe, -1 until installed.
static WAKE_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn on_sigwinch(_signal: libc::c_int) {
    let fd = WAKE_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        let byte = 1u8;
        unsafe {
            libc::write(fd, &byte as *const u8 as *const libc::c_void, 1);
        }
    }
}

/// Install the SIGWINCH handler and start the watcher thread.
///
/// Only one watcher is supported per process; later calls are no-ops.
pub fn watch_resize(sink: ManagerHandle) -> io::Result<()> {
    if WAKE_FD.load(Ordering::Acquire) >= 0 {
        return Ok(());
    }

    let mut fds = [0 as libc::c_int; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);
    WAKE_FD.store(write_fd, Ordering::Release);

    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_sigwinch as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(libc::SIGWINCH, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }

    thread::Builder::new()
        .name("cellpane-resize".to_string())
        .spawn(move || {
            let mut buf = [0u8; 16];
            loop {
                let n = unsafe { libc::read(read_fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
                if n < 0 && io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                if n <= 0 {
                    return;
                }
                log::debug!("terminal resized");
                sink.request_resize();
            }
        })?;

    Ok(())
}
