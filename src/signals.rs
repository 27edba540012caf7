//! Termination signal handling
//!
//! Handlers for the usual termination signals record the signal number in a
//! shared flag. The render loop checks the flag between frames, restores the
//! terminal and exits with that number. Signals the parent process set to be
//! ignored stay ignored.

use std::io;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use libc::c_int;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};

pub const TERMINATION_SIGNALS: [c_int; 4] = [SIGHUP, SIGINT, SIGQUIT, SIGTERM];

/// Install the handlers. The returned flag holds 0 until a signal arrives,
/// then the signal number.
pub fn install() -> io::Result<Arc<AtomicUsize>> {
    let flag = Arc::new(AtomicUsize::new(0));
    for &sig in &TERMINATION_SIGNALS {
        if is_ignored(sig) {
            continue;
        }
        signal_hook::flag::register_usize(sig, Arc::clone(&flag), sig as usize)?;
    }
    Ok(flag)
}

/// Whether the disposition inherited from the parent is SIG_IGN.
fn is_ignored(sig: c_int) -> bool {
    unsafe {
        let mut old: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(sig, std::ptr::null(), &mut old) != 0 {
            return false;
        }
        old.sa_sigaction == libc::SIG_IGN
    }
}
