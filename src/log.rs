//! Stderr diagnostics.
//!
//! Warnings always print; debug lines only with `--verbose`. While the
//! dashboard owns the terminal, lines are held back and flushed once it is
//! restored, so they never corrupt the display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

static VERBOSE: AtomicBool = AtomicBool::new(false);
static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    // A poisoned buffer still holds usable lines
    BUFFER.lock().unwrap_or_else(|e| e.into_inner())
}

/// Start holding messages instead of writing them.
pub fn hold() {
    *buffer() = Some(Vec::new());
}

/// Stop holding and hand back everything collected since [`hold`].
pub fn release() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Write a line to stderr, or hold it if holding is active.
pub fn emit(msg: String) {
    let mut guard = buffer();
    if let Some(held) = guard.as_mut() {
        held.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

pub fn warn(msg: String) {
    emit(format!("warning: {}", msg));
}

pub fn debug(msg: String) {
    if is_verbose() {
        emit(msg);
    }
}

/// `eprintln!`-style warning routed through [`emit`]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(format!($($arg)*))
    };
}

/// `eprintln!`-style line shown only in verbose mode
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(format!($($arg)*))
    };
}
