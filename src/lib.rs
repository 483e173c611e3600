// Copyright 2026 Daniel Smith
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! quitkey - make ^Q ask a program to quit
//!
//! `init()` catches SIGQUIT and rebinds the terminal's quit character
//! (normally ^\) to ^Q.  The program polls `quit_requested()` at
//! convenient points.  The original terminal settings are put back by an
//! atexit(3) hook, on the same terminal descriptor they were read from.
//!
//! Without a controlling terminal (cron, pipes) only the signal handler is
//! installed and `init()` still succeeds.

use std::os::fd::{AsFd, OwnedFd};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error};

pub mod cc;
mod error;
mod shutdown;
mod signal;
mod term;
mod tty;

#[cfg(test)]
mod testutil;

pub use cc::control;
pub use error::Error;

use shutdown::{Pending, Restorer};
use term::SavedTerminalState;

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static TERMINAL_BOUND: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
pub struct Config {
    /// Byte the terminal should turn into SIGQUIT.
    pub quit_byte: u8,
}

impl Config {
    /// Refuse a quit byte the terminal driver would read as "disabled".
    pub fn validate(&self) -> Result<(), Error> {
        if self.quit_byte == cc::VDISABLE {
            return Err(Error::InvalidQuitByte(self.quit_byte));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quit_byte: control(b'q'),
        }
    }
}

/// Catch SIGQUIT and bind it to ^Q on the controlling terminal.
pub fn init() -> Result<(), Error> {
    init_with(&Config::default())
}

/// Like `init`, with a chosen quit byte.
///
/// Only the first call in a process does anything; later calls fail with
/// `Error::AlreadyInitialized`.  A quit byte equal to `_POSIX_VDISABLE`
/// is refused with `Error::InvalidQuitByte` before anything happens, and
/// does not use up the one call.  A failure part way through is not undone
/// here, but once the exit hook is registered it still restores the
/// terminal.
pub fn init_with(config: &Config) -> Result<(), Error> {
    config.validate().inspect_err(|e| error!(error = %e, "bad quit key config"))?;
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(Error::AlreadyInitialized);
    }

    signal::install().inspect_err(|e| error!(error = %e, "cannot catch SIGQUIT"))?;

    let tty = match tty::open() {
        Ok(Some(fd)) => fd,
        Ok(None) => {
            // Normal for cron jobs and the like; ^Q just won't work.
            debug!("no controlling terminal, leaving quit key alone");
            return Ok(());
        }
        Err(e) => {
            error!(error = %e, "cannot open terminal");
            return Err(e);
        }
    };

    let bound = configure(tty, config.quit_byte, &shutdown::PENDING, shutdown::register_exit_hook)
        .inspect_err(|e| error!(error = %e, "cannot bind quit key"))?;
    TERMINAL_BOUND.store(bound, Ordering::SeqCst);
    Ok(())
}

/// Has the user asked to quit?
pub fn quit_requested() -> bool {
    signal::received()
}

/// Did `init` rebind a terminal's quit key?  False when there was no
/// terminal, so only `kill -QUIT` can set `quit_requested()`.
pub fn terminal_bound() -> bool {
    TERMINAL_BOUND.load(Ordering::SeqCst)
}

/// Snapshot the terminal on `tty`, arm `pending` with the snapshot (`hook`
/// schedules it for exit), then bind `quit_byte` to VQUIT.
///
/// Returns `Ok(false)` if `tty` turned out not to be a terminal, in which
/// case `hook` is never called and nothing is written.
fn configure<H>(tty: OwnedFd, quit_byte: u8, pending: &Pending, hook: H) -> Result<bool, Error>
where
    H: FnOnce() -> Result<(), Error>,
{
    let saved = match SavedTerminalState::capture(tty.as_fd()) {
        Ok(saved) => saved,
        Err(e) if e.is_not_a_terminal() => {
            debug!(error = %e, "terminal descriptor is not a tty, leaving quit key alone");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let mut modified = saved.termios();
    cc::bind_quit(&mut modified.c_cc, quit_byte);
    pending.arm(Restorer::new(tty, saved), hook, &modified)?;
    Ok(true)
}
