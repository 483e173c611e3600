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

//! Putting the terminal back when the process exits.

use std::os::fd::{AsFd, OwnedFd};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::Error;
use crate::term::{self, SavedTerminalState};

/// The process-wide slot the atexit callback drains.  An atexit callback
/// takes no arguments, so this is where it finds its work.
pub static PENDING: Pending = Pending::new();

/// Everything needed to undo our terminal change: the descriptor the
/// snapshot was taken from, and the snapshot.
pub struct Restorer {
    fd: OwnedFd,
    saved: SavedTerminalState,
}

impl Restorer {
    pub fn new(fd: OwnedFd, saved: SavedTerminalState) -> Self {
        Restorer { fd, saved }
    }

    /// Reapply the snapshot, then close the descriptor.
    ///
    /// The process is going away, so a failed restore is only logged.
    pub fn run(self) {
        if let Err(e) = self.saved.restore(self.fd.as_fd()) {
            warn!(error = %e, "could not restore terminal settings");
        }
        drop(self.fd);
    }
}

struct Slot {
    restorer: Option<Restorer>,
    armed: bool,
}

/// A one-shot home for a `Restorer`.
///
/// `arm` succeeds once; after that every `arm` is refused and the first
/// restorer stays put.  `fire` runs it at most once.
pub struct Pending {
    slot: Mutex<Slot>,
}

impl Pending {
    pub const fn new() -> Self {
        Pending {
            slot: Mutex::new(Slot {
                restorer: None,
                armed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Call `hook` to get `fire` scheduled, keep `restorer`, then write
    /// `modified` through the restorer's own descriptor.
    ///
    /// The lock is held until the write is done, so `fire` from another
    /// thread can't close the descriptor underneath us.
    pub fn arm<H>(&self, restorer: Restorer, hook: H, modified: &libc::termios) -> Result<(), Error>
    where
        H: FnOnce() -> Result<(), Error>,
    {
        let mut slot = self.lock();
        if slot.armed {
            return Err(Error::ShutdownHookRegistration);
        }
        hook()?;
        slot.armed = true;

        let restorer = slot.restorer.insert(restorer);
        term::set_attr_nostop(restorer.fd.as_fd(), libc::TCSANOW, modified)
    }

    /// Run the stored restorer, if it's still there.
    pub fn fire(&self) {
        let restorer = self.lock().restorer.take();
        if let Some(restorer) = restorer {
            restorer.run();
        }
    }
}

/// atexit(3) registration for `PENDING`.
pub fn register_exit_hook() -> Result<(), Error> {
    if unsafe { libc::atexit(run_at_exit) } != 0 {
        return Err(Error::ShutdownHookRegistration);
    }
    Ok(())
}

extern "C" fn run_at_exit() {
    PENDING.fire();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{get_attr, set_attr_nostop};
    use crate::testutil::{self, Pty};

    #[test]
    fn run_restores_snapshot() {
        let _guard = testutil::sigttou_lock();
        let pty = Pty::open();
        let saved = SavedTerminalState::capture(pty.slave()).unwrap();

        let mut changed = saved.termios();
        changed.c_cc[libc::VQUIT] = 0x11;
        changed.c_lflag &= !libc::ECHO;
        set_attr_nostop(pty.slave(), libc::TCSANOW, &changed).unwrap();

        Restorer::new(pty.slave_owned(), saved).run();

        assert!(testutil::same_attributes(&get_attr(pty.slave()).unwrap(), &saved.termios()));
    }

    #[test]
    fn run_on_non_terminal_does_not_panic() {
        let _guard = testutil::sigttou_lock();
        let pty = Pty::open();
        let saved = SavedTerminalState::capture(pty.slave()).unwrap();
        let file = tempfile::tempfile().unwrap();
        Restorer::new(file.into(), saved).run();
    }

    #[test]
    fn second_arm_cannot_displace_first() {
        let _guard = testutil::sigttou_lock();
        let first = Pty::open();
        let second = Pty::open();
        let first_saved = SavedTerminalState::capture(first.slave()).unwrap();
        let second_saved = SavedTerminalState::capture(second.slave()).unwrap();
        assert_eq!(first_saved.termios().c_cc[libc::VQUIT], 0x1c);

        let mut modified = first_saved.termios();
        modified.c_cc[libc::VQUIT] = 0x11;

        let pending = Pending::new();
        let mut hooks = 0;
        pending
            .arm(Restorer::new(first.slave_owned(), first_saved), || {
                hooks += 1;
                Ok(())
            }, &modified)
            .unwrap();
        assert_eq!(get_attr(first.slave()).unwrap().c_cc[libc::VQUIT], 0x11);

        let err = pending
            .arm(Restorer::new(second.slave_owned(), second_saved), || {
                hooks += 1;
                Ok(())
            }, &modified)
            .unwrap_err();
        assert!(matches!(err, Error::ShutdownHookRegistration));
        assert_eq!(hooks, 1);
        // The refused arm wrote nothing.
        assert_eq!(get_attr(second.slave()).unwrap().c_cc[libc::VQUIT], 0x1c);

        pending.fire();
        assert!(testutil::same_attributes(&get_attr(first.slave()).unwrap(), &first_saved.termios()));

        // One-shot: a second fire finds nothing to do.
        set_attr_nostop(first.slave(), libc::TCSANOW, &modified).unwrap();
        pending.fire();
        assert_eq!(get_attr(first.slave()).unwrap().c_cc[libc::VQUIT], 0x11);
    }

    #[test]
    fn failed_hook_leaves_slot_empty_and_terminal_untouched() {
        let _guard = testutil::sigttou_lock();
        let pty = Pty::open();
        let saved = SavedTerminalState::capture(pty.slave()).unwrap();
        let mut modified = saved.termios();
        modified.c_cc[libc::VQUIT] = 0x11;

        let pending = Pending::new();
        let err = pending
            .arm(Restorer::new(pty.slave_owned(), saved), || {
                Err(Error::ShutdownHookRegistration)
            }, &modified)
            .unwrap_err();
        assert!(matches!(err, Error::ShutdownHookRegistration));
        assert!(testutil::same_attributes(&get_attr(pty.slave()).unwrap(), &saved.termios()));
        assert!(pending.lock().restorer.is_none());
    }
}
