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

//! Terminal attribute save/restore via POSIX termios.

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};

use crate::Error;

/// The terminal's settings as they were before we touched anything.
#[derive(Clone, Copy)]
pub struct SavedTerminalState {
    termios: libc::termios,
}

impl SavedTerminalState {
    /// Read the current attributes of `fd`.
    ///
    /// A descriptor that isn't really a terminal shows up as an
    /// `AttributeRead` error with `is_not_a_terminal()` true.
    pub fn capture(fd: BorrowedFd<'_>) -> Result<Self, Error> {
        let termios = get_attr(fd).map_err(Error::AttributeRead)?;
        Ok(SavedTerminalState { termios })
    }

    /// A copy of the snapshot to build modified settings from.
    pub fn termios(&self) -> libc::termios {
        self.termios
    }

    /// Put the snapshot back.  Shutdown path: the caller decides what to do
    /// with the error, which is usually nothing.
    pub fn restore(&self, fd: BorrowedFd<'_>) -> Result<(), Error> {
        set_attr_nostop(fd, libc::TCSANOW, &self.termios)
    }
}

pub fn get_attr(fd: BorrowedFd<'_>) -> io::Result<libc::termios> {
    unsafe {
        let mut t: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd.as_raw_fd(), &mut t) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(t)
    }
}

/// tcsetattr() with SIGTTOU ignored for the duration of the call.
///
/// A background job changing terminal attributes is normally stopped with
/// SIGTTOU.  The old disposition is put back whether or not tcsetattr
/// succeeded; failing to ignore or to restore SIGTTOU fails the whole call.
pub fn set_attr_nostop(
    fd: BorrowedFd<'_>,
    action: libc::c_int,
    termios: &libc::termios,
) -> Result<(), Error> {
    let previous = ignore_sigttou()?;

    let rc = unsafe { libc::tcsetattr(fd.as_raw_fd(), action, termios) };
    // Grab errno before the next sigaction can clobber it.
    let set_result = if rc == 0 {
        Ok(())
    } else {
        Err(Error::AttributeWrite(io::Error::last_os_error()))
    };

    restore_sigttou(&previous)?;
    set_result
}

fn ignore_sigttou() -> Result<libc::sigaction, Error> {
    unsafe {
        let mut ign: libc::sigaction = std::mem::zeroed();
        ign.sa_sigaction = libc::SIG_IGN;
        libc::sigemptyset(&mut ign.sa_mask);
        let mut previous: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(libc::SIGTTOU, &ign, &mut previous) != 0 {
            return Err(Error::StopSignalDisposition(io::Error::last_os_error()));
        }
        Ok(previous)
    }
}

fn restore_sigttou(previous: &libc::sigaction) -> Result<(), Error> {
    unsafe {
        if libc::sigaction(libc::SIGTTOU, previous, std::ptr::null_mut()) != 0 {
            return Err(Error::StopSignalDisposition(io::Error::last_os_error()));
        }
    }
    Ok(())
}
