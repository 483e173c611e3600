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

//! Finding a descriptor for the controlling terminal.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;

use crate::Error;

const DEV_TTY: &str = "/dev/tty";

/// Open the controlling terminal.
///
/// Tries /dev/tty first, then falls back to a duplicate of whichever of
/// stdin/stdout/stderr is a terminal.  Either way we hold our own
/// descriptor, so later redirection of the standard streams can't point us
/// at a different device.  `Ok(None)` means there is no terminal at all
/// (cron, pipelines, daemons); that is not an error.
pub fn open() -> Result<Option<OwnedFd>, Error> {
    match open_dev_tty() {
        Ok(fd) => return Ok(Some(fd)),
        Err(e) if no_controlling_tty(&e) => {}
        Err(e) => return Err(Error::TerminalResolution(e)),
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let candidates: [BorrowedFd<'_>; 3] = [stdin.as_fd(), stdout.as_fd(), stderr.as_fd()];
    for fd in candidates {
        if fd.is_terminal() {
            return fd
                .try_clone_to_owned()
                .map(Some)
                .map_err(Error::TerminalResolution);
        }
    }
    Ok(None)
}

fn open_dev_tty() -> io::Result<OwnedFd> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(DEV_TTY)?;
    Ok(file.into())
}

/// Errors from opening /dev/tty that just mean "no controlling terminal".
fn no_controlling_tty(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(libc::ENXIO | libc::ENODEV | libc::ENOENT | libc::ENOTTY)
    )
}
