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

//! Errors reported by quit key setup.

use std::io;

use thiserror::Error;

/// The OS error is part of each message rather than a `source()`, so it
/// prints once however the error is reported.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sigaction(SIGQUIT): {0}")]
    SignalInstall(io::Error),

    #[error("cannot open controlling terminal: {0}")]
    TerminalResolution(io::Error),

    #[error("tcgetattr: {0}")]
    AttributeRead(io::Error),

    /// Ignoring SIGTTOU, or putting its old disposition back, failed.
    #[error("sigaction(SIGTTOU): {0}")]
    StopSignalDisposition(io::Error),

    #[error("atexit: cannot register terminal restore")]
    ShutdownHookRegistration,

    #[error("tcsetattr: {0}")]
    AttributeWrite(io::Error),

    #[error("quit key handling is already initialized")]
    AlreadyInitialized,

    #[error("quit byte {0:#04x} would disable the quit key")]
    InvalidQuitByte(u8),
}

impl Error {
    /// True when a failed `tcgetattr` only means the descriptor is not
    /// really a terminal.  Callers skip terminal setup in that case.
    pub fn is_not_a_terminal(&self) -> bool {
        match self {
            Error::AttributeRead(e) => matches!(
                e.raw_os_error(),
                Some(libc::ENOTTY | libc::ENXIO | libc::EBADF | libc::EINVAL | libc::ENODEV)
            ),
            _ => false,
        }
    }

    /// The OS error code underneath, if there is one.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Error::SignalInstall(e)
            | Error::TerminalResolution(e)
            | Error::AttributeRead(e)
            | Error::StopSignalDisposition(e)
            | Error::AttributeWrite(e) => e.raw_os_error(),
            Error::ShutdownHookRegistration
            | Error::AlreadyInitialized
            | Error::InvalidQuitByte(_) => None,
        }
    }
}
