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

//! SIGQUIT catching.
//!
//! The handler only stores into an atomic; it must stay async-signal-safe,
//! so no logging, allocation or locking happens there.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Error;

/// Set once SIGQUIT arrives.  Never cleared.
static QUIT_RECEIVED: AtomicBool = AtomicBool::new(false);

extern "C" fn quit_handler(_sig: libc::c_int) {
    QUIT_RECEIVED.store(true, Ordering::Relaxed);
}

/// Install the SIGQUIT handler.
///
/// sa_mask is empty and sa_flags is 0: no SA_RESTART, so a blocking read()
/// elsewhere returns EINTR when ^Q is pressed instead of resuming.
pub fn install() -> Result<(), Error> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = quit_handler as extern "C" fn(libc::c_int) as libc::sighandler_t;
        libc::sigemptyset(&mut sa.sa_mask);
        sa.sa_flags = 0;
        if libc::sigaction(libc::SIGQUIT, &sa, std::ptr::null_mut()) != 0 {
            return Err(Error::SignalInstall(io::Error::last_os_error()));
        }
    }
    Ok(())
}

/// Has SIGQUIT been delivered since startup?
pub fn received() -> bool {
    QUIT_RECEIVED.load(Ordering::Relaxed)
}
