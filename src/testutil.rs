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

//! Pseudo-terminal fixtures and signal disposition probes for unit tests.

use std::os::fd::{AsFd, BorrowedFd, FromRawFd, OwnedFd};
use std::sync::{Mutex, MutexGuard};

/// The SIGTTOU disposition is process-wide and the test harness is
/// threaded; anything that calls tcsetattr through `set_attr_nostop`
/// holds this.
static SIGTTOU_LOCK: Mutex<()> = Mutex::new(());

pub fn sigttou_lock() -> MutexGuard<'static, ()> {
    SIGTTOU_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct Pty {
    _master: OwnedFd,
    slave: OwnedFd,
}

impl Pty {
    pub fn open() -> Self {
        let mut master: libc::c_int = -1;
        let mut slave: libc::c_int = -1;
        let rc = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(rc, 0, "openpty: {}", std::io::Error::last_os_error());
        unsafe {
            Pty {
                _master: OwnedFd::from_raw_fd(master),
                slave: OwnedFd::from_raw_fd(slave),
            }
        }
    }

    pub fn slave(&self) -> BorrowedFd<'_> {
        self.slave.as_fd()
    }

    /// A second descriptor for the slave side, for code that takes ownership.
    pub fn slave_owned(&self) -> OwnedFd {
        self.slave.try_clone().unwrap()
    }
}

/// Field-by-field termios comparison covering every field the platform's
/// struct has (libc::termios has no PartialEq without the extra_traits
/// feature, and padding bytes can't be compared).
pub fn same_attributes(a: &libc::termios, b: &libc::termios) -> bool {
    let common = a.c_iflag == b.c_iflag
        && a.c_oflag == b.c_oflag
        && a.c_cflag == b.c_cflag
        && a.c_lflag == b.c_lflag
        && a.c_cc == b.c_cc
        && unsafe {
            libc::cfgetispeed(a) == libc::cfgetispeed(b)
                && libc::cfgetospeed(a) == libc::cfgetospeed(b)
        };

    #[cfg(any(target_os = "linux", target_os = "android"))]
    let line = a.c_line == b.c_line;
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    let line = true;

    #[cfg(any(
        all(target_os = "linux", target_env = "gnu"),
        target_os = "macos",
        target_os = "freebsd"
    ))]
    let speed = a.c_ispeed == b.c_ispeed && a.c_ospeed == b.c_ospeed;
    #[cfg(all(target_os = "linux", target_env = "musl"))]
    let speed = a.__c_ispeed == b.__c_ispeed && a.__c_ospeed == b.__c_ospeed;
    #[cfg(not(any(
        all(target_os = "linux", any(target_env = "gnu", target_env = "musl")),
        target_os = "macos",
        target_os = "freebsd"
    )))]
    let speed = true;

    common && line && speed
}

pub fn sigttou_handler() -> libc::sighandler_t {
    unsafe {
        let mut current: libc::sigaction = std::mem::zeroed();
        assert_eq!(libc::sigaction(libc::SIGTTOU, std::ptr::null(), &mut current), 0);
        current.sa_sigaction
    }
}

/// Returns the handler that was there before.
pub fn set_sigttou_handler(handler: libc::sighandler_t) -> libc::sighandler_t {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler;
        libc::sigemptyset(&mut sa.sa_mask);
        let mut previous: libc::sigaction = std::mem::zeroed();
        assert_eq!(libc::sigaction(libc::SIGTTOU, &sa, &mut previous), 0);
        previous.sa_sigaction
    }
}
