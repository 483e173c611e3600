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

//! Control character table (termios c_cc) rewriting.

/// _POSIX_VDISABLE: a c_cc value that turns the function off.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const VDISABLE: libc::cc_t = 0;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub const VDISABLE: libc::cc_t = 0xff;

/// The control form of an ASCII letter, e.g. `control(b'q') == 0x11`.
pub const fn control(letter: u8) -> u8 {
    letter & 0x1f
}

/// Bind `key` to the quit function and nothing else.
///
/// Any slot already holding `key` is disabled first, so a function that
/// used the byte before (VSTART for ^Q, usually) stops reacting to it.
pub fn bind_quit(table: &mut [libc::cc_t], key: libc::cc_t) {
    for slot in table.iter_mut() {
        if *slot == key {
            *slot = VDISABLE;
        }
    }
    table[libc::VQUIT] = key;
}
