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

//! quitkey - wait until the user presses the quit key
//!
//! Binds the terminal's quit character (default ^Q) to SIGQUIT and polls
//! until it arrives.  Handy for trying out a terminal's behaviour, and as a
//! "press ^Q to continue" step in shell scripts.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static TIMED_OUT: AtomicBool = AtomicBool::new(false);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const EXIT_QUIT: i32 = 0;
const EXIT_TIMEOUT: i32 = 2;
const EXIT_ERROR: i32 = 255;

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

fn print_usage() {
    let usage = [
        "usage: quitkey              wait for ^Q",
        "       -k<letter>           quit key is Ctrl-<letter> instead of ^Q",
        "       -t<seconds>          give up after <seconds>",
        "       -h                   help screen",
        "       --version            show version and exit",
        "",
        "QUITKEY_LOG=debug quitkey   show what was done to the terminal",
        "",
        "exit status: 0 quit key pressed, 2 timed out, 255 error",
    ];
    for line in &usage {
        eprintln!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Arg parsing
// ---------------------------------------------------------------------------

struct ArgParser {
    args: Vec<String>,
    pos: usize,
}

impl ArgParser {
    fn new() -> Self {
        ArgParser {
            args: std::env::args().collect(),
            pos: 1,
        }
    }

    fn get_optarg(&mut self, rest: &str) -> Option<String> {
        if !rest.is_empty() {
            Some(rest.to_string())
        } else {
            self.pos += 1;
            self.args.get(self.pos).cloned()
        }
    }
}

struct Options {
    quit_letter: u8,
    timeout_secs: u32,
}

fn parse_args() -> Options {
    let mut opts = Options {
        quit_letter: b'q',
        timeout_secs: 0,
    };
    let mut parser = ArgParser::new();

    if parser.args.get(parser.pos).is_some_and(|a| a == "--version") {
        eprintln!("quitkey {}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    while parser.pos < parser.args.len() {
        let arg = parser.args[parser.pos].clone();
        let Some(flag) = arg.strip_prefix('-') else {
            print_usage();
            process::exit(EXIT_ERROR);
        };
        let mut chars = flag.chars();
        let rest: String = chars.clone().skip(1).collect();
        match chars.next() {
            Some('k') => {
                let val = parser.get_optarg(&rest).unwrap_or_default();
                opts.quit_letter = match val.as_bytes() {
                    [b] if b.is_ascii_alphabetic() => b.to_ascii_lowercase(),
                    _ => {
                        eprintln!("-k option: need a single letter");
                        process::exit(EXIT_ERROR);
                    }
                };
            }
            Some('t') => {
                let val = parser.get_optarg(&rest).unwrap_or_default();
                opts.timeout_secs = val.parse::<u32>().unwrap_or(0);
                if opts.timeout_secs == 0 {
                    eprintln!("-t option: number of seconds to timeout must be greater than zero");
                    process::exit(EXIT_ERROR);
                }
            }
            _ => {
                print_usage();
                process::exit(EXIT_ERROR);
            }
        }
        parser.pos += 1;
    }
    opts
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

fn setup_alarm(secs: u32) {
    unsafe {
        // sa_flags = 0, same as the SIGQUIT handler: no SA_RESTART.
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = alarm_handler as extern "C" fn(libc::c_int) as libc::sighandler_t;
        libc::sigemptyset(&mut sa.sa_mask);
        sa.sa_flags = 0;
        libc::sigaction(libc::SIGALRM, &sa, std::ptr::null_mut());
        libc::alarm(secs);
    }
}

extern "C" fn alarm_handler(_sig: libc::c_int) {
    TIMED_OUT.store(true, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("QUITKEY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = parse_args();
    let config = quitkey::Config {
        quit_byte: quitkey::control(opts.quit_letter),
    };

    if let Err(e) = quitkey::init_with(&config) {
        eprintln!("quitkey: {}", e);
        process::exit(EXIT_ERROR);
    }

    if quitkey::terminal_bound() {
        eprintln!("press ^{} to quit", opts.quit_letter.to_ascii_uppercase() as char);
    } else {
        eprintln!("no terminal; waiting for SIGQUIT (pid {})", process::id());
    }

    if opts.timeout_secs > 0 {
        setup_alarm(opts.timeout_secs);
    }

    // process::exit runs the atexit hook that restores the terminal.
    loop {
        if quitkey::quit_requested() {
            process::exit(EXIT_QUIT);
        }
        if TIMED_OUT.load(Ordering::Relaxed) {
            process::exit(EXIT_TIMEOUT);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
