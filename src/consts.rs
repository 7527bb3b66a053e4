//! Platform terminal constants
//!
//! Values that differ between platforms and are easiest to read straight
//! from the C library: the window-size ioctl request and the `c_cc` indexes
//! of the non-canonical read controls.

use std::fmt;

use nix::libc;

/// `ioctl` request number for reading the window size
pub const TIOCGWINSZ: u64 = libc::TIOCGWINSZ as u64;

/// `c_cc` index of the minimum byte count for non-canonical reads
pub const VMIN: usize = libc::VMIN as usize;

/// `c_cc` index of the non-canonical read timeout
pub const VTIME: usize = libc::VTIME as usize;

/// Terminal constants of the running platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermConstants {
    pub tiocgwinsz: u64,
    pub vmin: usize,
    pub vtime: usize,
}

impl TermConstants {
    pub fn current() -> Self {
        Self {
            tiocgwinsz: TIOCGWINSZ,
            vmin: VMIN,
            vtime: VTIME,
        }
    }

    pub fn tiocgwinsz_line(&self) -> String {
        format!("TIOCGWINSZ: {}", alt_hex(self.tiocgwinsz))
    }
}

impl fmt::Display for TermConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tiocgwinsz_line())?;
        writeln!(f, "VMIN: {}", self.vmin)?;
        writeln!(f, "VTIME: {}", self.vtime)
    }
}

/// C `%#lx` formatting: zero has no `0x` prefix
fn alt_hex(value: u64) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{:#x}", value)
    }
}
