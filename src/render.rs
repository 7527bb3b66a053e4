//! Answerback rendering
//!
//! Turns captured reply bytes into a quoted, printable string. Printable
//! ASCII (space through tilde) is shown as-is; every other byte becomes a
//! `\xHH` escape with two uppercase hex digits.

use std::fmt::{self, Write as _};

/// Label printed in front of the rendered reply
pub const ANSWERBACK_LABEL: &str = "Answerback = ";

/// Displayable view of captured reply bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answerback<'a> {
    bytes: &'a [u8],
}

impl<'a> Answerback<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Full report line, terminated with CR LF
    pub fn report_line(&self) -> String {
        format!("{}{}\r\n", ANSWERBACK_LABEL, self)
    }
}

impl fmt::Display for Answerback<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for &byte in self.bytes {
            write_byte(f, byte)?;
        }
        f.write_char('"')
    }
}

/// True for bytes shown literally
#[inline]
pub fn is_printable(byte: u8) -> bool {
    (b' '..=b'~').contains(&byte)
}

fn write_byte(f: &mut impl fmt::Write, byte: u8) -> fmt::Result {
    if is_printable(byte) {
        f.write_char(byte as char)
    } else {
        write!(f, "\\x{:02X}", byte)
    }
}

/// Render bytes as a quoted, escaped string
pub fn render(bytes: &[u8]) -> String {
    Answerback::new(bytes).to_string()
}
