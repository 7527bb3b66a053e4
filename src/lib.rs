//! Terminal probe library
//!
//! Queries a terminal for things that compile-time constants cannot tell:
//!
//! - `probe`: device-status-report round-trip against the controlling terminal
//! - `render`: printable rendering of the raw reply
//! - `consts`: platform termios and ioctl constants
//! - `app`: configuration and logging for the binaries

pub mod app;
pub mod consts;
pub mod probe;
pub mod render;
