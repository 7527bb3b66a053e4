//! Terminal status-report probe
//!
//! Sends a device-status-report request to a terminal and captures the raw
//! reply. The reply is read one byte at a time into a bounded buffer until
//! the terminator byte arrives, the buffer fills, or the device stops
//! delivering bytes.
//!
//! The probe moves through a fixed sequence of states:
//!
//! ```text
//! Opened -> RequestSent -> Reading -> Done(StopReason)
//! ```
//!
//! A device that cannot be opened never produces a probe; [`TerminalProbe::acquire`]
//! returns [`ProbeError::DeviceUnavailable`] instead.
//!
//! Reference: ECMA-48 §8.3.35 (DSR), §8.3.14 (CPR)

mod buffer;
mod device;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::errno::Errno;

pub use buffer::{BufferFull, ResponseBuffer, DEFAULT_CAPACITY};
pub use device::{Device, TtyDevice, CONTROLLING_TTY};

use crate::render::Answerback;

/// Device-status-report request (`ESC [ 6 n`)
pub const DSR_REQUEST: &[u8] = b"\x1B[6n";

/// DSR request followed by a newline, as traditionally sent by the probe
pub const STATUS_REQUEST: &[u8] = b"\x1B[6n\n";

/// Final byte of a cursor position report
pub const DSR_TERMINATOR: u8 = b'R';

/// Error type for probe operations
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Cannot open {}: {source}", .path.display())]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write status request: {0}")]
    DeviceWriteFailed(#[source] io::Error),
}

impl ProbeError {
    /// The underlying OS error code and its description, if any
    pub fn os_error(&self) -> Option<(i32, &'static str)> {
        let source = match self {
            ProbeError::DeviceUnavailable { source, .. } => source,
            ProbeError::DeviceWriteFailed(source) => source,
        };
        source
            .raw_os_error()
            .map(|code| (code, Errno::from_raw(code).desc()))
    }

    /// One-line report in the `errno = N, description` form
    pub fn report(&self) -> String {
        match (self, self.os_error()) {
            (ProbeError::DeviceUnavailable { path, .. }, Some((code, desc))) => {
                format!("Cannot open {}: errno = {}, {}", path.display(), code, desc)
            },
            (ProbeError::DeviceWriteFailed(_), Some((code, desc))) => {
                format!("Cannot write status request: errno = {}, {}", code, desc)
            },
            (_, None) => self.to_string(),
        }
    }
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Why the read loop ended. Every variant is a successful completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The terminator byte was captured
    Terminator,
    /// The buffer limit was reached without a terminator
    BufferFull,
    /// A read returned zero bytes
    EndOfInput,
    /// A read failed; the prefix captured so far is kept
    ReadFailed(io::ErrorKind),
    /// No byte arrived within the configured timeout
    TimedOut,
}

/// Probe lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Opened,
    RequestSent,
    Reading,
    Done(StopReason),
}

/// Tunables for a probe run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Buffer capacity, end marker slot included
    pub capacity: usize,
    /// Byte that ends the reply
    pub terminator: u8,
    /// Bytes written to request the report
    pub request: Vec<u8>,
    /// Per-byte read timeout; `None` blocks indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            terminator: DSR_TERMINATOR,
            request: STATUS_REQUEST.to_vec(),
            timeout: None,
        }
    }
}

/// Bytes captured by one read loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    bytes: Vec<u8>,
    stop: StopReason,
}

impl Capture {
    pub fn new(bytes: Vec<u8>, stop: StopReason) -> Self {
        Self { bytes, stop }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop
    }

    /// True if the reply ended with the terminator byte
    pub fn is_complete(&self) -> bool {
        self.stop == StopReason::Terminator
    }

    pub fn answerback(&self) -> Answerback<'_> {
        Answerback::new(&self.bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// One request/response round-trip against a terminal device
pub struct TerminalProbe<D> {
    device: D,
    buffer: ResponseBuffer,
    terminator: u8,
    request: Vec<u8>,
    timeout: Option<Duration>,
    state: ProbeState,
}

impl TerminalProbe<TtyDevice> {
    /// Open the terminal at `path` and prepare a probe on it
    pub fn acquire(path: impl AsRef<Path>, options: &ProbeOptions) -> ProbeResult<Self> {
        let device = TtyDevice::open(path)?;
        Ok(Self::new(device, options))
    }
}

impl<D: Device> TerminalProbe<D> {
    /// Wrap an already opened device
    pub fn new(device: D, options: &ProbeOptions) -> Self {
        Self {
            device,
            buffer: ResponseBuffer::new(options.capacity),
            terminator: options.terminator,
            request: options.request.clone(),
            timeout: options.timeout,
            state: ProbeState::Opened,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Release the device
    pub fn into_device(self) -> D {
        self.device
    }

    /// Write the status request to the device.
    ///
    /// A short or failed write is fatal: a reply to a request that never
    /// fully reached the terminal is meaningless.
    pub fn send_status_request(&mut self) -> ProbeResult<()> {
        self.device
            .write_all(&self.request)
            .and_then(|()| self.device.flush())
            .map_err(ProbeError::DeviceWriteFailed)?;

        tracing::debug!("Sent {}-byte status request", self.request.len());
        self.transition(ProbeState::RequestSent);
        Ok(())
    }

    /// Read the reply one byte at a time.
    ///
    /// Blocks on every byte unless a timeout is configured. Stops on the
    /// terminator, a full buffer, end of input, a failed read or a timeout;
    /// none of these are errors.
    pub fn read_response(&mut self) -> Capture {
        self.transition(ProbeState::Reading);

        let mut byte = [0u8; 1];
        let stop = loop {
            if self.buffer.is_full() {
                break StopReason::BufferFull;
            }

            if let Some(timeout) = self.timeout {
                match self.device.wait_readable(timeout) {
                    Ok(true) => {},
                    Ok(false) => break StopReason::TimedOut,
                    Err(e) => break StopReason::ReadFailed(e.kind()),
                }
            }

            match self.device.read(&mut byte) {
                Ok(0) => break StopReason::EndOfInput,
                Ok(_) => {
                    if self.buffer.push(byte[0]).is_err() {
                        break StopReason::BufferFull;
                    }
                    if byte[0] == self.terminator {
                        break StopReason::Terminator;
                    }
                },
                Err(e) => {
                    tracing::warn!("Read from terminal failed: {}", e);
                    break StopReason::ReadFailed(e.kind());
                },
            }
        };

        let capacity = self.buffer.capacity();
        let bytes = std::mem::replace(&mut self.buffer, ResponseBuffer::new(capacity)).into_bytes();

        tracing::debug!("Captured {} bytes, stopped by {:?}", bytes.len(), stop);
        self.transition(ProbeState::Done(stop));
        Capture::new(bytes, stop)
    }

    /// Send the request and read the reply
    pub fn run(&mut self) -> ProbeResult<Capture> {
        self.send_status_request()?;
        Ok(self.read_response())
    }

    fn transition(&mut self, next: ProbeState) {
        tracing::trace!("Probe state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
