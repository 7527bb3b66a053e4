//! Terminal device access
//!
//! `TtyDevice` wraps the controlling terminal special file. The probe talks
//! to it through the [`Device`] trait so the read loop can also run against
//! in-memory devices.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use super::{ProbeError, ProbeResult};

/// Path of the controlling terminal
pub const CONTROLLING_TTY: &str = "/dev/tty";

/// A byte device the probe can write a request to and read a reply from
pub trait Device: Read + Write {
    /// Wait until at least one byte can be read.
    ///
    /// Returns `Ok(false)` if the timeout elapsed first. Devices that cannot
    /// poll report themselves as always readable.
    fn wait_readable(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

/// Exclusively-owned read/write handle to a terminal device
#[derive(Debug)]
pub struct TtyDevice {
    file: File,
    path: PathBuf,
}

impl TtyDevice {
    /// Open the controlling terminal
    pub fn open_controlling() -> ProbeResult<Self> {
        Self::open(CONTROLLING_TTY)
    }

    /// Open a terminal device for simultaneous reading and writing
    pub fn open(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| ProbeError::DeviceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Opened {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for TtyDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for TtyDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Device for TtyDevice {
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        let n = poll(&mut fds, PollTimeout::from(millis)).map_err(io::Error::from)?;
        // POLLHUP/POLLERR also count: the next read reports them as EOF or error
        Ok(n > 0)
    }
}
