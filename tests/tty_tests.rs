//! Tests against real terminal devices
//!
//! A pseudoterminal slave in raw mode stands in for the user's terminal:
//! the test writes the reply on the master side before the probe reads it.

#![cfg(target_os = "linux")]

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::process::Command;
use std::time::Duration;

use nix::fcntl::OFlag;
use nix::libc;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg};

use tty_probe::probe::{
    ProbeError, ProbeOptions, StopReason, TerminalProbe, TtyDevice, STATUS_REQUEST,
};

/// Master side plus an open raw-mode slave
struct RawPty {
    master: PtyMaster,
    _slave: File,
    slave_path: String,
}

impl RawPty {
    fn new() -> Self {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).expect("posix_openpt");
        grantpt(&master).expect("grantpt");
        unlockpt(&master).expect("unlockpt");
        let slave_path = ptsname_r(&master).expect("ptsname");

        let slave = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&slave_path)
            .expect("open slave");

        let mut attrs = tcgetattr(&slave).expect("tcgetattr");
        cfmakeraw(&mut attrs);
        tcsetattr(&slave, SetArg::TCSANOW, &attrs).expect("tcsetattr");

        Self {
            master,
            _slave: slave,
            slave_path,
        }
    }

    /// Queue bytes as terminal input
    fn reply(&mut self, bytes: &[u8]) {
        self.master.write_all(bytes).expect("write reply");
    }

    /// Read exactly `n` bytes the probe wrote to the terminal
    fn read_request(&mut self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        self.master.read_exact(&mut out).expect("read request");
        out
    }
}

#[test]
fn test_probe_reads_reply_from_pty() {
    let mut pty = RawPty::new();
    pty.reply(b"\x1B[32;80R");

    let mut probe = TerminalProbe::acquire(&pty.slave_path, &ProbeOptions::default())
        .expect("acquire slave");
    let capture = probe.run().expect("probe run");

    assert_eq!(capture.as_bytes(), b"\x1B[32;80R");
    assert_eq!(capture.stop_reason(), StopReason::Terminator);
    assert_eq!(pty.read_request(STATUS_REQUEST.len()), STATUS_REQUEST);
}

#[test]
fn test_probe_times_out_on_silent_pty() {
    let mut pty = RawPty::new();
    pty.reply(b"\x1B[");

    let options = ProbeOptions {
        timeout: Some(Duration::from_millis(50)),
        ..ProbeOptions::default()
    };
    let mut probe = TerminalProbe::acquire(&pty.slave_path, &options).expect("acquire slave");
    let capture = probe.run().expect("probe run");

    assert_eq!(capture.as_bytes(), b"\x1B[");
    assert_eq!(capture.stop_reason(), StopReason::TimedOut);
}

#[test]
fn test_device_wait_readable() {
    use tty_probe::probe::Device;

    let mut pty = RawPty::new();
    let mut device = TtyDevice::open(&pty.slave_path).expect("open slave");
    assert!(!device.wait_readable(Duration::from_millis(20)).unwrap());

    pty.reply(b"R");
    assert!(device.wait_readable(Duration::from_millis(1000)).unwrap());
}

#[test]
fn test_acquire_missing_device() {
    let result = TerminalProbe::acquire("/dev/tty-probe-missing", &ProbeOptions::default());
    match result {
        Err(err @ ProbeError::DeviceUnavailable { .. }) => {
            assert_eq!(err.os_error().map(|(code, _)| code), Some(libc::ENOENT));
            assert!(err.report().starts_with("Cannot open /dev/tty-probe-missing: errno = "));
        },
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("missing device opened"),
    }
}

// ============================================================================
// Binary tests
// ============================================================================

fn probe_command(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tty-probe"));
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_prints_answerback() {
    let home = tempfile::tempdir().unwrap();
    let mut pty = RawPty::new();
    pty.reply(b"\x1B[7;12R");

    let output = probe_command(home.path())
        .args(["--device", &pty.slave_path])
        .output()
        .expect("run tty-probe");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"Answerback = \"\\x1B[7;12R\"\r\n");
}

#[test]
fn test_binary_without_controlling_terminal() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = probe_command(home.path());
    // SAFETY: setsid is async-signal-safe; it detaches the child from any
    // controlling terminal so /dev/tty cannot be opened.
    unsafe {
        cmd.pre_exec(|| {
            nix::unistd::setsid()
                .map(|_| ())
                .map_err(std::io::Error::from)
        });
    }

    let output = cmd.output().expect("run tty-probe");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(
        stderr.contains("Cannot open /dev/tty: errno = "),
        "unexpected stderr: {}",
        stderr
    );
}

#[test]
fn test_binary_help() {
    let home = tempfile::tempdir().unwrap();
    let output = probe_command(home.path())
        .arg("--help")
        .output()
        .expect("run tty-probe");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage: tty-probe"));
}

#[test]
fn test_binary_rejects_bad_config() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("probe.json");
    std::fs::write(&config, r#"{ "capacity": 0 }"#).unwrap();

    let output = probe_command(home.path())
        .args(["--config", config.to_str().unwrap()])
        .output()
        .expect("run tty-probe");

    assert!(!output.status.success());
}

#[test]
fn test_constant_binaries() {
    let output = Command::new(env!("CARGO_BIN_EXE_get-libc-const"))
        .output()
        .expect("run get-libc-const");
    let text = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = text.lines().collect();

    assert!(output.status.success());
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("TIOCGWINSZ: 0x"));
    assert_eq!(lines[1], format!("VMIN: {}", libc::VMIN));
    assert_eq!(lines[2], format!("VTIME: {}", libc::VTIME));

    let output = Command::new(env!("CARGO_BIN_EXE_get-tiocgwinsz"))
        .output()
        .expect("run get-tiocgwinsz");
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", lines[0]));
}
