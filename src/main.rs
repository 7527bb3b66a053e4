//! tty-probe
//!
//! Sends a device-status-report request to the controlling terminal and
//! prints the raw reply in escaped form.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use tty_probe::app::{logging, ProbeConfig};
use tty_probe::probe::TerminalProbe;

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut config_path: Option<PathBuf> = None;
    let mut device: Option<PathBuf> = None;
    let mut timeout_ms: Option<u16> = None;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            },
            "-d" | "--device" => {
                i += 1;
                if i < args.len() {
                    device = Some(PathBuf::from(&args[i]));
                }
            },
            "-t" | "--timeout-ms" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse() {
                        Ok(ms) => timeout_ms = Some(ms),
                        Err(_) => {
                            eprintln!("Invalid timeout '{}': expected 0-65535", args[i]);
                            return ExitCode::FAILURE;
                        },
                    }
                }
            },
            "-h" | "--help" => {
                show_help = true;
            },
            other => {
                tracing::warn!("Ignoring unknown argument: {}", other);
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &config_path {
        Some(path) => match ProbeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => ProbeConfig::load_or_default(),
    };
    if let Some(device) = device {
        config.device = device;
    }
    if timeout_ms.is_some() {
        config.timeout_ms = timeout_ms;
    }

    let mut probe = match TerminalProbe::acquire(&config.device, &config.probe_options()) {
        Ok(probe) => probe,
        Err(e) => {
            eprint!("{}\r\n", e.report());
            return ExitCode::FAILURE;
        },
    };

    let capture = match probe.run() {
        Ok(capture) => capture,
        Err(e) => {
            eprint!("{}\r\n", e.report());
            return ExitCode::FAILURE;
        },
    };

    tracing::info!(
        "Reply from {}: {} bytes, {:?}",
        probe.device().path().display(),
        capture.len(),
        capture.stop_reason()
    );

    let mut stdout = io::stdout();
    let _ = stdout.write_all(capture.answerback().report_line().as_bytes());
    let _ = stdout.flush();

    ExitCode::SUCCESS
}

fn print_help() {
    println!("tty-probe - Terminal status-report probe");
    println!();
    println!("Usage: tty-probe [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>    Load configuration from a JSON file");
    println!("  -d, --device <PATH>    Terminal device to probe (default: /dev/tty)");
    println!("  -t, --timeout-ms <N>   Give up waiting for a reply byte after N ms");
    println!("  -h, --help             Show this help message");
    println!();
    println!("Writes ESC [ 6 n to the terminal and prints the reply with");
    println!("non-printable bytes shown as \\xHH escapes.");
    println!();
    println!("Without a timeout the probe blocks until the terminal answers;");
    println!("terminals that ignore status requests need Ctrl-C.");
}
