//! Print platform termios constants
//!
//! Reports the window-size ioctl request and the VMIN/VTIME indexes of the
//! C library this binary was built against.

use tty_probe::consts::TermConstants;

fn main() {
    print!("{}", TermConstants::current());
}
