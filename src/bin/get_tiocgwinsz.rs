//! Print the TIOCGWINSZ ioctl request number

use tty_probe::consts::TermConstants;

fn main() {
    println!("{}", TermConstants::current().tiocgwinsz_line());
}
