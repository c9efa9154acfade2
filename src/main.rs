//! Binary entry point for `installer-ops`.

use std::process;

fn main() {
    if let Err(e) = installer_ops::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
