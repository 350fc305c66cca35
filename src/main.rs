//! quietcut CLI entry point.

#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use quietcut::Error;

fn main() {
    match quietcut::run() {
        Ok(()) => {}
        Err(Error::Cancelled) => {
            eprintln!("error: {}", Error::Cancelled);
            std::process::exit(130);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
