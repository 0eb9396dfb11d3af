//! Newsbrief server binary.
//! Run with: cargo run --bin newsbrief-server

use std::process::ExitCode;

use newsbrief_agent::startup;

fn main() -> ExitCode {
    startup::run()
}
