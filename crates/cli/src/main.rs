use std::process::ExitCode;

fn main() -> ExitCode {
    slotty_cli::run()
}
