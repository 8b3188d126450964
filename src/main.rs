use std::process::ExitCode;

use easy_alert::commands::{execute, parse_args};

fn main() -> ExitCode {
    let setting = match parse_args(std::env::args_os()) {
        Ok(setting) => setting,
        // usage errors exit with 2, --help and --version with 0
        Err(e) => e.exit(),
    };

    easy_alert::init_logging(setting.print_only);
    ExitCode::from(execute(&setting))
}
