// Command line handling

pub mod args;
pub mod run;

pub use args::{build_cli, parse_args, Setting};
pub use run::{execute, run_watchers};
