// Host integration: process table, subprocesses, SSH and syslog

pub mod processes;
pub mod shell;
pub mod ssh;
pub mod syslog;

pub use processes::{ListingProcessReader, SystemProcessReader};
pub use shell::{run_shell, CommandOutput};
pub use ssh::{OpenSshProbe, ProbeFailure, SshEndpoint, SshProbe};
