//! SSH reachability checks through the OpenSSH client.

use std::fmt;
use std::process::{Command, Stdio};

/// Fixed connect timeout for every probe
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Where and as whom to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub key: String,
}

/// Why a probe failed: an error kind and its message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub kind: String,
    pub message: String,
}

impl ProbeFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Attempts a handshake and authentication against one endpoint
pub trait SshProbe {
    fn probe(&self, endpoint: &SshEndpoint) -> Result<(), ProbeFailure>;
}

/// Probe backed by the system `ssh` binary.
///
/// Host keys are neither checked nor recorded. Reaching the remote side
/// counts as success even when the login shell refuses to run commands.
#[derive(Debug, Clone)]
pub struct OpenSshProbe {
    program: String,
}

impl OpenSshProbe {
    pub fn new() -> Self {
        Self {
            program: "ssh".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(endpoint: &SshEndpoint) -> Vec<String> {
        vec![
            "-o".into(),
            "BatchMode=yes".into(),
            "-o".into(),
            format!("ConnectTimeout={}", CONNECT_TIMEOUT_SECS),
            "-o".into(),
            "StrictHostKeyChecking=no".into(),
            "-o".into(),
            "UserKnownHostsFile=/dev/null".into(),
            "-o".into(),
            "LogLevel=ERROR".into(),
            "-i".into(),
            endpoint.key.clone(),
            "-p".into(),
            endpoint.port.to_string(),
            "-l".into(),
            endpoint.user.clone(),
            endpoint.host.clone(),
            "true".into(),
        ]
    }
}

impl Default for OpenSshProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SshProbe for OpenSshProbe {
    fn probe(&self, endpoint: &SshEndpoint) -> Result<(), ProbeFailure> {
        let output = Command::new(&self.program)
            .args(Self::args(endpoint))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProbeFailure::new("SpawnError", e.to_string()))?;

        // ssh exits with 255 for its own connect and auth errors; any other
        // status was produced after authentication succeeded
        let kind = match output.status.code() {
            Some(255) => "SSHException",
            Some(_) => return Ok(()),
            None => "Interrupted",
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("no diagnostic output")
            .trim()
            .to_string();
        Err(ProbeFailure::new(kind, message))
    }
}
