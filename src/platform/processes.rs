//! Live process table via sysinfo.

use sysinfo::{ProcessRefreshKind, RefreshKind, System, UpdateKind};

use crate::core::process_tree::{ProcessEntry, ProcessReader, ProcessTable};
use crate::error::Result;

/// Reads the current process list of this host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessReader;

impl SystemProcessReader {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessReader for SystemProcessReader {
    fn read(&self) -> Result<ProcessTable> {
        let refresh_kind = RefreshKind::nothing()
            .with_processes(ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always));
        let system = System::new_with_specifics(refresh_kind);

        let table: ProcessTable = system
            .processes()
            .iter()
            // Linux reports threads as processes too
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                let args: Vec<String> = process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect();
                let command = if args.is_empty() {
                    // kernel threads have no argv; show them the way ps does
                    format!("[{}]", process.name().to_string_lossy())
                } else {
                    args.join(" ")
                };
                let parent_pid = process.parent().map(|p| p.as_u32()).unwrap_or(0);
                ProcessEntry::new(pid.as_u32(), parent_pid, command)
            })
            .collect();

        log::debug!("Read {} processes", table.len());
        Ok(table)
    }
}

/// Replays a fixed `ps -eo pid,ppid,args` listing
#[derive(Debug, Clone)]
pub struct ListingProcessReader {
    listing: String,
}

impl ListingProcessReader {
    pub fn new(listing: impl Into<String>) -> Self {
        Self {
            listing: listing.into(),
        }
    }
}

impl ProcessReader for ListingProcessReader {
    fn read(&self) -> Result<ProcessTable> {
        ProcessTable::parse_listing(&self.listing)
    }
}
