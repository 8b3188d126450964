//! Process table snapshots and lineage-aware counting.
//!
//! A [`ProcessTable`] maps each pid to its parent pid and command line. The
//! [`ProcessCounter`] counts command lines either per process (distinct mode) or
//! per lineage root (aggregated mode), where a process whose parent runs the
//! exact same command line is folded into that parent.

use std::collections::HashMap;
use std::fmt;

use once_cell::unsync::OnceCell;

use super::pattern::Pattern;
use crate::error::{AlertError, Result};

/// One row of a process listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub parent_pid: u32,
    pub command: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, parent_pid: u32, command: impl Into<String>) -> Self {
        Self {
            pid,
            parent_pid,
            command: command.into(),
        }
    }
}

/// Source of process table snapshots
pub trait ProcessReader {
    fn read(&self) -> Result<ProcessTable>;
}

/// Snapshot of the host's processes: pid -> (parent pid, command line)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessTable {
    entries: HashMap<u32, (u32, String)>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ProcessEntry) {
        self.entries
            .insert(entry.pid, (entry.parent_pid, entry.command));
    }

    pub fn get(&self, pid: u32) -> Option<&(u32, String)> {
        self.entries.get(&pid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &(u32, String))> {
        self.entries.iter()
    }

    /// Parse `ps -eo pid,ppid,args` style output. The first line is a header.
    pub fn parse_listing(listing: &str) -> Result<Self> {
        let mut table = Self::new();
        for line in listing.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            table.insert(parse_listing_line(line)?);
        }
        Ok(table)
    }
}

impl FromIterator<ProcessEntry> for ProcessTable {
    fn from_iter<I: IntoIterator<Item = ProcessEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

fn parse_listing_line(line: &str) -> Result<ProcessEntry> {
    let invalid = || AlertError::other(format!("Failed to parse process listing line: {}", line));

    let (pid, rest) = split_field(line).ok_or_else(invalid)?;
    let (ppid, command) = split_field(rest).unwrap_or((rest.trim(), ""));

    let pid = pid.parse::<u32>().map_err(|_| invalid())?;
    let ppid = ppid.parse::<u32>().map_err(|_| invalid())?;

    Ok(ProcessEntry::new(pid, ppid, command.trim()))
}

/// Split off the first whitespace-delimited field
fn split_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], &s[idx..])),
        None => Some((s, "")),
    }
}

/// Counts processes by command line over one snapshot.
///
/// Both the distinct and the aggregated tallies are computed at most once per
/// counter and reused for every pattern evaluated against the snapshot.
pub struct ProcessCounter {
    table: ProcessTable,
    distinct: OnceCell<HashMap<String, usize>>,
    aggregated: OnceCell<HashMap<String, usize>>,
}

impl ProcessCounter {
    pub fn new(table: ProcessTable) -> Self {
        Self {
            table,
            distinct: OnceCell::new(),
            aggregated: OnceCell::new(),
        }
    }

    /// Number of processes whose command line matches `pattern`
    pub fn count(&self, pattern: &Pattern, aggregate: bool) -> usize {
        let tally = if aggregate {
            self.aggregated()
        } else {
            self.distinct()
        };
        tally
            .iter()
            .filter(|(command, _)| pattern.is_match(command))
            .map(|(_, n)| n)
            .sum()
    }

    /// Every process counted once
    pub fn distinct(&self) -> &HashMap<String, usize> {
        self.distinct.get_or_init(|| {
            let mut tally = HashMap::new();
            for (_, (_, command)) in self.table.iter() {
                *tally.entry(command.clone()).or_insert(0) += 1;
            }
            tally
        })
    }

    /// Processes whose parent runs the same command line are folded into it
    pub fn aggregated(&self) -> &HashMap<String, usize> {
        self.aggregated.get_or_init(|| {
            let mut tally = HashMap::new();
            for (pid, (parent_pid, command)) in self.table.iter() {
                let forked_from_same = parent_pid != pid
                    && matches!(
                        self.table.get(*parent_pid),
                        Some((_, parent_command)) if parent_command == command
                    );
                if !forked_from_same {
                    *tally.entry(command.clone()).or_insert(0) += 1;
                }
            }
            tally
        })
    }
}

impl fmt::Debug for ProcessCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCounter")
            .field("processes", &self.table.len())
            .field("distinct_cached", &self.distinct.get().is_some())
            .field("aggregated_cached", &self.aggregated.get().is_some())
            .finish()
    }
}
