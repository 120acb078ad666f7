use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Point-in-time reading of one process's resource counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceSnapshot {
    pub pid: u32,
    /// Process creation time, seconds since the Unix epoch.
    pub start_time: u64,
    pub working_set_bytes: u64,
    pub user_cpu_time: Duration,
    pub privileged_cpu_time: Duration,
    pub total_cpu_time: Duration,
    pub paged_system_memory_bytes: u64,
    pub paged_memory_bytes: u64,
}

/// The process a session is tied to. A pid alone is not enough: the OS may
/// hand the same pid to an unrelated process once the first one exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub start_time: Option<u64>,
}

impl ProcessIdentity {
    pub fn new(pid: u32, start_time: u64) -> Self {
        Self {
            pid,
            start_time: Some(start_time),
        }
    }

    /// Identity whose start time is adopted from the first snapshot.
    pub fn unverified(pid: u32) -> Self {
        Self {
            pid,
            start_time: None,
        }
    }

    pub fn verify(&mut self, snapshot: &ResourceSnapshot) -> Result<(), LookupFailure> {
        match self.start_time {
            Some(expected) if expected != snapshot.start_time => {
                Err(LookupFailure::IdentityChanged {
                    pid: self.pid,
                    expected,
                    found: snapshot.start_time,
                })
            }
            Some(_) => Ok(()),
            None => {
                self.start_time = Some(snapshot.start_time);
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupFailure {
    NotFound { pid: u32 },
    AccessDenied { pid: u32 },
    /// The pid now belongs to a process with a different start time.
    IdentityChanged { pid: u32, expected: u64, found: u64 },
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::NotFound { pid } => write!(f, "process {pid} is not running"),
            LookupFailure::AccessDenied { pid } => write!(f, "access to process {pid} was denied"),
            LookupFailure::IdentityChanged {
                pid,
                expected,
                found,
            } => write!(
                f,
                "pid {pid} was reused (started at {found}, expected {expected})"
            ),
        }
    }
}

impl std::error::Error for LookupFailure {}
