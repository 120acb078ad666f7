use std::time::Duration;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

use super::platform::{self, CpuTimes, PagingStats, PlatformError};
use super::process::{ProcessEntry, filter_by_name};
use super::snapshot::{LookupFailure, ResourceSnapshot};

/// Where process listings and resource snapshots come from.
pub trait SnapshotSource {
    /// Best-effort listing; an entry that cannot report its start time still
    /// appears, carrying the failure.
    fn list_processes(&mut self) -> Vec<ProcessEntry>;

    /// Fresh lookup by pid on every call; no handle is held between calls.
    fn snapshot(&mut self, pid: u32) -> Result<ResourceSnapshot, LookupFailure>;

    fn processes_by_name(&mut self, name: &str) -> Vec<ProcessEntry> {
        filter_by_name(self.list_processes(), name)
    }
}

pub struct Collector {
    sys: System,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Collector { sys: System::new() }
    }
}

impl SnapshotSource for Collector {
    fn list_processes(&mut self) -> Vec<ProcessEntry> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        let mut entries: Vec<ProcessEntry> = self
            .sys
            .processes()
            .iter()
            // Linux reports every task; only thread-group leaders are processes.
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                let start_time = match process.start_time() {
                    0 => Err("start time is not available".to_string()),
                    secs => Ok(secs),
                };
                ProcessEntry {
                    pid: pid.as_u32(),
                    name: process.name().to_string_lossy().to_string(),
                    start_time,
                }
            })
            .collect();
        entries.sort_by_key(|entry| entry.pid);
        entries
    }

    fn snapshot(&mut self, pid: u32) -> Result<ResourceSnapshot, LookupFailure> {
        let sys_pid = Pid::from_u32(pid);
        let pids = [sys_pid];
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        let process = self
            .sys
            .process(sys_pid)
            .ok_or(LookupFailure::NotFound { pid })?;

        let cpu = match platform::process_cpu_times(pid) {
            Ok(times) => times,
            Err(PlatformError::Unsupported) => CpuTimes {
                user: Duration::from_millis(process.accumulated_cpu_time()),
                kernel: Duration::ZERO,
            },
            Err(err) => return Err(lookup_failure(pid, err)),
        };
        let paging = match platform::process_paging(pid) {
            Ok(stats) => stats,
            Err(PlatformError::Unsupported) => PagingStats::default(),
            Err(err) => return Err(lookup_failure(pid, err)),
        };

        let snapshot = ResourceSnapshot {
            pid,
            start_time: process.start_time(),
            working_set_bytes: process.memory(),
            user_cpu_time: cpu.user,
            privileged_cpu_time: cpu.kernel,
            total_cpu_time: cpu.user + cpu.kernel,
            paged_system_memory_bytes: paging.paged_system_bytes,
            paged_memory_bytes: paging.paged_bytes,
        };
        debug!(
            pid,
            working_set = snapshot.working_set_bytes,
            total_cpu_ms = snapshot.total_cpu_time.as_millis() as u64,
            "snapshot collected"
        );
        Ok(snapshot)
    }
}

fn lookup_failure(pid: u32, err: PlatformError) -> LookupFailure {
    match err {
        PlatformError::AccessDenied => LookupFailure::AccessDenied { pid },
        PlatformError::Gone | PlatformError::Unsupported => LookupFailure::NotFound { pid },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_listed_and_sampled() {
        let pid = std::process::id();
        let mut collector = Collector::new();

        let entries = collector.list_processes();
        let own = entries
            .iter()
            .find(|e| e.pid == pid)
            .expect("current process missing from listing");
        assert!(!own.name.is_empty());

        let snapshot = collector.snapshot(pid).expect("failed to sample self");
        assert_eq!(snapshot.pid, pid);
        assert!(snapshot.working_set_bytes > 0);
        assert_eq!(
            snapshot.total_cpu_time,
            snapshot.user_cpu_time + snapshot.privileged_cpu_time
        );
        if let Ok(start_time) = own.start_time {
            assert_eq!(snapshot.start_time, start_time);
        }
    }

    #[test]
    fn threads_are_not_listed_as_processes() {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        let worker = std::thread::Builder::new()
            .name("listing-worker".to_string())
            .spawn(move || {
                ready_tx.send(()).unwrap();
                let _ = done_rx.recv();
            })
            .unwrap();
        ready_rx.recv().unwrap();

        let pid = std::process::id();
        let entries = Collector::new().list_processes();
        assert!(entries.iter().any(|e| e.pid == pid));
        assert!(entries.iter().all(|e| e.name != "listing-worker"));

        let tasks = std::fs::read_dir("/proc/self/task").into_iter().flatten();
        for task in tasks.flatten() {
            let Some(tid) = task.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            if tid != pid {
                assert!(entries.iter().all(|e| e.pid != tid), "thread {tid} listed");
            }
        }

        done_tx.send(()).unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn unknown_pid_is_not_found() {
        let mut collector = Collector::new();
        let pid = u32::MAX - 1;
        assert_eq!(
            collector.snapshot(pid).unwrap_err(),
            LookupFailure::NotFound { pid }
        );
    }

    #[test]
    fn platform_errors_map_to_lookup_failures() {
        assert_eq!(
            lookup_failure(3, PlatformError::AccessDenied),
            LookupFailure::AccessDenied { pid: 3 }
        );
        assert_eq!(
            lookup_failure(3, PlatformError::Gone),
            LookupFailure::NotFound { pid: 3 }
        );
    }
}
