use std::io::ErrorKind;
use std::sync::OnceLock;
use std::time::Duration;

use super::{CpuTimes, PagingStats, PlatformError, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn process_cpu_times(pid: u32) -> Result<CpuTimes, PlatformError> {
        let contents = read_proc_file(pid, "stat")?;
        parse_stat_times(&contents, clock_ticks()).ok_or(PlatformError::Unsupported)
    }

    fn process_paging(pid: u32) -> Result<PagingStats, PlatformError> {
        let contents = read_proc_file(pid, "status")?;
        parse_status_paging(&contents).ok_or(PlatformError::Unsupported)
    }
}

fn clock_ticks() -> u64 {
    static TICKS: OnceLock<u64> = OnceLock::new();
    *TICKS.get_or_init(|| {
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks > 0 { ticks as u64 } else { 100 }
    })
}

fn read_proc_file(pid: u32, file: &str) -> Result<String, PlatformError> {
    std::fs::read_to_string(format!("/proc/{pid}/{file}")).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PlatformError::Gone,
        ErrorKind::PermissionDenied => PlatformError::AccessDenied,
        _ => PlatformError::Unsupported,
    })
}

fn parse_stat_times(contents: &str, ticks_per_sec: u64) -> Option<CpuTimes> {
    // comm may contain spaces and parens, so split after the last ')'
    let after_comm = contents.rfind(')')? + 1;
    let fields: Vec<&str> = contents[after_comm..].split_whitespace().collect();
    // state(0) ppid(1) pgrp(2) session(3) tty_nr(4) tpgid(5) flags(6)
    // minflt(7) cminflt(8) majflt(9) cmajflt(10) utime(11) stime(12)
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    Some(CpuTimes {
        user: ticks_to_duration(utime, ticks_per_sec),
        kernel: ticks_to_duration(stime, ticks_per_sec),
    })
}

fn ticks_to_duration(ticks: u64, ticks_per_sec: u64) -> Duration {
    let nanos = u128::from(ticks) * 1_000_000_000 / u128::from(ticks_per_sec.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// `VmData` is the private data segment, the part of the process that can be
/// pushed out to swap. `VmPTE` is kernel page-table memory held on its behalf.
fn parse_status_paging(contents: &str) -> Option<PagingStats> {
    let mut data = None;
    let mut pte = None;
    for line in contents.lines() {
        if let Some(val) = line.strip_prefix("VmData:") {
            data = parse_kb(val);
        } else if let Some(val) = line.strip_prefix("VmPTE:") {
            pte = parse_kb(val);
        }
    }
    Some(PagingStats {
        paged_bytes: data?,
        paged_system_bytes: pte.unwrap_or(0),
    })
}

fn parse_kb(value: &str) -> Option<u64> {
    let kb: u64 = value.split_whitespace().next()?.parse().ok()?;
    Some(kb * 1024)
}
