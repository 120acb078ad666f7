use std::time::Duration;

use windows_sys::Win32::{
    Foundation::{
        CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, FILETIME, GetLastError, HANDLE,
    },
    System::ProcessStatus::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS},
    System::Threading::{GetProcessTimes, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION},
};

use super::{CpuTimes, PagingStats, PlatformError, PlatformExtensions};

pub struct Platform;

struct ProcessHandle(HANDLE);

impl ProcessHandle {
    fn open(pid: u32) -> Result<Self, PlatformError> {
        let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
        if handle.is_null() {
            let err = unsafe { GetLastError() };
            return Err(match err {
                ERROR_ACCESS_DENIED => PlatformError::AccessDenied,
                ERROR_INVALID_PARAMETER => PlatformError::Gone,
                _ => PlatformError::Unsupported,
            });
        }
        Ok(Self(handle))
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe { CloseHandle(self.0) };
    }
}

// FILETIME durations count 100-nanosecond intervals.
fn filetime_to_duration(ft: FILETIME) -> Duration {
    let ticks = (u64::from(ft.dwHighDateTime) << 32) | u64::from(ft.dwLowDateTime);
    Duration::from_nanos(ticks.saturating_mul(100))
}

impl PlatformExtensions for Platform {
    fn process_cpu_times(pid: u32) -> Result<CpuTimes, PlatformError> {
        let handle = ProcessHandle::open(pid)?;
        unsafe {
            let mut creation = std::mem::zeroed::<FILETIME>();
            let mut exit = std::mem::zeroed::<FILETIME>();
            let mut kernel = std::mem::zeroed::<FILETIME>();
            let mut user = std::mem::zeroed::<FILETIME>();
            let ok = GetProcessTimes(handle.0, &mut creation, &mut exit, &mut kernel, &mut user);
            if ok == 0 {
                return Err(PlatformError::Unsupported);
            }
            Ok(CpuTimes {
                user: filetime_to_duration(user),
                kernel: filetime_to_duration(kernel),
            })
        }
    }

    fn process_paging(pid: u32) -> Result<PagingStats, PlatformError> {
        let handle = ProcessHandle::open(pid)?;
        unsafe {
            let mut counters = std::mem::zeroed::<PROCESS_MEMORY_COUNTERS>();
            let size = std::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
            counters.cb = size;
            if GetProcessMemoryInfo(handle.0, &mut counters, size) == 0 {
                return Err(PlatformError::Unsupported);
            }
            Ok(PagingStats {
                paged_bytes: counters.PagefileUsage as u64,
                paged_system_bytes: counters.QuotaPagedPoolUsage as u64,
            })
        }
    }
}
