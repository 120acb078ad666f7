use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: Duration,
    pub kernel: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PagingStats {
    pub paged_bytes: u64,
    pub paged_system_bytes: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformError {
    /// The counter is not available here; callers fall back.
    Unsupported,
    AccessDenied,
    /// The process exited between lookup and the platform query.
    Gone,
}

pub trait PlatformExtensions {
    fn process_cpu_times(pid: u32) -> Result<CpuTimes, PlatformError>;
    fn process_paging(pid: u32) -> Result<PagingStats, PlatformError>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn process_cpu_times(pid: u32) -> Result<CpuTimes, PlatformError> {
    platform_impl::Platform::process_cpu_times(pid)
}

pub fn process_paging(pid: u32) -> Result<PagingStats, PlatformError> {
    platform_impl::Platform::process_paging(pid)
}
