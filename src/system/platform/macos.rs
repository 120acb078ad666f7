use std::sync::OnceLock;
use std::time::Duration;

use libproc::libproc::proc_pid::pidinfo;
use libproc::libproc::task_info::TaskInfo;

use super::{CpuTimes, PagingStats, PlatformError, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn process_cpu_times(pid: u32) -> Result<CpuTimes, PlatformError> {
        // sysinfo has already seen the pid, so a failure here is a permissions problem
        let info = pidinfo::<TaskInfo>(pid as i32, 0).map_err(|_| PlatformError::AccessDenied)?;
        let (numer, denom) = timebase();
        Ok(CpuTimes {
            user: ticks_to_duration(info.pti_total_user, numer, denom),
            kernel: ticks_to_duration(info.pti_total_system, numer, denom),
        })
    }

    fn process_paging(_pid: u32) -> Result<PagingStats, PlatformError> {
        // macOS doesn't expose pageable quota counters per process
        Err(PlatformError::Unsupported)
    }
}

/// Task times are Mach absolute-time ticks: 1:1 with ns on Intel, not on Apple Silicon.
fn timebase() -> (u32, u32) {
    static TIMEBASE: OnceLock<(u32, u32)> = OnceLock::new();
    *TIMEBASE.get_or_init(|| {
        let mut info = libc::mach_timebase_info { numer: 0, denom: 0 };
        #[allow(deprecated)]
        let rc = unsafe { libc::mach_timebase_info(&mut info) };
        if rc == 0 && info.denom != 0 {
            (info.numer, info.denom)
        } else {
            (1, 1)
        }
    })
}

fn ticks_to_duration(ticks: u64, numer: u32, denom: u32) -> Duration {
    let nanos = u128::from(ticks) * u128::from(numer) / u128::from(denom.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
