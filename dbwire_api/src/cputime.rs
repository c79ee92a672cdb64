//! Process CPU time, used to split a call's wall-clock time into network
//! latency and local processing.

use std::time::{Duration, Instant};

/// User plus system CPU time of this process and its reaped children.
#[cfg(unix)]
pub fn cpu_time() -> Duration {
    use nix::sys::resource::UsageWho;

    rusage(UsageWho::RUSAGE_SELF) + rusage(UsageWho::RUSAGE_CHILDREN)
}

#[cfg(not(unix))]
pub fn cpu_time() -> Duration {
    Duration::ZERO
}

#[cfg(unix)]
fn rusage(who: nix::sys::resource::UsageWho) -> Duration {
    match nix::sys::resource::getrusage(who) {
        Ok(usage) => timeval(usage.user_time()) + timeval(usage.system_time()),
        Err(e) => {
            tracing::warn!("getrusage failed: {}", e);
            Duration::ZERO
        }
    }
}

#[cfg(unix)]
fn timeval(tv: nix::sys::time::TimeVal) -> Duration {
    Duration::from_secs(tv.tv_sec().max(0) as u64)
        + Duration::from_micros(tv.tv_usec().max(0) as u64)
}

/// Wall clock and CPU readings taken when a call starts.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    started: Instant,
    cpu_at_start: Duration,
}

impl Timing {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            cpu_at_start: cpu_time(),
        }
    }

    /// Returns `(network_latency, local_processing)`: the wall-clock time
    /// since `start` not spent on CPU (never negative), then the CPU time
    /// spent since `start`.
    pub fn finish(&self) -> (Duration, Duration) {
        let wall = self.started.elapsed();
        let cpu = cpu_time().saturating_sub(self.cpu_at_start);
        (wall.saturating_sub(cpu), cpu)
    }
}
