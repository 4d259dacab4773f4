//! Process resource sampling via sysinfo

use crate::trace::ResourceSnapshot;
use sysinfo::{ProcessesToUpdate, System};

/// Samples CPU and memory usage of the current process.
///
/// Sampling never fails: when the process cannot be inspected the snapshot
/// is all zeros, matching the empty-stats contract of the collector.
pub struct ResourceSampler {
    system: System,
}

impl ResourceSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    pub fn sample(&mut self) -> ResourceSnapshot {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return ResourceSnapshot::default();
        };
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        match self.system.process(pid) {
            Some(process) => ResourceSnapshot {
                cpu_percent: process.cpu_usage(),
                memory_mb: process.memory() as f64 / (1024.0 * 1024.0),
            },
            None => ResourceSnapshot::default(),
        }
    }
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_the_current_process_reports_memory() {
        let mut sampler = ResourceSampler::new();
        let snapshot = sampler.sample();
        // The test process itself uses memory.
        assert!(snapshot.memory_mb > 0.0);
    }
}
