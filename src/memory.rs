//! Peak resident memory sampling.

use std::thread::{self, JoinHandle};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::sync::broadcast::{self, error::RecvError};

use logsniff_analyze::AnalysisProgress;

/// Samples this process's resident memory on every progress update.
///
/// The sampler runs until the progress channel closes, that is until the
/// analyzer is dropped.
pub struct MemoryMonitor {
    handle: JoinHandle<Option<u64>>,
}

impl MemoryMonitor {
    /// Start sampling on a background thread.
    pub fn watch(mut rx: broadcast::Receiver<AnalysisProgress>) -> Self {
        let handle = thread::spawn(move || {
            let pid = sysinfo::get_current_pid().ok()?;
            let mut sampler = Sampler::new(pid);
            sampler.sample();
            loop {
                match rx.blocking_recv() {
                    Ok(_) | Err(RecvError::Lagged(_)) => sampler.sample(),
                    Err(RecvError::Closed) => break,
                }
            }
            sampler.sample();
            sampler.peak
        });
        Self { handle }
    }

    /// Wait for the sampler and return the highest resident size seen, in bytes.
    pub fn finish(self) -> Option<u64> {
        self.handle.join().ok().flatten()
    }
}

struct Sampler {
    system: System,
    pid: Pid,
    peak: Option<u64>,
}

impl Sampler {
    fn new(pid: Pid) -> Self {
        Self {
            system: System::new(),
            pid,
            peak: None,
        }
    }

    fn sample(&mut self) {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        if let Some(rss) = self.system.process(self.pid).map(|p| p.memory()) {
            self.peak = Some(self.peak.map_or(rss, |peak| peak.max(rss)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_stops_when_channel_closes() {
        let (tx, rx) = broadcast::channel(4);
        let monitor = MemoryMonitor::watch(rx);

        tx.send(AnalysisProgress::new(1)).unwrap();
        drop(tx);

        let peak = monitor.finish();
        assert!(peak.is_some_and(|bytes| bytes > 0));
    }
}
