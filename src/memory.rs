//! Process memory reporting for tracing large loads.
//!
//! Enabled by the `memory-report` feature; otherwise every entry point is a
//! no-op so callers need no feature gates of their own.

use std::time::Duration;

#[cfg(feature = "memory-report")]
mod imp {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };
    use std::thread::{self, JoinHandle};

    use sysinfo::{get_current_pid, Pid, ProcessExt, System, SystemExt};

    fn log_usage(sys: &mut System, pid: Pid, label: &str) {
        sys.refresh_process(pid);
        match sys.process(pid) {
            Some(process) => log::info!(
                "[memory] {}: rss={} MB, virtual={} MB",
                label,
                process.memory() / 1024 / 1024,
                process.virtual_memory() / 1024 / 1024
            ),
            None => log::warn!("[memory] {}: process info unavailable", label),
        }
    }

    /// Logs resident and virtual memory on a background thread until
    /// stopped or dropped.
    pub struct MemoryReporter {
        stop_flag: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    }

    impl MemoryReporter {
        /// Start logging memory usage under `label` every `interval`.
        pub fn start(label: impl Into<String>, interval: Duration) -> MemoryReporter {
            let label = label.into();
            let stop_flag = Arc::new(AtomicBool::new(false));
            let stop = stop_flag.clone();
            let handle = thread::Builder::new()
                .name("keyroll-memory".into())
                .spawn(move || {
                    let pid = match get_current_pid() {
                        Ok(pid) => pid,
                        Err(err) => {
                            log::warn!("[memory] {}: no pid ({}), reporter stopped", label, err);
                            return;
                        }
                    };
                    let mut sys = System::new();
                    while !stop.load(Ordering::Relaxed) {
                        log_usage(&mut sys, pid, &label);
                        thread::sleep(interval);
                    }
                })
                .map_err(|err| log::warn!("[memory] reporter thread failed to start: {}", err))
                .ok();

            MemoryReporter { stop_flag, handle }
        }

        /// Stop the reporter and wait for its thread.
        pub fn stop(&mut self) {
            self.stop_flag.store(true, Ordering::Relaxed);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    impl Drop for MemoryReporter {
        fn drop(&mut self) {
            self.stop();
        }
    }

    /// Log current memory usage once.
    pub fn print_memory_usage(label: &str) {
        match get_current_pid() {
            Ok(pid) => log_usage(&mut System::new(), pid, label),
            Err(err) => log::warn!("[memory] {}: no pid ({})", label, err),
        }
    }
}

#[cfg(not(feature = "memory-report"))]
mod imp {
    use super::*;

    /// Stand-in used when `memory-report` is disabled.
    pub struct MemoryReporter;

    impl MemoryReporter {
        pub fn start(_label: impl Into<String>, _interval: Duration) -> MemoryReporter {
            MemoryReporter
        }

        pub fn stop(&mut self) {}
    }

    pub fn print_memory_usage(_label: &str) {}
}

pub use imp::{print_memory_usage, MemoryReporter};
