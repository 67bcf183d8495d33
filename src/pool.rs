//! Worker pools for the parallel phases.

use crate::error::Result;

/// A bounded set of worker threads that runs one phase of the load.
#[cfg(feature = "parallel")]
pub(crate) struct WorkerPool {
    pool: rayon::ThreadPool,
}

#[cfg(feature = "parallel")]
impl WorkerPool {
    /// Build a pool of `threads` workers, or rayon's default when `None`.
    pub(crate) fn new(threads: Option<usize>, name: &'static str) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(move |i| format!("keyroll-{}-{}", name, i))
            .build()?;
        log::debug!("{} pool started with {} threads", name, pool.current_num_threads());
        Ok(Self { pool })
    }

    #[inline]
    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

/// Sequential stand-in used when the `parallel` feature is disabled.
#[cfg(not(feature = "parallel"))]
pub(crate) struct WorkerPool;

#[cfg(not(feature = "parallel"))]
impl WorkerPool {
    pub(crate) fn new(_threads: Option<usize>, _name: &'static str) -> Result<Self> {
        Ok(WorkerPool)
    }

    #[inline]
    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        op()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_runs_closure() {
        let pool = WorkerPool::new(Some(2), "test").unwrap();
        assert_eq!(pool.install(|| 40 + 2), 42);
    }
}
