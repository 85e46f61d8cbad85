use crate::core::world::Entity;
use crate::error::{FogboundError, Result};
use log::{error, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn build_pool(threads: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("fogbound-worker-{}", i))
        .build()?;
    Ok(pool)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
}

impl TaskReport {
    pub fn absorb(&mut self, other: TaskReport) {
        self.submitted += other.submitted;
        self.completed += other.completed;
        self.failed += other.failed;
    }
}

/// Runs one task per agent on the pool and blocks until every task has finished.
///
/// A task that returns an error or panics is logged and counted as failed; it never
/// stops its siblings and never reaches the caller. There is no timeout: a task
/// that hangs stalls the caller.
pub fn await_all<J, F>(pool: &ThreadPool, pass: &str, jobs: Vec<(Entity, J)>, task: F) -> TaskReport
where
    J: Send,
    F: Fn(Entity, J) -> Result<()> + Sync,
{
    let submitted = jobs.len();
    let completed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    {
        let task = &task;
        let completed = &completed;
        let failed = &failed;

        pool.scope(move |scope| {
            for (entity, job) in jobs {
                scope.spawn(move |_| {
                    match catch_unwind(AssertUnwindSafe(|| task(entity, job))) {
                        Ok(Ok(())) => {
                            completed.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(Err(e)) => {
                            warn!("[{}] update for {:?} failed this tick: {}", pass, entity, e);
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(payload) => {
                            let message = payload
                                .downcast_ref::<&str>()
                                .map(|s| s.to_string())
                                .or_else(|| payload.downcast_ref::<String>().cloned())
                                .unwrap_or_else(|| "panicked".to_string());
                            error!("[{}] {}", pass, FogboundError::AgentTask { entity, message });
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });
    }

    TaskReport {
        submitted,
        completed: completed.into_inner(),
        failed: failed.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn failures_do_not_stop_siblings() {
        let pool = build_pool(2).unwrap();
        let touched = AtomicU32::new(0);

        let jobs = (0..6).map(|i| (Entity(i), i)).collect::<Vec<_>>();
        let report = await_all(&pool, "test", jobs, |entity, i| {
            touched.fetch_add(1, Ordering::SeqCst);
            match i {
                1 => Err(FogboundError::AgentTask {
                    entity,
                    message: "boom".to_string(),
                }),
                4 => panic!("worker blew up"),
                _ => Ok(()),
            }
        });

        assert_eq!(touched.load(Ordering::SeqCst), 6);
        assert_eq!(
            report,
            TaskReport {
                submitted: 6,
                completed: 4,
                failed: 2
            }
        );
    }

    #[test]
    fn empty_job_list_returns_immediately() {
        let pool = build_pool(1).unwrap();
        let report = await_all(&pool, "idle", Vec::<(Entity, ())>::new(), |_, _| Ok(()));
        assert_eq!(report, TaskReport::default());
    }
}
