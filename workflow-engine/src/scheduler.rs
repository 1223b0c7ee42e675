//! The shared task-execution pool backing `execution = POOL` actions.
//!
//! `tokio`'s multi-thread runtime already work-steals across its worker
//! threads; what the interpreter needs on top is *bounded* concurrency so
//! a runaway fan-out of POOL actions doesn't starve the runtime, the same
//! shape the teacher bounds its own HTTP fan-out with in `Pipeline::run`
//! and `audit_actions` (an `Arc<Semaphore>` gating in-flight work).

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::error::WorkflowError;

/// A process-wide, cloneable handle to the actor system's task pool.
#[derive(Clone)]
pub struct Scheduler {
    permits: Arc<Semaphore>,
}

impl Scheduler {
    /// `max_concurrency` bounds how many POOL-mode actions may be
    /// in flight at once across every interpreter sharing this scheduler.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Submits `task` to the pool and awaits its completion, mapping a
    /// cancelled/panicked join into `WorkflowError::Interrupted` per
    /// spec.md §5 ("the Interpreter reports failure with 'Action
    /// interrupted'").
    pub async fn submit<F, T>(&self, task: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| WorkflowError::Interrupted)?;

        let handle = tokio::spawn(async move {
            let result = task.await;
            drop(permit);
            result
        });

        handle.await.map_err(join_err_to_interrupted)
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

fn join_err_to_interrupted(_e: JoinError) -> WorkflowError {
    WorkflowError::Interrupted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_returns_task_output() {
        let sched = Scheduler::new(4);
        let result = sched.submit(async { 2 + 2 }).await.unwrap();
        assert_eq!(result, 4);
    }

    #[tokio::test]
    async fn submit_respects_bound() {
        let sched = Scheduler::new(2);
        assert_eq!(sched.available_permits(), 2);
        let handle = sched.submit(async { 1 }).await.unwrap();
        assert_eq!(handle, 1);
    }

    #[tokio::test]
    async fn scheduler_is_cloneable_and_shared() {
        let sched = Scheduler::new(1);
        let sched2 = sched.clone();
        let a = sched.submit(async { "a" });
        let b = sched2.submit(async { "b" });
        let (ra, rb) = tokio::join!(a, b);
        assert_eq!(ra.unwrap(), "a");
        assert_eq!(rb.unwrap(), "b");
    }

    #[tokio::test]
    async fn submit_propagates_panic_as_interrupted() {
        let sched = Scheduler::new(1);
        let result = sched
            .submit(async {
                panic!("boom");
                #[allow(unreachable_code)]
                ()
            })
            .await;
        assert!(matches!(result, Err(WorkflowError::Interrupted)));
    }

    #[tokio::test]
    async fn new_clamps_zero_to_one() {
        let sched = Scheduler::new(0);
        assert_eq!(sched.available_permits(), 1);
    }
}
