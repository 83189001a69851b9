use tokio::task::JoinHandle;
use std::collections::BTreeMap;
use crate::error::{Error, Result};
use tracing::{info, error};

/// Task Supervisor - Owns the per-API worker tasks of one ingestion run
///
/// ## Purpose
/// Tracks every spawned worker by name, collects their results and turns a
/// panicked or aborted worker into an `Error::TaskFailed` instead of losing it.
///
/// ## Usage
/// ```rust,ignore
/// let mut supervisor = TaskSupervisor::new();
///
/// supervisor.spawn("coincap", async move {
///     scheduler.run_one_pass(1_000).await
/// });
///
/// for (name, outcome) in supervisor.join_all().await {
///     // outcome: Result<PassReport>
/// }
/// ```
pub struct TaskSupervisor<T> {
    tasks: BTreeMap<String, JoinHandle<Result<T>>>,
}

impl<T: Send + 'static> TaskSupervisor<T> {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: BTreeMap::new(),
        }
    }

    /// Spawn a new worker and register it under `name`
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = Result<T>> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned worker: {}", name);
        self.tasks.insert(name, handle);
        self
    }

    /// Get count of registered workers
    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every worker, in name order
    pub async fn join_all(&mut self) -> Vec<(String, Result<T>)> {
        let tasks = std::mem::take(&mut self.tasks);
        let names: Vec<String> = tasks.keys().cloned().collect();
        let outcomes = futures_util::future::join_all(
            tasks.into_iter().map(|(name, handle)| async move { Self::settle(&name, handle).await }),
        )
        .await;

        names.into_iter().zip(outcomes).collect()
    }

    async fn settle(name: &str, handle: JoinHandle<Result<T>>) -> Result<T> {
        match handle.await {
            Ok(outcome) => {
                info!("Worker {} completed", name);
                outcome
            }
            Err(e) => {
                error!("Worker {} terminated unexpectedly: {:?}", name, e);
                Err(Error::TaskFailed(format!("Task {} failed: {}", name, e)))
            }
        }
    }
}

impl<T: Send + 'static> Default for TaskSupervisor<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_all_collects_every_outcome() {
        let mut supervisor = TaskSupervisor::new();
        supervisor
            .spawn("ok", async { Ok(7u32) })
            .spawn("err", async { Err(Error::Transport("boom".to_string())) })
            .spawn("panic", async {
                let missing: Option<u32> = None;
                Ok(missing.expect("worker blew up"))
            });
        assert_eq!(supervisor.active_task_count(), 3);

        let outcomes = supervisor.join_all().await;
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], (ref name, Err(Error::Transport(_))) if name == "err"));
        assert!(matches!(outcomes[1], (ref name, Ok(7)) if name == "ok"));
        assert!(matches!(outcomes[2], (ref name, Err(Error::TaskFailed(_))) if name == "panic"));
        assert_eq!(supervisor.active_task_count(), 0);
    }
}
