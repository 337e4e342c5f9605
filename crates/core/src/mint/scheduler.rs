//! Named, cancelable background tasks.
//!
//! The batch poll and the delayed refreshes that follow wizard actions run as
//! `ScheduledTask`s owned by a `Scheduler`. Dropping a task aborts it, so a
//! task never outlives its owner.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// A spawned timer-driven task.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `work` once after `delay`.
    pub fn after<F>(name: &'static str, delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(task = name, "Scheduled task firing");
            work.await;
        });
        Self { name, handle }
    }

    /// Run `work` every `period`, first run one period from now.
    ///
    /// A slow run delays the next tick instead of causing a burst.
    pub fn every<F, Fut>(name: &'static str, period: Duration, mut work: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!(task = name, "Periodic task firing");
                work().await;
            }
        });
        Self { name, handle }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Owns every task scheduled on behalf of one orchestrator.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a task. Finished tasks are pruned on the way.
    pub fn schedule(&self, task: ScheduledTask) {
        let mut tasks = self.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }

    /// Names of tasks that have not completed yet.
    pub fn active(&self) -> Vec<&'static str> {
        self.lock()
            .iter()
            .filter(|t| !t.is_finished())
            .map(ScheduledTask::name)
            .collect()
    }

    /// Abort and forget every task.
    pub fn cancel_all(&self) {
        let tasks: Vec<ScheduledTask> = self.lock().drain(..).collect();
        for task in &tasks {
            debug!(task = task.name(), "Cancelling scheduled task");
            task.cancel();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ScheduledTask>> {
        // A poisoned list is still a valid list.
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}
