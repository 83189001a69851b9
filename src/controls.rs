use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Cooperative stop flag shared by every scheduler of one ingestion run.
///
/// Schedulers check it between polls, so a poll that is already in flight
/// finishes and is persisted before the pass returns. Waits that are not
/// polls, such as rate-limit sleeps, race against `triggered()`.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    halted: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.halted.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();
        tracing::warn!("Ingestion HALTED");
    }

    pub fn reset(&self) {
        self.halted.store(false, Ordering::SeqCst);
        tracing::info!("Ingestion RESUMED");
    }

    pub fn is_triggered(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Resolves once the signal fires, immediately if it already has.
    pub async fn triggered(&self) {
        loop {
            let notified = self.wake.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}
