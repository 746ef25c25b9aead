//! Coalescing refresh triggers.
//!
//! Saves under the repository metadata directory arrive in bursts. Each one
//! only hints that branch state may have changed, so the [`RefreshDebouncer`]
//! waits until no trigger has arrived for the quiet window and then performs a
//! single refresh. Triggers that arrive while a refresh runs start a new window.

use crate::core::sync::StateSynchronizer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Cloneable handle for firing triggers from any thread.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    sender: mpsc::UnboundedSender<()>,
}

impl RefreshTrigger {
    /// Returns false once the debouncer has shut down.
    pub fn fire(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

#[derive(Debug)]
pub struct RefreshDebouncer {
    trigger: RefreshTrigger,
    task: JoinHandle<()>,
}

impl RefreshDebouncer {
    /// Start the debouncing task on the current tokio runtime.
    pub fn spawn(synchronizer: Arc<StateSynchronizer>, window: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(synchronizer, window, receiver));
        Self {
            trigger: RefreshTrigger { sender },
            task,
        }
    }

    pub fn trigger(&self) {
        self.trigger.fire();
    }

    pub fn handle(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

async fn run(
    synchronizer: Arc<StateSynchronizer>,
    window: Duration,
    mut receiver: mpsc::UnboundedReceiver<()>,
) {
    while receiver.recv().await.is_some() {
        let mut deadline = Instant::now() + window;
        let mut closed = false;
        loop {
            tokio::select! {
                received = receiver.recv() => match received {
                    Some(()) => deadline = Instant::now() + window,
                    None => {
                        closed = true;
                        break;
                    }
                },
                () = tokio::time::sleep_until(deadline) => break,
            }
        }

        log::debug!("Quiet window elapsed, refreshing branch state");
        synchronizer.refresh().await;
        if closed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::core::registry::BranchTypeRegistry;
    use crate::core::sync::BranchReader;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingReader {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl BranchReader for CountingReader {
        async fn current_branch_name(&self) -> Result<String> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok("develop".to_string())
        }

        async fn branch_exists(&self, _full_ref_name: &str) -> Result<bool> {
            Ok(false)
        }

        async fn list_branches(&self, _prefix: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn setup() -> (Arc<CountingReader>, Arc<StateSynchronizer>) {
        let reader = Arc::new(CountingReader::default());
        let sync = Arc::new(StateSynchronizer::new(
            Arc::new(BranchTypeRegistry::preset()),
            reader.clone(),
        ));
        (reader, sync)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_triggers_refreshes_once() {
        let (reader, sync) = setup();
        let debouncer = RefreshDebouncer::spawn(sync, Duration::from_millis(100));

        for _ in 0..5 {
            debouncer.trigger();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(reader.refreshes.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(reader.refreshes.load(Ordering::SeqCst), 1);
        debouncer.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_refresh_separately() {
        let (reader, sync) = setup();
        let debouncer = RefreshDebouncer::spawn(sync, Duration::from_millis(50));
        let handle = debouncer.handle();

        assert!(handle.fire());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.fire());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(reader.refreshes.load(Ordering::SeqCst), 2);
        debouncer.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_trigger_no_refresh() {
        let (reader, sync) = setup();
        let debouncer = RefreshDebouncer::spawn(sync, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(reader.refreshes.load(Ordering::SeqCst), 0);
        debouncer.shutdown();
    }
}
