// Debounced propagation of the search input into the filter pass

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

// A single pending deferred task. Scheduling again cancels whatever was
// pending, so only the last schedule before the delay elapses runs.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    // Must be called from within a tokio runtime
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    // Returns true if a task was still waiting
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

// What the user has typed vs. the term the filter engine sees
pub struct SearchBox {
    input: String,
    committed: Arc<Mutex<String>>,
    commits: Arc<AtomicU64>,
    debouncer: Debouncer,
}

impl SearchBox {
    pub fn new(delay: Duration) -> Self {
        Self {
            input: String::new(),
            committed: Arc::new(Mutex::new(String::new())),
            commits: Arc::new(AtomicU64::new(0)),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();

        let value = self.input.clone();
        let committed = self.committed.clone();
        let commits = self.commits.clone();
        self.debouncer.schedule(move || {
            debug!(term = %value, "search term committed");
            *committed.lock() = value;
            commits.fetch_add(1, Ordering::SeqCst);
        });
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn term(&self) -> String {
        self.committed.lock().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    // Number of propagations that actually reached the filter engine
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const DELAY: Duration = Duration::from_millis(400);

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_after_delay() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(DELAY);

        let h = hits.clone();
        debouncer.schedule(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(399)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_is_last_write_wins() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(DELAY);

        for i in 0..5 {
            let seen = seen.clone();
            debouncer.schedule(move || seen.lock().push(i));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        assert_eq!(*seen.lock(), vec![4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_task() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let mut debouncer = Debouncer::new(DELAY);
            let h = hits.clone();
            debouncer.schedule(move || {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_coalesce_into_one_commit() {
        let mut search = SearchBox::new(DELAY);

        for text in ["c", "ch", "che", "chen", "chennai"] {
            search.set_input(text);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(search.input(), "chennai");
        assert_eq!(search.term(), "");
        assert!(search.is_pending());

        tokio::time::sleep(Duration::from_millis(400)).await;
        tokio::task::yield_now().await;
        assert_eq!(search.term(), "chennai");
        assert_eq!(search.commit_count(), 1);
    }
}
