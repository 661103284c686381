//! Per-screen state machines built on [`StateContainer`].
//!
//! Each screen owns the tasks it spawns. Dropping the screen aborts all of
//! them, which also abandons any summary stream still in flight.

pub mod home;
pub mod search;
pub mod viewer;

pub use home::{HomeEffect, HomeIntent, HomeScreen, HomeUiState};
pub use search::{SearchEffect, SearchIntent, SearchScreen, SearchUiState};
pub use viewer::{ViewerEffect, ViewerIntent, ViewerScreen, ViewerUiState};

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use tokio::task::{AbortHandle, JoinSet};
use tracing::error;

use crate::app::NewsflowError;
use crate::mvi::StateContainer;
use crate::repository::SummaryStream;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Background work of one screen instance.
#[derive(Default)]
pub(crate) struct TaskGroup {
    tasks: Mutex<JoinSet<()>>,
}

impl TaskGroup {
    pub fn spawn<F>(&self, task: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = lock(&self.tasks);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task)
    }

    pub fn abort_all(&self) {
        lock(&self.tasks).abort_all();
    }
}

/// A single replaceable task, such as the current summary stream.
#[derive(Default)]
pub(crate) struct TaskSlot {
    handle: Mutex<Option<AbortHandle>>,
}

impl TaskSlot {
    /// Store `handle`, aborting whatever task held the slot before.
    pub fn replace(&self, handle: AbortHandle) {
        if let Some(previous) = lock(&self.handle).replace(handle) {
            previous.abort();
        }
    }

    pub fn abort(&self) {
        if let Some(handle) = lock(&self.handle).take() {
            handle.abort();
        }
    }
}

/// Screen state that shows a summary as it streams in.
pub(crate) trait SummaryState: Sized {
    fn start_summary(self) -> Self;
    fn append_summary(self, fragment: &str) -> Self;
    fn finish_summary(self) -> Self;
}

/// Fold a summary stream into screen state.
///
/// The caller marks the state as summarizing before spawning this. Fragments
/// are appended as they arrive; the flag is cleared once at the end and a
/// failure becomes a one-shot effect instead of a state change.
pub(crate) async fn collect_summary<VS, S, E>(
    container: &StateContainer<VS, S, E>,
    mut stream: SummaryStream,
    on_error: impl FnOnce(NewsflowError) -> E,
) where
    VS: SummaryState + Default,
    S: Clone,
{
    let mut failure = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => container.update(|s| s.append_summary(&fragment)),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    container.update(VS::finish_summary);
    if let Some(e) = failure {
        error!("Failed to summarize article: {}", e);
        container.send_effect(on_error(e));
    }
}
