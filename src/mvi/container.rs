use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ScreenConfig;

/// Pure mapping from a screen's internal state to what the UI renders.
pub type Projection<VS, S> = Arc<dyn Fn(&VS) -> S + Send + Sync>;

#[derive(Debug, Default)]
struct Sharing {
    observers: usize,
    /// When the last observer detached, if none is attached now
    idle_since: Option<Instant>,
}

impl Sharing {
    fn is_publishing(&self, stop_timeout: Duration) -> bool {
        self.observers > 0
            || self
                .idle_since
                .is_some_and(|since| since.elapsed() < stop_timeout)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds one screen's internal state, publishes its UI projection and queues
/// one-shot effects.
///
/// The UI state is shared lazily. It is republished on every update while an
/// observer is attached and for `stop_timeout` after the last one detaches.
/// After that, updates only touch the internal state until a new observer
/// subscribes, at which point the projection is derived afresh.
///
/// Effects go through a bounded queue. Sending never waits; an effect that
/// does not fit is dropped. Each effect is taken by exactly one consumer.
pub struct StateContainer<VS, S, E> {
    state: Mutex<VS>,
    project: Projection<VS, S>,
    ui: watch::Sender<S>,
    sharing: Arc<Mutex<Sharing>>,
    stop_timeout: Duration,
    effects_tx: mpsc::Sender<E>,
    effects_rx: tokio::sync::Mutex<mpsc::Receiver<E>>,
}

impl<VS, S, E> StateContainer<VS, S, E>
where
    VS: Default,
    S: Clone,
{
    pub fn new(initial: VS, project: Projection<VS, S>, config: &ScreenConfig) -> Self {
        let (ui, _) = watch::channel(project(&initial));
        let (effects_tx, effects_rx) = mpsc::channel(config.effect_capacity.max(1));

        Self {
            state: Mutex::new(initial),
            project,
            ui,
            sharing: Arc::new(Mutex::new(Sharing::default())),
            stop_timeout: config.stop_timeout(),
            effects_tx,
            effects_rx: tokio::sync::Mutex::new(effects_rx),
        }
    }

    /// Apply a transform to the internal state and publish the new projection.
    pub fn update(&self, transform: impl FnOnce(VS) -> VS) {
        let mut state = lock(&self.state);
        let old = mem::take(&mut *state);
        *state = transform(old);

        if lock(&self.sharing).is_publishing(self.stop_timeout) {
            self.ui.send_replace((self.project)(&state));
        }
    }

    /// Read a value out of the internal state.
    pub fn with_state<R>(&self, read: impl FnOnce(&VS) -> R) -> R {
        read(&lock(&self.state))
    }

    /// The projection of the current internal state, whether or not it is
    /// being published.
    pub fn ui_state(&self) -> S {
        (self.project)(&lock(&self.state))
    }

    /// Attach an observer to the published UI state.
    pub fn subscribe(&self) -> UiStateObserver<S> {
        let state = lock(&self.state);
        let mut sharing = lock(&self.sharing);

        if !sharing.is_publishing(self.stop_timeout) {
            debug!("Resuming UI state publication");
            self.ui.send_replace((self.project)(&state));
        }
        sharing.observers += 1;
        sharing.idle_since = None;

        UiStateObserver {
            receiver: self.ui.subscribe(),
            sharing: self.sharing.clone(),
        }
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.sharing).observers
    }

    /// Queue a one-shot effect without waiting.
    pub fn send_effect(&self, effect: E) {
        match self.effects_tx.try_send(effect) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Effect queue full, dropping effect");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Effect queue closed, dropping effect");
            }
        }
    }

    /// Wait for the next effect. Concurrent callers each receive different
    /// effects.
    pub async fn next_effect(&self) -> Option<E> {
        self.effects_rx.lock().await.recv().await
    }

    pub fn try_next_effect(&self) -> Option<E> {
        self.effects_rx.try_lock().ok()?.try_recv().ok()
    }
}

/// A live subscription to a screen's UI state. Dropping it detaches the
/// observer.
pub struct UiStateObserver<S> {
    receiver: watch::Receiver<S>,
    sharing: Arc<Mutex<Sharing>>,
}

impl<S: Clone> UiStateObserver<S> {
    /// Latest published UI state.
    pub fn current(&self) -> S {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publication. Returns `None` once the screen is gone.
    pub async fn changed(&mut self) -> Option<S> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&S) -> bool) -> Option<S> {
        let state = self.receiver.wait_for(|s| predicate(s)).await.ok()?;
        Some(S::clone(&state))
    }
}

impl<S> Drop for UiStateObserver<S> {
    fn drop(&mut self) {
        let mut sharing = lock(&self.sharing);
        sharing.observers = sharing.observers.saturating_sub(1);
        if sharing.observers == 0 {
            sharing.idle_since = Some(Instant::now());
        }
    }
}
