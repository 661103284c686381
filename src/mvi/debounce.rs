use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// Drive a debounce pipeline over a stream of values.
///
/// Consecutive duplicates are ignored. Every distinct value is passed to
/// `on_input` straight away and restarts a quiet period of `window`; when the
/// window expires without a newer value, the pending value goes to
/// `on_settled`. A value superseded inside the window never settles.
///
/// Returns once the sending side is dropped.
pub async fn debounce<T, I, S>(
    mut input: watch::Receiver<T>,
    window: Duration,
    mut on_input: I,
    mut on_settled: S,
) where
    T: Clone + PartialEq,
    I: FnMut(&T),
    S: FnMut(T),
{
    let mut last: Option<T> = None;
    let mut pending: Option<(T, Instant)> = None;

    loop {
        let armed = pending.is_some();
        let deadline = pending
            .as_ref()
            .map_or_else(Instant::now, |(_, deadline)| *deadline);

        tokio::select! {
            changed = input.changed() => {
                if changed.is_err() {
                    return;
                }
                let value = input.borrow_and_update().clone();
                if last.as_ref() == Some(&value) {
                    continue;
                }
                last = Some(value.clone());
                on_input(&value);
                pending = Some((value, Instant::now() + window));
            }
            _ = sleep_until(deadline), if armed => {
                if let Some((value, _)) = pending.take() {
                    on_settled(value);
                }
            }
        }
    }
}
