use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Wait out whatever is left of `minimum` since `started`.
///
/// Call this after an operation finishes and before publishing its terminal
/// state, so a loading indicator never flashes for less than `minimum`.
pub async fn ensure_minimum_loading_time(started: Instant, minimum: Duration) {
    sleep_until(started + minimum).await;
}
