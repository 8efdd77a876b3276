//! Deadline helper.

use std::future::Future;

use tokio::time::Instant;

use crate::error::BridgeError;

/// Run `future` until the absolute `deadline`.
///
/// On expiry the error carries how long this call waited, not the whole
/// budget the deadline was derived from.
pub async fn with_deadline<T>(
    deadline: Instant,
    future: impl Future<Output = Result<T, BridgeError>>,
) -> Result<T, BridgeError> {
    let started = Instant::now();
    match tokio::time::timeout_at(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(BridgeError::Timeout(started.elapsed().as_millis() as u64)),
    }
}
