//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the backend call with a deadline
//! - Cancel the operation cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - On expiry the inner future is dropped, which tears down its connection
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

/// Returned when the deadline elapsed before the operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` with a deadline. The future is dropped if the deadline passes.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}
