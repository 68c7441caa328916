//! Timeout utilities for page operations
//!
//! A timed-out page open is reported as an ordinary error so the scheduler
//! records it as a failed visit and moves on.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Wrap an async page operation with an explicit timeout
///
/// # Returns
/// * `Ok(T)` - Operation completed successfully
/// * `Err` - Either the operation failed or the timeout was reached
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {:.1} seconds",
            timeout.as_secs_f64()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_result() {
        let value = with_page_timeout(async { Ok(7) }, Duration::from_secs(1), "noop").await;
        assert_eq!(value.ok(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let result: Result<()> = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            Duration::from_secs(2),
            "page load",
        )
        .await;

        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert_eq!(err, "page load timeout after 2.0 seconds");
    }
}
