//! Fallback Invoker Module
//!
//! Runs the caller-supplied data source when no cached block is usable.

use std::error::Error;
use std::future::Future;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{CacheError, Result};

/// Boxed error produced by a data source.
pub type BoxError = Box<dyn Error + Send + Sync>;

// == Invoke ==
/// Runs a fallback on its own tokio task and waits for the block it produces.
///
/// Both the closure and the future it returns run on the spawned task, never
/// under a set guard, and a slow producer only suspends the retrieval that
/// asked for it. Errors and panics both surface as `FallbackFailed`, with the
/// original cause as the error source. Dropping the returned future aborts
/// the producer task.
pub async fn invoke<B, F, Fut, E>(fallback: F) -> Result<B>
where
    B: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = std::result::Result<B, E>> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    let mut task = AbortOnDrop(tokio::spawn(async move { fallback().await }));

    match (&mut task.0).await {
        Ok(Ok(block)) => Ok(block),
        Ok(Err(err)) => {
            let err = CacheError::fallback(err);
            warn!("Fallback produced an error: {}", err);
            Err(err)
        }
        Err(join_err) => {
            warn!("Fallback task did not complete: {}", join_err);
            Err(CacheError::fallback(join_err))
        }
    }
}

/// Aborts the producer task when the waiting retrieval is cancelled.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_invoke_success() {
        let block = invoke(|| async { Ok::<_, io::Error>(42u32) }).await.unwrap();
        assert_eq!(block, 42);
    }

    #[tokio::test]
    async fn test_invoke_error_is_chained() {
        let result = invoke(|| async {
            Err::<u32, _>(io::Error::new(io::ErrorKind::ConnectionRefused, "db down"))
        })
        .await;

        let err = result.unwrap_err();
        let source = err.source().expect("cause should be preserved");
        let io_err = source.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_invoke_panic_becomes_fallback_failed() {
        let result = invoke(|| async {
            if true {
                panic!("producer exploded");
            }
            Ok::<u32, io::Error>(0)
        })
        .await;

        assert!(matches!(result, Err(CacheError::FallbackFailed { .. })));
    }

    #[tokio::test]
    async fn test_invoke_closure_panic_becomes_fallback_failed() {
        let result = invoke(|| -> std::future::Ready<std::result::Result<u32, io::Error>> {
            panic!("closure exploded before returning a future")
        })
        .await;

        assert!(matches!(result, Err(CacheError::FallbackFailed { .. })));
    }

    #[tokio::test]
    async fn test_dropping_invoke_aborts_producer() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let pending = invoke(move || async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, io::Error>(1u32)
        });
        let timed_out = tokio::time::timeout(Duration::from_millis(10), pending).await;
        assert!(timed_out.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!finished.load(Ordering::SeqCst), "producer should have been aborted");
    }
}
