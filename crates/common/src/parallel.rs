//! First-error fan-out for independent async tasks.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};

/// Run independent futures concurrently and stop at the first failure.
///
/// All futures are polled concurrently in no particular order. As soon as
/// one of them resolves to an error, that error is returned and the
/// remaining futures are dropped. Dropping only stops local work: a request
/// that has already been sent may still complete on the remote side, so
/// callers must not assume the failed batch left no side effects.
///
/// # Arguments
/// * `futures` - Independent units of work
///
/// # Returns
/// `Ok(())` if every future succeeded, otherwise the first error observed.
pub async fn run_first_err<I, F, E>(futures: I) -> Result<(), E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<(), E>>,
{
    let mut pending: FuturesUnordered<F> = futures.into_iter().collect();
    while let Some(result) = pending.next().await {
        result?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_first_err_all_ok() {
        let counter: AtomicUsize = AtomicUsize::new(0);
        let counter_ref: &AtomicUsize = &counter;
        let futures = (0..5).map(move |_| async move {
            counter_ref.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });

        run_first_err(futures).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_run_first_err_empty() {
        let futures: Vec<std::future::Ready<Result<(), String>>> = Vec::new();
        assert!(run_first_err(futures).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_first_err_returns_first_failure() {
        let futures = (0..3u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(10 * (3 - i))).await;
            if i == 0 {
                Ok(())
            } else {
                Err(format!("task {} failed", i))
            }
        });

        // Task 2 sleeps the least, so it fails first.
        let err: String = run_first_err(futures).await.unwrap_err();
        assert_eq!(err, "task 2 failed");
    }
}
