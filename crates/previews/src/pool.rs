//! Fixed-size worker pool.
//!
//! Items are drawn from a shared queue by a bounded set of worker
//! tasks; results are collected in completion order. The pool always
//! runs every dispatched item to completion — callers isolate per-item
//! failures by returning them as values.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

/// Run `handler` over `items` on `pool_size` concurrent worker tasks.
///
/// The handler receives the id of the worker executing it, which stays
/// in `0..pool_size`. Results arrive in completion order, not
/// submission order.
pub async fn dispatch<I, T, F, Fut>(items: Vec<I>, pool_size: usize, handler: F) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(usize, I) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    if items.is_empty() {
        return Vec::new();
    }

    let pool_size = pool_size.clamp(1, items.len());

    // Capacity covers every item, so feeding the queue never blocks.
    let (job_tx, job_rx) = mpsc::channel::<I>(items.len());
    for item in items {
        if job_tx.send(item).await.is_err() {
            break;
        }
    }
    drop(job_tx);

    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<T>(pool_size);

    let mut workers = Vec::with_capacity(pool_size);
    for worker_id in 0..pool_size {
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        let handler = handler.clone();

        workers.push(tokio::spawn(async move {
            loop {
                // Hold the queue lock only for the dequeue, never while
                // the handler runs.
                let item = { job_rx.lock().await.recv().await };
                let Some(item) = item else { break };

                let result = handler(worker_id, item).await;
                if result_tx.send(result).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    let mut results = Vec::new();
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }

    for worker in workers {
        let _ = worker.await;
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn every_item_is_processed_for_any_pool_size() {
        let items: Vec<u64> = (0..10).collect();

        for pool_size in [1, 2, 3, 8, 16] {
            let mut results = dispatch(items.clone(), pool_size, |_, item| async move {
                sleep(Duration::from_millis(item % 3)).await;
                item
            })
            .await;

            results.sort_unstable();
            assert_eq!(results, items, "pool_size {pool_size}");
        }
    }

    #[tokio::test]
    async fn worker_ids_stay_within_bounds() {
        let pool_size = 4;
        let results = dispatch((0..32).collect::<Vec<u32>>(), pool_size, |worker_id, _| async move {
            worker_id
        })
        .await;

        assert_eq!(results.len(), 32);
        assert!(results.into_iter().all(|id| id < pool_size));
    }

    #[tokio::test]
    async fn results_arrive_in_completion_order() {
        let results = dispatch(vec![80u64, 5], 2, |_, delay_ms| async move {
            sleep(Duration::from_millis(delay_ms)).await;
            delay_ms
        })
        .await;

        assert_eq!(results, vec![5, 80]);
    }

    #[tokio::test]
    async fn failures_pass_through_as_values() {
        let results = dispatch((0..6).collect::<Vec<u32>>(), 3, |_, item| async move {
            if item % 2 == 0 { Ok(item) } else { Err("odd") }
        })
        .await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 3);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let results = dispatch(Vec::<u32>::new(), 8, |_, item| async move { item }).await;
        assert!(results.is_empty());
    }
}
