//! Bounded-concurrency batch executor.
//!
//! `min(limit, tasks)` workers pull task indices from a shared queue and run
//! them cooperatively on the caller's task. A failing task is logged and its
//! slot dropped; successful results keep submission order.

use std::collections::VecDeque;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::future::join_all;

/// Run `tasks` with at most `limit` in flight and flatten the successful results.
///
/// `limit` is clamped to at least one. An empty task list returns immediately.
pub async fn run_bounded<T, E, F, Fut>(tasks: Vec<F>, limit: usize) -> Vec<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    E: Display,
{
    let total = tasks.len();
    if total == 0 {
        return Vec::new();
    }

    let workers = limit.max(1).min(total);
    let queue: Mutex<VecDeque<(usize, F)>> = Mutex::new(tasks.into_iter().enumerate().collect());

    let worker_runs = (0..workers).map(|worker| {
        let queue = &queue;
        async move {
            let mut completed = Vec::new();
            loop {
                let next = {
                    let mut pending = queue.lock().unwrap_or_else(PoisonError::into_inner);
                    pending.pop_front()
                };
                let Some((index, task)) = next else {
                    break;
                };

                match task().await {
                    Ok(results) => completed.push((index, results)),
                    Err(error) => {
                        tracing::warn!(worker, task = index, %error, "batch task failed; dropping its results");
                    }
                }
            }
            completed
        }
    });

    let mut slots: Vec<(usize, Vec<T>)> = join_all(worker_runs).await.into_iter().flatten().collect();
    slots.sort_by_key(|(index, _)| *index);
    slots.into_iter().flat_map(|(_, results)| results).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn preserves_submission_order() {
        let tasks: Vec<_> = (0..10u64)
            .map(|i| {
                move || async move {
                    // Later tasks finish first.
                    tokio::time::sleep(Duration::from_millis(20 - i * 2)).await;
                    Ok::<_, String>(vec![i])
                }
            })
            .collect();

        let results = run_bounded(tasks, 3).await;
        assert_eq!(results, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn failing_task_is_omitted() {
        let tasks: Vec<_> = (0..10u32)
            .map(|i| {
                move || async move {
                    if i == 4 {
                        Err(String::from("boom"))
                    } else {
                        Ok(vec![i])
                    }
                }
            })
            .collect();

        let results = run_bounded(tasks, 3).await;
        assert_eq!(results, vec![0, 1, 2, 3, 5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn never_exceeds_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..12usize)
            .map(|i| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                move || async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(vec![i])
                }
            })
            .collect();

        let results = run_bounded(tasks, 3).await;
        assert_eq!(results.len(), 12);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn limit_above_task_count_runs_everything_at_once() {
        let peak = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4usize)
            .map(|i| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                move || async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(vec![i, i])
                }
            })
            .collect();

        let results = run_bounded(tasks, 64).await;
        assert_eq!(results, vec![0, 0, 1, 1, 2, 2, 3, 3]);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn empty_task_list_returns_immediately() {
        let tasks: Vec<fn() -> std::future::Ready<Result<Vec<u8>, String>>> = Vec::new();
        assert!(run_bounded(tasks, 3).await.is_empty());
    }

    #[tokio::test]
    async fn zero_limit_is_treated_as_one() {
        let tasks: Vec<_> = (0..3u8)
            .map(|i| move || async move { Ok::<_, String>(vec![i]) })
            .collect();
        assert_eq!(run_bounded(tasks, 0).await, vec![0, 1, 2]);
    }
}
