//! Bounded worker pool shared by the quick-hash and full-hash stages.
//!
//! Shape of one stage:
//!
//! ```text
//!   jobs ──▶ [input queue] ──▶ worker 1..N ──▶ [output queue] ──▶ aggregate (caller thread)
//! ```
//!
//! The input queue is filled and closed before any worker starts. N workers
//! run on a dedicated rayon pool of exactly N threads and pull until the queue
//! is empty or shutdown is requested. Each worker owns a clone of the output
//! sender; the output queue disconnects when the last worker exits, which ends
//! the aggregation loop. `run_pool` therefore returns only after every worker
//! has terminated and every result has been aggregated: a full barrier.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::unbounded;

use super::FinderError;

/// What happened to a stage's work queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolOutcome {
    /// Jobs handed to a worker.
    pub dispatched: usize,
    /// Jobs left in the queue because shutdown was requested.
    pub abandoned: usize,
    /// Whether the shutdown flag was observed.
    pub interrupted: bool,
}

fn is_set(flag: Option<&AtomicBool>) -> bool {
    flag.is_some_and(|f| f.load(Ordering::SeqCst))
}

/// Run `work` over `jobs` on `workers` threads, feeding every produced
/// result to `aggregate` on the calling thread.
///
/// `work` returns `None` for jobs that produce no result (for example a file
/// that could not be read); the job is still counted as dispatched.
///
/// # Errors
///
/// Returns [`FinderError::InvalidWorkerCount`] for zero workers and
/// [`FinderError::ThreadPool`] if the pool threads cannot be spawned.
pub fn run_pool<T, R, F, A>(
    jobs: Vec<T>,
    workers: usize,
    shutdown: Option<&AtomicBool>,
    work: F,
    mut aggregate: A,
) -> Result<PoolOutcome, FinderError>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Option<R> + Sync,
    A: FnMut(R),
{
    if workers == 0 {
        return Err(FinderError::InvalidWorkerCount);
    }

    let total = jobs.len();
    if total == 0 {
        return Ok(PoolOutcome::default());
    }

    let (job_tx, job_rx) = unbounded::<T>();
    for job in jobs {
        // The receiver is alive in this scope, so send cannot fail.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("dupescout-worker-{i}"))
        .build()?;

    let (result_tx, result_rx) = unbounded::<R>();
    let work = &work;
    let aggregate = &mut aggregate;
    let queue = &job_rx;

    pool.in_place_scope(move |scope| {
        for worker_id in 0..workers {
            let jobs = queue.clone();
            let results = result_tx.clone();
            scope.spawn(move |_| {
                let mut handled = 0usize;
                loop {
                    if is_set(shutdown) {
                        log::debug!("Worker {worker_id}: shutdown requested, stopping");
                        break;
                    }
                    let Ok(job) = jobs.recv() else { break };
                    handled += 1;
                    if let Some(result) = work(job) {
                        if results.send(result).is_err() {
                            break;
                        }
                    }
                }
                log::trace!("Worker {worker_id} exiting after {handled} jobs");
            });
        }

        // Only worker-held senders remain; the loop ends when all workers exit.
        drop(result_tx);
        for result in result_rx.iter() {
            aggregate(result);
        }
    });

    let abandoned = job_rx.len();
    Ok(PoolOutcome {
        dispatched: total - abandoned,
        abandoned,
        interrupted: is_set(shutdown),
    })
}
