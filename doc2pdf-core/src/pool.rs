//! Bounded fan-out of blocking per-file work.
//!
//! Every call builds its own bound (a fresh semaphore) and drains its own
//! `JoinSet` before returning, so no pool outlives the batch it served. Each
//! item runs on tokio's blocking pool; a panic inside the per-item function is
//! caught at the task boundary and recorded as `false` for that item only.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{spawn_blocking, JoinSet};
use tracing::{error, info};

/// Per-path outcome of a batch. One key per distinct input path.
pub type ProcessingResult = HashMap<PathBuf, bool>;

pub fn success_count(results: &ProcessingResult) -> usize {
    results.values().filter(|ok| **ok).count()
}

/// Map a configured worker count to a usable pool size: `<= 0` means one
/// worker per available CPU. Counts beyond `usize` saturate; `run_parallel`
/// clamps to the batch size anyway.
pub fn resolve_max_workers(configured: i64) -> usize {
    if configured <= 0 {
        num_cpus::get().max(1)
    } else {
        usize::try_from(configured).unwrap_or(usize::MAX)
    }
}

/// Run `f` over `items` with at most `max_workers` running at once.
/// Results arrive in completion order; permits are handed out in submission
/// order, so a pool of one runs items in order.
///
/// `None` means one worker per CPU, the same as a configured `max_workers`
/// of `0`. Callers holding [`ConversionSettings`](crate::config::ConversionSettings)
/// pass `Some(resolve_max_workers(settings.max_workers))`.
pub async fn run_parallel<F>(items: Vec<PathBuf>, f: F, max_workers: Option<usize>) -> ProcessingResult
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    let items = unique(items);
    let total = items.len();
    let mut results: ProcessingResult = items.iter().map(|item| (item.clone(), false)).collect();
    if total == 0 {
        return results;
    }

    let workers = max_workers
        .unwrap_or_else(num_cpus::get)
        .min(total)
        .min(Semaphore::MAX_PERMITS)
        .max(1);
    info!(workers, total, "Starting parallel processing");

    let f = Arc::new(f);
    let semaphore = Arc::new(Semaphore::new(workers));
    let completed = Arc::new(AtomicUsize::new(0));
    let mut tasks = JoinSet::new();

    for item in items {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            error!(path = %item.display(), "Worker pool closed before item could be scheduled");
            continue;
        };
        let f = Arc::clone(&f);
        let completed = Arc::clone(&completed);
        tasks.spawn(async move {
            let ok = run_one(f, item.clone(), &completed, total).await;
            drop(permit);
            (item, ok)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((item, ok)) => {
                results.insert(item, ok);
            }
            Err(e) => error!(error = %e, "Worker task aborted"),
        }
    }

    results
}

/// Same contract as [`run_parallel`], one item at a time in submission order.
pub async fn run_sequential<F>(items: Vec<PathBuf>, f: F) -> ProcessingResult
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    let items = unique(items);
    let total = items.len();
    let f = Arc::new(f);
    let completed = AtomicUsize::new(0);

    let mut results = ProcessingResult::with_capacity(total);
    for item in items {
        let ok = run_one(Arc::clone(&f), item.clone(), &completed, total).await;
        results.insert(item, ok);
    }
    results
}

async fn run_one<F>(f: Arc<F>, item: PathBuf, completed: &AtomicUsize, total: usize) -> bool
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    let name = display_name(&item);
    let outcome = spawn_blocking(move || f(&item)).await;
    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
    match outcome {
        Ok(ok) => {
            info!(file = %name, success = ok, "({done}/{total}) Processed: {name}");
            ok
        }
        Err(e) => {
            error!(file = %name, error = %e, "({done}/{total}) Error processing {name}");
            false
        }
    }
}

fn unique(items: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
