use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use tracing::{debug, error, warn};

use crate::{
    decode::{frame::FrameDecoder, quantize::QuantizedImage},
    foundation::{
        core::WorkItem,
        error::{ConvertError, ConvertResult},
    },
    pipeline::slots::{FrameResult, SlotTable},
    progress::{ProgressObserver, Stage},
};

/// Fixed work queue, closed before any worker starts: once empty it stays empty.
struct WorkQueue<'a> {
    items: &'a [WorkItem],
    cursor: AtomicUsize,
}

impl<'a> WorkQueue<'a> {
    fn new(items: &'a [WorkItem]) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next item. Every item is handed out exactly once.
    fn try_dequeue(&self) -> Option<&'a WorkItem> {
        // Relaxed: claims only need atomicity; the scope join orders slot writes before reads.
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i)
    }
}

/// Decode every item with up to `concurrency` workers and return the filled slot table.
///
/// The pool never holds more workers than items: extra workers would only find the queue
/// empty and exit.
///
/// Blocks until all workers have drained the queue and exited. Per-item failures (including
/// decoder panics) are stored in the item's slot; they never stop sibling workers.
pub fn run_pool(
    items: &[WorkItem],
    concurrency: usize,
    decoder: &dyn FrameDecoder,
    progress: &dyn ProgressObserver,
) -> ConvertResult<SlotTable> {
    if concurrency == 0 {
        return Err(ConvertError::config("concurrency must be >= 1"));
    }
    for (pos, item) in items.iter().enumerate() {
        if item.index != pos {
            return Err(ConvertError::internal(format!(
                "work item at position {pos} carries index {}",
                item.index
            )));
        }
    }

    let slots = SlotTable::with_len(items.len());
    let queue = WorkQueue::new(items);
    let completed = AtomicUsize::new(0);
    let workers = concurrency.min(items.len()).max(1);
    let pool = build_thread_pool(workers)?;

    debug!(
        items = items.len(),
        requested = concurrency,
        workers,
        "starting decode pool"
    );
    progress.start(Stage::Decode, items.len());
    {
        let (slots, queue, completed) = (&slots, &queue, &completed);
        pool.scope(|s| {
            for worker in 0..workers {
                s.spawn(move |_| worker_loop(worker, queue, slots, decoder, progress, completed));
            }
        });
    }
    progress.finish(Stage::Decode);

    debug!(filled = slots.filled(), "decode pool drained");
    Ok(slots)
}

fn worker_loop(
    worker: usize,
    queue: &WorkQueue<'_>,
    slots: &SlotTable,
    decoder: &dyn FrameDecoder,
    progress: &dyn ProgressObserver,
    completed: &AtomicUsize,
) {
    let mut processed = 0usize;
    while let Some(item) = queue.try_dequeue() {
        let outcome = decode_isolated(decoder, &item.path);
        if let Err(e) = &outcome {
            warn!(
                worker,
                index = item.index,
                path = %item.path.display(),
                error = %e,
                "frame decode failed"
            );
        }

        let result = FrameResult {
            index: item.index,
            path: item.path.clone(),
            outcome,
        };
        if let Err(e) = slots.fill(result) {
            error!(worker, index = item.index, error = %e, "slot write rejected");
        }

        processed += 1;
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        progress.advance(Stage::Decode, done);
    }
    debug!(worker, processed, "worker exiting, queue empty");
}

fn decode_isolated(decoder: &dyn FrameDecoder, path: &Path) -> ConvertResult<QuantizedImage> {
    match panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(path))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(ConvertError::WorkerPanic {
            path: path.to_path_buf(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn build_thread_pool(threads: usize) -> ConvertResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("pics-to-gif-decode-{i}"))
        .build()
        .map_err(|e| ConvertError::internal(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/pool.rs"]
mod tests;
