//! Order-preserving parallel map over a lazy source.
//!
//! Items are pulled from the source in rounds of `workers * chunk_size`,
//! evaluated concurrently on a dedicated rayon pool, and handed back in
//! the order they were pulled. Consumers see a plain sequential iterator.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lazily maps `f` over `source` on a worker pool, yielding results in
/// source order.
///
/// Raising the cancel flag (or dropping the iterator) stops new items from
/// being dispatched. A round that has already started always finishes and
/// its results are still yielded.
pub struct ParallelMap<I, F, V>
where
    I: Iterator,
{
    source: I,
    f: F,
    workers: usize,
    chunk_size: usize,
    cancel: Option<Arc<AtomicBool>>,
    pool: Option<ThreadPool>,
    pool_ready: bool,
    ready: VecDeque<V>,
    exhausted: bool,
}

impl<I, F, V> ParallelMap<I, F, V>
where
    I: Iterator,
    I::Item: Send,
    F: Fn(I::Item) -> V + Sync,
    V: Send,
{
    pub fn new(source: I, f: F) -> Self {
        Self {
            source,
            f,
            workers: 0,
            chunk_size: 1,
            cancel: None,
            pool: None,
            pool_ready: false,
            ready: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Worker thread count, 0 = one per logical CPU.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Items handed to each worker per round, 0 is treated as 1.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Stop dispatching once `flag` is raised.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// True once the cancel flag has been observed raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn ensure_pool(&mut self) {
        if self.pool_ready {
            return;
        }
        self.pool_ready = true;
        match ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("halo-worker-{i}"))
            .build()
        {
            Ok(pool) => self.pool = Some(pool),
            Err(err) => log::warn!("Falling back to the global rayon pool: {err}"),
        }
    }

    fn round_size(&self) -> usize {
        let workers = match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        };
        workers.max(1) * self.chunk_size
    }

    /// Pull and evaluate the next round. Returns false when nothing was
    /// dispatched.
    fn dispatch_round(&mut self) -> bool {
        if self.exhausted || self.is_cancelled() {
            return false;
        }
        self.ensure_pool();

        let round = self.round_size();
        let batch: Vec<I::Item> = self.source.by_ref().take(round).collect();
        if batch.len() < round {
            self.exhausted = true;
        }
        if batch.is_empty() {
            return false;
        }

        let f = &self.f;
        let results: Vec<V> = match &self.pool {
            Some(pool) => pool.install(|| batch.into_par_iter().map(f).collect()),
            None => batch.into_par_iter().map(f).collect(),
        };
        self.ready.extend(results);
        true
    }
}

impl<I, F, V> Iterator for ParallelMap<I, F, V>
where
    I: Iterator,
    I::Item: Send,
    F: Fn(I::Item) -> V + Sync,
    V: Send,
{
    type Item = V;

    fn next(&mut self) -> Option<V> {
        if self.ready.is_empty() && !self.dispatch_round() {
            return None;
        }
        self.ready.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_preserves_order() {
        // Later items finish first, order must still hold
        let out: Vec<u64> = ParallelMap::new(0..200u64, |x| {
            std::thread::sleep(Duration::from_micros((200 - x) * 5));
            x * x
        })
        .workers(4)
        .chunk_size(8)
        .collect();

        let expected: Vec<u64> = (0..200u64).map(|x| x * x).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_source() {
        let out: Vec<i32> = ParallelMap::new(std::iter::empty::<i32>(), |x| x + 1)
            .workers(2)
            .collect();
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_chunk_size_treated_as_one() {
        let out: Vec<i32> = ParallelMap::new(0..10, |x| x * 2)
            .workers(2)
            .chunk_size(0)
            .collect();
        assert_eq!(out, (0..10).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_lazy_pulls() {
        let pulled = AtomicUsize::new(0);
        let source = (0..1000).inspect(|_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        });

        let mut map = ParallelMap::new(source, |x| x).workers(2).chunk_size(3);
        assert_eq!(pulled.load(Ordering::SeqCst), 0);

        assert_eq!(map.next(), Some(0));
        // One round of 2 workers * 3 items
        assert_eq!(pulled.load(Ordering::SeqCst), 6);

        // Early stop: take a few and drop
        let rest: Vec<i32> = map.by_ref().take(7).collect();
        assert_eq!(rest, (1..8).collect::<Vec<_>>());
        drop(map);
        assert_eq!(pulled.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_cancel_stops_dispatch() {
        let flag = Arc::new(AtomicBool::new(false));
        let evaluated = AtomicUsize::new(0);

        let mut map = ParallelMap::new(0..1000, |x| {
            evaluated.fetch_add(1, Ordering::SeqCst);
            x
        })
        .workers(2)
        .chunk_size(5)
        .cancel_flag(flag.clone());

        assert_eq!(map.next(), Some(0));
        flag.store(true, Ordering::SeqCst);

        // The in-flight round still drains in order
        let rest: Vec<i32> = map.by_ref().collect();
        assert_eq!(rest, (1..10).collect::<Vec<_>>());
        assert!(map.is_cancelled());
        assert_eq!(evaluated.load(Ordering::SeqCst), 10);
    }
}
