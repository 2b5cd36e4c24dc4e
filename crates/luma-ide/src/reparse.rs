//! Background reparse pipeline.
//!
//! Every edit hands a snapshot of the whole document to a worker pool. Workers
//! parse it, extract fold regions and send the result back over a channel.
//! The thread owning the sinks drains that channel and applies results, so
//! sink state is only ever touched from one place.
//!
//! Each submission gets a sequence number that only grows for a document. A
//! result older than what the sink already shows is dropped, so the last
//! submitted text wins no matter in which order workers finish.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZero;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::outline::{OutlineEntry, outline};
use crate::{FoldRegion, fold_regions};

/// Deeply nested input recurses deeply in the parser.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReparseConfig {
    /// Worker threads in the pool.
    pub threads: usize,
    /// Skip cycles already superseded by a newer submission when a worker
    /// picks them up.
    pub coalesce: bool,
}

impl Default for ReparseConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism().map_or(1, NonZero::get);
        Self { threads, coalesce: true }
    }
}

/// Receives the results of a reparse cycle for one document.
pub trait FoldSink {
    /// Replaces all regions. `text` is the snapshot the offsets refer to.
    fn update_foldings(&mut self, text: &Arc<str>, regions: &[FoldRegion]);

    /// Replaces all outline entries.
    fn update_outline(&mut self, entries: &[OutlineEntry]);
}

/// Lookup of the sink for a document.
pub trait Sinks<K> {
    type Sink: FoldSink;

    fn sink_mut(&mut self, document: &K) -> Option<&mut Self::Sink>;
}

impl<K: Eq + Hash, S: FoldSink> Sinks<K> for HashMap<K, S> {
    type Sink = S;

    fn sink_mut(&mut self, document: &K) -> Option<&mut S> {
        self.get_mut(document)
    }
}

/// Result of one cycle, sent from a worker back to the owner of the sinks.
#[derive(Debug, Clone)]
pub struct FoldUpdate<K> {
    pub document: K,
    pub sequence: u64,
    pub text: Arc<str>,
    pub regions: Vec<FoldRegion>,
}

struct DocumentState {
    /// Newest submitted sequence, shared with workers for coalescing.
    latest: Arc<AtomicU64>,
    /// Newest sequence handed to the sink.
    applied: u64,
}

pub struct Reparser<K> {
    config: ReparseConfig,
    pool: threadpool::ThreadPool,
    sender: Sender<FoldUpdate<K>>,
    receiver: Receiver<FoldUpdate<K>>,
    documents: HashMap<K, DocumentState>,
    next_sequence: u64,
    cycle: fn(&str) -> Vec<FoldRegion>,
}

impl<K> Reparser<K>
where
    K: Clone + Eq + Hash + Send + Debug + 'static,
{
    pub fn new(config: ReparseConfig) -> Self {
        Self::with_cycle(config, fold_regions)
    }

    fn with_cycle(config: ReparseConfig, cycle: fn(&str) -> Vec<FoldRegion>) -> Self {
        let pool = threadpool::Builder::new()
            .num_threads(config.threads.max(1))
            .thread_name("reparse".to_owned())
            .thread_stack_size(WORKER_STACK_SIZE)
            .build();
        let (sender, receiver) = crossbeam_channel::unbounded();

        Self {
            config,
            pool,
            sender,
            receiver,
            documents: HashMap::new(),
            next_sequence: 0,
            cycle,
        }
    }

    pub fn config(&self) -> &ReparseConfig {
        &self.config
    }

    /// Channel the finished cycles arrive on, for use in `select!`.
    pub fn receiver(&self) -> &Receiver<FoldUpdate<K>> {
        &self.receiver
    }

    /// Queues a reparse of `text` and returns at once with its sequence number.
    pub fn schedule(&mut self, document: K, text: impl Into<Arc<str>>) -> u64 {
        let text = text.into();
        let start = self.next_sequence;
        self.next_sequence += 1;
        let sequence = self.next_sequence;

        // A new (or reopened) document ignores everything submitted before it.
        let state = self.documents.entry(document.clone()).or_insert_with(|| DocumentState {
            latest: Arc::new(AtomicU64::new(start)),
            applied: start,
        });
        state.latest.store(sequence, Ordering::Release);

        let latest = Arc::clone(&state.latest);
        let sender = self.sender.clone();
        let coalesce = self.config.coalesce;
        let cycle = self.cycle;

        tracing::debug!(?document, sequence, len = text.len(), "scheduling reparse");
        self.pool.execute(move || {
            if coalesce && latest.load(Ordering::Acquire) != sequence {
                tracing::trace!(?document, sequence, "skipping superseded reparse");
                return;
            }

            let regions = match panic::catch_unwind(AssertUnwindSafe(|| cycle(&text))) {
                Ok(regions) => regions,
                Err(_) => {
                    tracing::error!(?document, sequence, "reparse cycle panicked");
                    Vec::new()
                }
            };

            // The receiver lives as long as the reparser; a failed send means
            // it is shutting down.
            let _ = sender.send(FoldUpdate { document, sequence, text, regions });
        });

        sequence
    }

    /// Drops the state of a closed document. Late results for it are ignored.
    pub fn forget(&mut self, document: &K) {
        self.documents.remove(document);
    }

    /// Applies `update` to its sink unless it is stale. Returns whether the
    /// sink was updated.
    pub fn apply<S: Sinks<K>>(&mut self, update: FoldUpdate<K>, sinks: &mut S) -> bool {
        let Some(state) = self.documents.get_mut(&update.document) else {
            tracing::trace!(document = ?update.document, "dropping result for a closed document");
            return false;
        };

        if update.sequence <= state.applied {
            tracing::trace!(
                document = ?update.document,
                sequence = update.sequence,
                applied = state.applied,
                "dropping stale result"
            );
            return false;
        }

        let Some(sink) = sinks.sink_mut(&update.document) else {
            return false;
        };

        state.applied = update.sequence;
        sink.update_foldings(&update.text, &update.regions);
        sink.update_outline(&outline(&update.regions));

        tracing::debug!(
            document = ?update.document,
            sequence = update.sequence,
            regions = update.regions.len(),
            "applied reparse"
        );
        true
    }

    /// Applies only the newest of `updates` for each document.
    pub fn apply_batch<S: Sinks<K>>(
        &mut self,
        updates: impl IntoIterator<Item = FoldUpdate<K>>,
        sinks: &mut S,
    ) -> usize {
        let mut newest: HashMap<K, FoldUpdate<K>> = HashMap::new();
        for update in updates {
            match newest.get(&update.document) {
                Some(kept) if kept.sequence >= update.sequence => {}
                _ => {
                    newest.insert(update.document.clone(), update);
                }
            }
        }

        newest
            .into_values()
            .fold(0, |applied, update| applied + usize::from(self.apply(update, sinks)))
    }

    /// Applies every result received so far, newest per document.
    pub fn drain<S: Sinks<K>>(&mut self, sinks: &mut S) -> usize {
        let pending: Vec<_> = self.receiver.try_iter().collect();
        self.apply_batch(pending, sinks)
    }

    /// Blocks until every queued cycle has finished.
    pub fn wait(&self) {
        self.pool.join();
    }
}
