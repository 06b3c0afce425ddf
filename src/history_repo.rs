// In-memory history buffer: fixed capacity, one lock, oldest samples evicted first.

use crate::models::Sample;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Canonical retrieval order, fixed for the life of the repo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Append at the back, evict from the front. `all()` is oldest-first.
    #[default]
    OldestFirst,
    /// Insert at the front, truncate the back. `all()` is newest-first.
    NewestFirst,
}

/// Result of a single append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    /// Index of the new sample in canonical order.
    pub position: usize,
    /// Number of samples stored after the append.
    pub stored: usize,
    /// An older sample was dropped to stay within capacity.
    pub evicted: bool,
}

pub struct HistoryRepo {
    samples: Mutex<VecDeque<Sample>>,
    capacity: usize,
    order: HistoryOrder,
}

impl HistoryRepo {
    pub fn new(capacity: usize, order: HistoryOrder) -> anyhow::Result<Self> {
        anyhow::ensure!(capacity > 0, "history capacity must be > 0");
        Ok(Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            order,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn order(&self) -> HistoryOrder {
        self.order
    }

    // Every mutation leaves the deque within capacity before returning, so a
    // poisoned lock still guards a consistent buffer.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Sample>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, sample: Sample) -> Appended {
        let mut samples = self.lock();
        let evicted = samples.len() >= self.capacity;
        let position = match self.order {
            HistoryOrder::OldestFirst => {
                if evicted {
                    samples.pop_front();
                }
                samples.push_back(sample);
                samples.len() - 1
            }
            HistoryOrder::NewestFirst => {
                samples.push_front(sample);
                samples.truncate(self.capacity);
                0
            }
        };
        Appended {
            position,
            stored: samples.len(),
            evicted,
        }
    }

    /// Most recently appended sample, or `None` when empty.
    pub fn latest(&self) -> Option<Sample> {
        let samples = self.lock();
        match self.order {
            HistoryOrder::OldestFirst => samples.back().cloned(),
            HistoryOrder::NewestFirst => samples.front().cloned(),
        }
    }

    /// Snapshot of every stored sample in canonical order.
    pub fn all(&self) -> Vec<Sample> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
