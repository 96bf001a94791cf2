use std::collections::VecDeque;
use sysgraph_core::state::{HistorySnapshot, MetricSample};

/// Fixed-length sliding window of samples — one per graph.
///
/// The window starts full of `T::default()` and every push evicts the oldest
/// element, so its length never changes after construction.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    samples:  VecDeque<T>,
    capacity: usize,
}

impl<T: Clone + Default> RollingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let mut samples = VecDeque::with_capacity(capacity);
        samples.resize(capacity, T::default());
        Self { samples, capacity }
    }

    /// Append the newest sample, evicting the oldest.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        self.samples.pop_front();
        self.samples.push_back(value);
    }

    /// Owned copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.samples.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One rolling buffer per plotted metric.
#[derive(Debug, Clone)]
pub struct History {
    pub cpu:        RollingBuffer<MetricSample>,
    pub memory:     RollingBuffer<MetricSample>,
    pub disk_read:  RollingBuffer<MetricSample>,
    pub disk_write: RollingBuffer<MetricSample>,
    pub net_read:   RollingBuffer<MetricSample>,
    pub net_write:  RollingBuffer<MetricSample>,
}

/// The samples produced by one tick, one per buffer in [`History`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickSamples {
    pub cpu:        MetricSample,
    pub memory:     MetricSample,
    pub disk_read:  MetricSample,
    pub disk_write: MetricSample,
    pub net_read:   MetricSample,
    pub net_write:  MetricSample,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            cpu:        RollingBuffer::new(capacity),
            memory:     RollingBuffer::new(capacity),
            disk_read:  RollingBuffer::new(capacity),
            disk_write: RollingBuffer::new(capacity),
            net_read:   RollingBuffer::new(capacity),
            net_write:  RollingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, samples: TickSamples) {
        self.cpu.push(samples.cpu);
        self.memory.push(samples.memory);
        self.disk_read.push(samples.disk_read);
        self.disk_write.push(samples.disk_write);
        self.net_read.push(samples.net_read);
        self.net_write.push(samples.net_write);
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            cpu:        self.cpu.snapshot(),
            memory:     self.memory.snapshot(),
            disk_read:  self.disk_read.snapshot(),
            disk_write: self.disk_write.snapshot(),
            net_read:   self.net_read.snapshot(),
            net_write:  self.net_write.snapshot(),
        }
    }
}
