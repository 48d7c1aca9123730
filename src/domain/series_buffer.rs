// Bounded live chart series
use super::telemetry::SeriesPoint;
use std::collections::VecDeque;

/// 24h at one-minute resolution.
pub const DEFAULT_CAPACITY: usize = 1440;

/// Time-ascending, label-deduplicated series with FIFO eviction.
///
/// Ordering is trusted from the producer; the buffer never re-sorts.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    capacity: usize,
    points: VecDeque<SeriesPoint>,
}

impl SeriesBuffer {
    /// Capacity is floored at one point; settings reject zero before this.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    /// Install `points` in place of the current contents, keeping the newest
    /// `capacity` entries. Adjacent points sharing a label keep the first one.
    pub fn replace(&mut self, points: impl IntoIterator<Item = SeriesPoint>) {
        self.points.clear();
        for point in points {
            if self.points.back().is_some_and(|last| last.label == point.label) {
                continue;
            }
            self.points.push_back(point);
            if self.points.len() > self.capacity {
                self.points.pop_front();
            }
        }
    }

    /// Append unless `point` falls in the same label bucket as the last point.
    /// Returns whether the point was appended.
    pub fn append_if_new(&mut self, point: SeriesPoint) -> bool {
        if self.points.back().is_some_and(|last| last.label == point.label) {
            return false;
        }

        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
        true
    }
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
