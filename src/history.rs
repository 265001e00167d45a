// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The rolling window of recent batches that makes up the visible
//! frame.  Older batches fade out linearly and are evicted first.

use std::collections::VecDeque;

use crate::planes::Point;

/// The points produced by one engine pass.  Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch(Vec<Point>);

impl Batch {
    /// The points, in the order the engine produced them.
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a batch with no points.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Point>> for Batch {
    fn from(points: Vec<Point>) -> Self {
        Batch(points)
    }
}

/// Where one batch sits inside a flattened frame, and how strongly to
/// draw it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Layer {
    /// Index of the batch's first point in the flattened points.
    pub offset: usize,
    /// Number of points in the batch.
    pub len: usize,
    /// Opacity in (0, 1].
    pub opacity: f32,
}

/// A FIFO of at most `max(depth, 1)` batches.  A depth of zero keeps
/// only the newest batch.
#[derive(Clone, Debug)]
pub struct FrameHistory {
    depth: usize,
    batches: VecDeque<Batch>,
}

impl FrameHistory {
    /// An empty history retaining `depth` batches.
    pub fn new(depth: usize) -> Self {
        FrameHistory {
            depth,
            batches: VecDeque::with_capacity(depth.max(1) + 1),
        }
    }

    /// The configured depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The most batches this history will hold at once.
    pub fn capacity(&self) -> usize {
        self.depth.max(1)
    }

    /// Number of retained batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True when nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Appends `batch` as the newest entry and evicts the oldest
    /// entries beyond capacity.
    pub fn push(&mut self, batch: Batch) {
        if self.depth == 0 {
            self.batches.clear();
        }
        self.batches.push_back(batch);
        while self.batches.len() > self.capacity() {
            self.batches.pop_front();
        }
    }

    /// Drops every batch.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Retained batches, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }

    /// Total number of retained points.
    pub fn point_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// Concatenates the retained batches, oldest first.
    pub fn flatten(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.point_count());
        for batch in &self.batches {
            points.extend_from_slice(batch.points());
        }
        points
    }

    /// One layer per retained batch, oldest first, matching the layout
    /// of `flatten`.  The newest batch gets `opacity`; a batch `age`
    /// frames older gets `opacity * (depth - age) / depth`.
    pub fn layers(&self, opacity: f32) -> Vec<Layer> {
        let depth = self.capacity() as f32;
        let newest = self.batches.len().saturating_sub(1);
        let mut offset = 0;
        self.batches
            .iter()
            .enumerate()
            .map(|(i, batch)| {
                let age = (newest - i) as f32;
                let layer = Layer {
                    offset,
                    len: batch.len(),
                    opacity: opacity * ((depth - age) / depth),
                };
                offset += batch.len();
                layer
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(tag: f64, n: usize) -> Batch {
        Batch::from(vec![Point(tag, tag); n])
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = FrameHistory::new(3);
        for i in 0..5 {
            history.push(batch(i as f64, 2));
            assert!(history.len() <= 3);
        }
        let tags: Vec<f64> = history.iter().map(|b| b.points()[0].0).collect();
        assert_eq!(tags, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn depth_zero_keeps_only_the_newest() {
        let mut history = FrameHistory::new(0);
        assert_eq!(history.depth(), 0);
        assert_eq!(history.capacity(), 1);
        for i in 0..4 {
            history.push(batch(i as f64, 3));
            assert_eq!(history.len(), 1);
            assert_eq!(history.flatten(), vec![Point(i as f64, i as f64); 3]);
        }
    }

    #[test]
    fn flatten_is_oldest_first() {
        let mut history = FrameHistory::new(2);
        history.push(Batch::from(vec![Point(1.0, 0.0)]));
        history.push(Batch::from(vec![Point(2.0, 0.0), Point(3.0, 0.0)]));
        assert_eq!(
            history.flatten(),
            vec![Point(1.0, 0.0), Point(2.0, 0.0), Point(3.0, 0.0)]
        );
        assert_eq!(history.point_count(), 3);
    }

    #[test]
    fn layers_fade_linearly_with_age() {
        let mut history = FrameHistory::new(4);
        for i in 0..4 {
            history.push(batch(i as f64, 10));
        }
        let layers = history.layers(0.4);
        let opacities: Vec<f32> = layers.iter().map(|l| l.opacity).collect();
        let expected = [0.1, 0.2, 0.3, 0.4];
        for (got, want) in opacities.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "{} != {}", got, want);
        }
        let offsets: Vec<usize> = layers.iter().map(|l| l.offset).collect();
        assert_eq!(offsets, vec![0, 10, 20, 30]);
    }

    #[test]
    fn a_partly_filled_history_starts_at_full_opacity() {
        let mut history = FrameHistory::new(10);
        history.push(batch(0.0, 1));
        assert_eq!(history.layers(0.3), vec![Layer { offset: 0, len: 1, opacity: 0.3 }]);
    }

    #[test]
    fn clear_empties() {
        let mut history = FrameHistory::new(2);
        history.push(batch(0.0, 1));
        history.clear();
        assert!(history.is_empty());
        assert!(history.flatten().is_empty());
        assert!(history.layers(1.0).is_empty());
    }
}
