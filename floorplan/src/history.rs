//! Snapshot ring buffer for undo/redo.

use std::collections::VecDeque;

use crate::Scene;

/// Deep copies of the scene taken after each successful mutation.
///
/// `cursor` points at the snapshot matching the live scene. Recording drops
/// anything after the cursor, skips a snapshot equal to the current one and
/// evicts the oldest entry past `depth`.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<Scene>,
    cursor: usize,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        History { snapshots: VecDeque::new(), cursor: 0, depth: depth.max(1) }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Change the depth, evicting the oldest snapshots first and the redo
    /// tail only when the current snapshot is the oldest one left.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth.max(1);
        while self.snapshots.len() > self.depth {
            if self.cursor > 0 {
                self.snapshots.pop_front();
                self.cursor -= 1;
            } else {
                self.snapshots.pop_back();
            }
        }
    }

    /// Returns false when the snapshot equals the current entry and was skipped.
    pub fn record(&mut self, scene: &Scene) -> bool {
        if let Some(cur) = self.snapshots.get(self.cursor) {
            if cur.content_eq(scene) {
                return false;
            }
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push_back(scene.clone());
        while self.snapshots.len() > self.depth {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Snapshot preceding the current one.
    pub fn undo(&mut self) -> Option<Scene> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor).cloned()
    }

    pub fn redo(&mut self) -> Option<Scene> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor).cloned()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, Shape};

    fn with_shapes(n: usize) -> Scene {
        let mut s = Scene::new();
        for i in 0..n {
            s.add_shape(Shape::rectangle(Point::new(i as f64, 0.0), 1.0, 1.0)).unwrap();
        }
        s
    }

    #[test]
    fn dedups_identical_snapshots() {
        let mut h = History::new(8);
        let s = with_shapes(1);
        assert!(h.record(&s));
        assert!(!h.record(&s.clone()));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn evicts_oldest_past_depth() {
        let mut h = History::new(3);
        for n in 0..5 {
            h.record(&with_shapes(n));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.undo().unwrap().shape_count(), 3);
        assert_eq!(h.undo().unwrap().shape_count(), 2);
        assert!(h.undo().is_none());
    }

    #[test]
    fn shrinking_depth_keeps_the_current_snapshot() {
        let mut h = History::new(8);
        for n in 0..5 {
            h.record(&with_shapes(n));
        }
        h.undo();
        h.undo();
        h.set_depth(2);
        assert_eq!(h.len(), 2);
        assert_eq!(h.depth(), 2);
        assert!(h.can_redo());
        assert_eq!(h.undo().unwrap().shape_count(), 1);
        assert!(h.undo().is_none());
    }

    #[test]
    fn record_after_undo_drops_redo_tail() {
        let mut h = History::new(8);
        for n in 0..3 {
            h.record(&with_shapes(n));
        }
        h.undo();
        assert!(h.can_redo());
        h.record(&with_shapes(7));
        assert!(!h.can_redo());
        assert_eq!(h.len(), 3);
    }
}
