use image::RgbaImage;

/// Cap on retained past snapshots. Snapshots are full-buffer copies, so
/// history memory scales with canvas area times depth; beyond the cap the
/// oldest snapshot after the baseline is evicted.
pub const MAX_SNAPSHOTS: usize = 64;

/// Full-buffer snapshot stacks for undo/redo.
///
/// The past stack always keeps its first entry, the empty-canvas baseline
/// recorded right after the map is created, so undoing everything lands on
/// a blank map instead of running out of history.
#[derive(Debug, Clone, Default)]
pub struct SnapshotHistory {
    past: Vec<RgbaImage>,
    future: Vec<RgbaImage>,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a pre-mutation copy of the buffer onto the past stack.
    pub fn record(&mut self, snapshot: RgbaImage) {
        self.push_past(snapshot);
    }

    /// Redo history is invalidated once a new divergent edit occurs.
    pub fn clear_future(&mut self) {
        self.future.clear();
    }

    /// Exchanges `current` for the most recent past snapshot, remembering
    /// `current` on the future stack. Returns `None` when there is nothing
    /// to undo; the baseline snapshot is peeked, never popped.
    pub fn undo(&mut self, current: RgbaImage) -> Option<RgbaImage> {
        if self.past.is_empty() {
            return None;
        }
        self.future.push(current);
        if self.past.len() == 1 {
            Some(self.past[0].clone())
        } else {
            self.past.pop()
        }
    }

    /// Exchanges `current` for the most recent future snapshot, remembering
    /// `current` on the past stack. Returns `None` when there is nothing to
    /// redo.
    pub fn redo(&mut self, current: RgbaImage) -> Option<RgbaImage> {
        let snapshot = self.future.pop()?;
        self.push_past(current);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.past.len()
    }

    pub fn future_depth(&self) -> usize {
        self.future.len()
    }

    fn push_past(&mut self, snapshot: RgbaImage) {
        self.past.push(snapshot);
        if self.past.len() > MAX_SNAPSHOTS {
            // Evict the oldest undoable state; index 0 is the baseline.
            self.past.remove(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(shade: u8) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]))
    }

    #[test]
    fn test_undo_on_empty_history_is_a_noop() {
        let mut history = SnapshotHistory::new();
        assert_eq!(history.undo(snapshot(1)), None);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_baseline_is_peeked_not_popped() {
        let mut history = SnapshotHistory::new();
        history.record(snapshot(0));
        assert_eq!(history.undo(snapshot(1)), Some(snapshot(0)));
        assert_eq!(history.depth(), 1);
        // Undoing again still restores the baseline.
        assert_eq!(history.undo(snapshot(0)), Some(snapshot(0)));
        assert_eq!(history.depth(), 1);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = SnapshotHistory::new();
        history.record(snapshot(0));
        history.record(snapshot(1));
        let restored = history.undo(snapshot(2)).unwrap();
        assert_eq!(restored, snapshot(1));
        let redone = history.redo(restored).unwrap();
        assert_eq!(redone, snapshot(2));
        assert_eq!(history.depth(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_eviction_keeps_the_baseline() {
        let mut history = SnapshotHistory::new();
        history.record(snapshot(0));
        for index in 0..MAX_SNAPSHOTS + 10 {
            history.record(snapshot((index % 200) as u8 + 1));
        }
        assert_eq!(history.depth(), MAX_SNAPSHOTS);
        // Unwind everything: the final restore must be the baseline.
        let mut last = snapshot(255);
        while history.depth() > 1 {
            last = history.undo(last).unwrap();
        }
        assert_eq!(history.undo(last), Some(snapshot(0)));
    }
}
