use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;

/// Seconds a door takes to slide fully open.
pub const DOOR_SLIDE_TIME: f32 = 1.0;

/// Where a single door is in its closed → sliding → open life.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DoorPhase {
    Closed,
    /// Slide progress in `[0, 1)`.
    Sliding(f32),
    Open,
}

/// Runtime door state keyed by linear cell index.
///
/// Not persisted: a reload resets every door to closed.
#[derive(Clone, Debug, Default)]
pub struct DoorState {
    sliding: BTreeMap<usize, f32>,
    open: BTreeSet<usize>,
}

impl DoorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start sliding door `idx`. No-op (returns `false`) if it is already
    /// moving or open.
    pub fn open(&mut self, idx: usize) -> bool {
        if self.sliding.contains_key(&idx) || self.open.contains(&idx) {
            return false;
        }
        self.sliding.insert(idx, 0.0);
        true
    }

    /// Advance every sliding door by `dt` seconds and return the indices that
    /// became fully open during this step.
    pub fn advance(&mut self, dt: f32) -> SmallVec<[usize; 4]> {
        let mut finished = SmallVec::new();
        self.sliding.retain(|&idx, progress| {
            *progress += dt / DOOR_SLIDE_TIME;
            if *progress >= 1.0 {
                finished.push(idx);
                false
            } else {
                true
            }
        });
        self.open.extend(finished.iter().copied());
        finished
    }

    #[inline]
    pub fn is_moving(&self, idx: usize) -> bool {
        self.sliding.contains_key(&idx)
    }

    #[inline]
    pub fn is_open(&self, idx: usize) -> bool {
        self.open.contains(&idx)
    }

    /// Slide progress if the door is moving.
    #[inline]
    pub fn progress(&self, idx: usize) -> Option<f32> {
        self.sliding.get(&idx).copied()
    }

    pub fn phase(&self, idx: usize) -> DoorPhase {
        if let Some(p) = self.progress(idx) {
            DoorPhase::Sliding(p)
        } else if self.is_open(idx) {
            DoorPhase::Open
        } else {
            DoorPhase::Closed
        }
    }

    pub fn sliding_count(&self) -> usize {
        self.sliding.len()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Every door back to closed.
    pub fn clear(&mut self) {
        self.sliding.clear();
        self.open.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_is_idempotent() {
        let mut d = DoorState::new();
        assert!(d.open(4));
        assert!(!d.open(4));
        assert_eq!(d.phase(4), DoorPhase::Sliding(0.0));
        d.advance(1.5);
        assert!(!d.open(4), "open doors cannot restart");
        assert_eq!(d.phase(4), DoorPhase::Open);
    }

    #[test]
    fn almost_open_is_still_moving() {
        let mut d = DoorState::new();
        d.open(7);
        d.advance(0.999);
        assert!(d.is_moving(7));
        assert!(!d.is_open(7));
        assert!((d.progress(7).unwrap() - 0.999).abs() < 1e-6);
    }

    #[test]
    fn migrates_to_open_exactly_once() {
        let mut d = DoorState::new();
        d.open(2);
        d.open(9);
        assert!(d.advance(0.5).is_empty());
        let done = d.advance(0.5);
        assert_eq!(done.as_slice(), &[2, 9]);
        assert!(!d.is_moving(2) && d.is_open(2));

        // re-advancing neither duplicates nor re-reports
        assert!(d.advance(3.0).is_empty());
        assert_eq!(d.open_count(), 2);
        assert_eq!(d.sliding_count(), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut d = DoorState::new();
        d.open(1);
        d.open(3);
        d.advance(2.0);
        d.open(5);
        d.clear();
        assert_eq!(d.phase(1), DoorPhase::Closed);
        assert_eq!(d.phase(5), DoorPhase::Closed);
        assert_eq!((d.sliding_count(), d.open_count()), (0, 0));
    }
}
