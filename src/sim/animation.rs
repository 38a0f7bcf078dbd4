//! Frame-index timers for animated sprites.

use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Playing,
}

/// Counts frames `0..frame_count` at a fixed frame interval.
///
/// * Looping clocks wrap back to frame 0.
/// * One-shot clocks stop (and rewind to frame 0) after the last frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClock {
    frame_time: f32,
    frame_count: usize,
    looping: bool,
    state: ClockState,
    frame: usize,
    time: f32,
}

impl AnimationClock {
    /// `fps` frames per second over `frame_count` frames. Starts stopped.
    pub fn new(fps: f32, frame_count: usize, looping: bool) -> Self {
        Self {
            frame_time: 1.0 / fps.max(f32::EPSILON),
            frame_count,
            looping,
            state: ClockState::Stopped,
            frame: 0,
            time: 0.0,
        }
    }

    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }

    #[inline]
    pub fn state(&self) -> ClockState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Playing
    }

    #[inline]
    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    pub fn set_frame(&mut self, frame: usize) {
        self.frame = frame.min(self.frame_count.saturating_sub(1));
    }

    pub fn play(&mut self) {
        self.state = ClockState::Playing;
    }

    /// Stop without rewinding.
    pub fn pause(&mut self) {
        self.state = ClockState::Stopped;
    }

    /// Stop and rewind to frame 0.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.frame = 0;
        self.time = 0.0;
    }

    pub fn toggle(&mut self) {
        match self.state {
            ClockState::Playing => self.stop(),
            ClockState::Stopped => self.play(),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.is_playing() || self.frame_count == 0 {
            return;
        }
        self.time += dt;
        while self.time >= self.frame_time {
            self.time -= self.frame_time;
            self.frame += 1;
            if self.frame >= self.frame_count {
                self.frame = 0;
                if !self.looping {
                    self.stop();
                    return;
                }
            }
        }
    }
}

/// A clock plus the frame values it indexes (sprite-sheet columns, 1-based).
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub clock: AnimationClock,
    frames: SmallVec<[u16; 8]>,
}

impl Animation {
    pub fn new(fps: f32, frames: impl IntoIterator<Item = u16>, looping: bool) -> Self {
        let frames: SmallVec<[u16; 8]> = frames.into_iter().collect();
        Self {
            clock: AnimationClock::new(fps, frames.len(), looping),
            frames,
        }
    }

    /// Same as [`Animation::new`] but already playing.
    pub fn playing(fps: f32, frames: impl IntoIterator<Item = u16>, looping: bool) -> Self {
        let mut a = Self::new(fps, frames, looping);
        a.clock.play();
        a
    }

    /// Frame value under the clock, `None` for an empty animation.
    #[inline]
    pub fn current(&self) -> Option<u16> {
        self.frames.get(self.clock.frame()).copied()
    }

    pub fn frames(&self) -> &[u16] {
        &self.frames
    }

    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.clock.advance(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_clock_does_not_advance() {
        let mut c = AnimationClock::new(4.0, 3, true);
        c.advance(10.0);
        assert_eq!(c.frame(), 0);
        assert_eq!(c.state(), ClockState::Stopped);
    }

    #[test]
    fn looping_wraps() {
        let mut c = AnimationClock::new(4.0, 3, true);
        c.play();
        c.advance(0.25);
        assert_eq!(c.frame(), 1);
        c.advance(0.5);
        assert_eq!(c.frame(), 0);
        assert!(c.is_playing());
    }

    #[test]
    fn one_shot_stops_and_rewinds() {
        let mut c = AnimationClock::new(2.0, 2, false);
        c.play();
        c.advance(0.5);
        assert_eq!(c.frame(), 1);
        c.advance(0.5);
        assert_eq!(c.frame(), 0);
        assert_eq!(c.state(), ClockState::Stopped);
        c.advance(5.0);
        assert_eq!(c.frame(), 0);
    }

    #[test]
    fn pause_keeps_position_stop_rewinds() {
        let mut c = AnimationClock::new(4.0, 4, true);
        c.play();
        c.advance(0.5);
        c.pause();
        assert_eq!(c.frame(), 2);
        c.play();
        c.advance(0.25);
        assert_eq!(c.frame(), 3);
        c.stop();
        assert_eq!(c.frame(), 0);
    }

    #[test]
    fn toggle_flips_play_and_stop() {
        let mut c = AnimationClock::new(4.0, 4, true);
        c.toggle();
        assert!(c.is_playing());
        c.advance(0.25);
        c.toggle();
        assert_eq!((c.state(), c.frame()), (ClockState::Stopped, 0));
    }

    #[test]
    fn animation_reports_frame_values() {
        let mut a = Animation::playing(6.0, [1, 2, 3, 4, 1], true);
        assert_eq!(a.current(), Some(1));
        a.advance(0.2);
        assert_eq!(a.current(), Some(2));
        assert_eq!(Animation::new(1.0, std::iter::empty(), true).current(), None);
    }
}
