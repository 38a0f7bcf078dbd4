use glam::Vec2;
use rodio::{OutputStream, OutputStreamHandle, Sink, SpatialSink};

use super::{AudioSink, Cue, MAX_VOICES, Sound};

/// Half the distance between the ears, in map units.
const EAR_OFFSET: f32 = 0.1;

/// One `rodio` sink per playing sound.
enum Voice {
    Flat(Sink),
    Spatial(SpatialSink),
}

impl Voice {
    fn finished(&self) -> bool {
        match self {
            Voice::Flat(s) => s.empty(),
            Voice::Spatial(s) => s.empty(),
        }
    }
}

/// Plays through the default output device.
///
/// Cues with a position go through a [`SpatialSink`] whose ears follow the
/// listener; the rest play flat. Without a device every request is dropped.
pub struct Speakers {
    // the stream must outlive every sink created from its handle
    output: Option<(OutputStream, OutputStreamHandle)>,
    voices: Vec<Voice>,
    capacity: usize,
    dropped: usize,
    listener: Vec2,
    right: Vec2,
}

impl Speakers {
    /// Open the default device. Failure is logged and leaves the sink mute.
    pub fn open() -> Self {
        let output = match OutputStream::try_default() {
            Ok(out) => Some(out),
            Err(e) => {
                log::warn!("no audio output ({e}); running silent");
                None
            }
        };
        Self::with_output(output, MAX_VOICES)
    }

    /// A sink that never reaches a device.
    pub fn mute() -> Self {
        Self::with_output(None, MAX_VOICES)
    }

    fn with_output(output: Option<(OutputStream, OutputStreamHandle)>, capacity: usize) -> Self {
        Self {
            output,
            voices: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
            listener: Vec2::ZERO,
            right: Vec2::X,
        }
    }

    pub fn is_mute(&self) -> bool {
        self.output.is_none()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn active(&self) -> usize {
        self.voices.len()
    }

    /// Requests turned away because every voice was busy.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn reap(&mut self) {
        self.voices.retain(|v| !v.finished());
    }
}

impl AudioSink for Speakers {
    fn play(&mut self, sound: &Sound, cue: Cue) -> bool {
        self.reap();
        if self.voices.len() >= self.capacity {
            self.dropped += 1;
            log::warn!("all {} voices busy, dropping `{}`", self.capacity, sound.name);
            return false;
        }
        let Some((_, handle)) = &self.output else {
            return false;
        };
        let source = match sound.source() {
            Ok(src) => src,
            Err(e) => {
                log::warn!("cannot decode `{}`: {e}", sound.name);
                return false;
            }
        };

        let voice = match cue.position {
            Some(at) => {
                let (left, right) = ears(self.listener, self.right);
                match SpatialSink::try_new(handle, to_space(at), left, right) {
                    Ok(sink) => {
                        sink.set_volume(cue.volume);
                        sink.set_speed(cue.pitch);
                        sink.append(source);
                        Voice::Spatial(sink)
                    }
                    Err(e) => {
                        log::warn!("cannot play `{}`: {e}", sound.name);
                        return false;
                    }
                }
            }
            None => match Sink::try_new(handle) {
                Ok(sink) => {
                    sink.set_volume(cue.volume);
                    sink.set_speed(cue.pitch);
                    sink.append(source);
                    Voice::Flat(sink)
                }
                Err(e) => {
                    log::warn!("cannot play `{}`: {e}", sound.name);
                    return false;
                }
            },
        };
        self.voices.push(voice);
        true
    }

    fn advance(&mut self, _dt: f32) {
        self.reap();
    }

    fn set_listener(&mut self, pos: Vec2, right: Vec2) {
        self.listener = pos;
        self.right = right;
        let (l, r) = ears(pos, right);
        for voice in &self.voices {
            if let Voice::Spatial(sink) = voice {
                sink.set_left_ear_position(l);
                sink.set_right_ear_position(r);
            }
        }
    }
}

/// Map plane `(x, y)` to `rodio`'s space, with y up.
fn to_space(p: Vec2) -> [f32; 3] {
    [p.x, 0.0, p.y]
}

fn ears(pos: Vec2, right: Vec2) -> ([f32; 3], [f32; 3]) {
    let side = right.normalize_or(Vec2::X) * EAR_OFFSET;
    (to_space(pos - side), to_space(pos + side))
}
