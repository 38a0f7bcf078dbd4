//! Sound assets and the playback interface the engine calls out to.
//!
//! * [`SoundBank`] caches decoded sound files by name.
//! * [`AudioSink`] is fire-and-forget: the engine never waits on it.
//! * [`Speakers`] plays through the default output device with `rodio`.
//! * [`VoicePool`] only keeps the books (headless runs and tests).
//!
//! Both real sinks hold at most [`MAX_VOICES`] concurrent voices and drop
//! new requests (with a warning) when all of them are busy.

mod speakers;

pub use speakers::Speakers;

use std::{
    collections::HashMap,
    io::{self, Cursor},
    path::Path,
    sync::Arc,
};

use glam::Vec2;
use rodio::{Decoder, Source, decoder::DecoderError};
use thiserror::Error;

/// Runtime handle for a sound in a [`SoundBank`].
pub type SoundId = u16;

/// Concurrent voices a sink offers by default.
pub const MAX_VOICES: usize = 150;

#[derive(Error, Debug)]
pub enum SoundError {
    #[error("cannot read `{name}`: {source}")]
    Io { name: String, source: io::Error },

    #[error("cannot decode `{name}`: {source}")]
    Decode { name: String, source: DecoderError },
}

/// Encoded sound file plus the stream parameters `rodio` reported for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sound {
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub channels: u16,
    pub sample_rate: u32,
    /// Playback length in seconds.
    pub duration: f32,
}

/// Decoder over a shared copy of a sound's bytes.
pub type SoundSource = Decoder<Cursor<Arc<[u8]>>>;

impl Sound {
    /// Check that `rodio` can decode `bytes` and keep them for playback.
    pub fn decode(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SoundError> {
        let name = name.into();
        let bytes: Arc<[u8]> = bytes.into();
        let dec = Decoder::new(Cursor::new(bytes.clone())).map_err(|source| SoundError::Decode {
            name: name.clone(),
            source,
        })?;

        let (channels, sample_rate) = (dec.channels(), dec.sample_rate());
        let duration = match dec.total_duration() {
            Some(d) => d.as_secs_f32(),
            // count interleaved samples when the container does not say
            None => dec.count() as f32 / (channels.max(1) as u32 * sample_rate.max(1)) as f32,
        };

        Ok(Self {
            name,
            bytes,
            channels,
            sample_rate,
            duration,
        })
    }

    /// Fresh decoder positioned at the start of the sound.
    pub fn source(&self) -> Result<SoundSource, DecoderError> {
        Decoder::new(Cursor::new(self.bytes.clone()))
    }
}

/// Name-keyed cache of sounds. Owned by whoever plays them.
#[derive(Default)]
pub struct SoundBank {
    by_name: HashMap<String, SoundId>,
    data: Vec<Sound>,
}

impl SoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn id(&self, name: &str) -> Option<SoundId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: SoundId) -> Option<&Sound> {
        self.data.get(id as usize)
    }

    /// Add `sound` under its own name; an existing entry wins.
    pub fn insert(&mut self, sound: Sound) -> SoundId {
        if let Some(id) = self.id(&sound.name) {
            return id;
        }
        let id = self.data.len() as SoundId;
        self.by_name.insert(sound.name.clone(), id);
        self.data.push(sound);
        id
    }

    /// Return the cached id for `name`, reading `root/name` on first use.
    pub fn load(&mut self, root: &Path, name: &str) -> Result<SoundId, SoundError> {
        if let Some(id) = self.id(name) {
            return Ok(id);
        }
        let bytes = std::fs::read(root.join(name)).map_err(|source| SoundError::Io {
            name: name.to_owned(),
            source,
        })?;
        let sound = Sound::decode(name, bytes)?;
        log::debug!("loaded sound {name} ({:.2}s)", sound.duration);
        Ok(self.insert(sound))
    }
}

/// Per-request playback parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cue {
    /// World position for spatialised playback; `None` plays at the listener.
    pub position: Option<Vec2>,
    pub volume: f32,
    pub pitch: f32,
}

impl Default for Cue {
    fn default() -> Self {
        Self {
            position: None,
            volume: 1.0,
            pitch: 1.0,
        }
    }
}

impl Cue {
    pub fn at(position: Vec2) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }
}

/// Where the engine sends sound requests.
pub trait AudioSink {
    /// Start `sound`. Returns `false` if the request was dropped.
    fn play(&mut self, sound: &Sound, cue: Cue) -> bool;

    /// Let `dt` seconds of playback elapse.
    fn advance(&mut self, _dt: f32) {}

    /// Move the ears. `right` points out of the right ear; any length.
    fn set_listener(&mut self, _pos: Vec2, _right: Vec2) {}
}

/// Discards every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _sound: &Sound, _cue: Cue) -> bool {
        true
    }
}

/// A sound occupying one slot of a [`VoicePool`].
#[derive(Clone, Debug, PartialEq)]
pub struct Voice {
    pub sound: String,
    pub cue: Cue,
    pub remaining: f32,
}

/// Fixed set of playback slots.
pub struct VoicePool {
    slots: Vec<Option<Voice>>,
    dropped: usize,
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new(MAX_VOICES)
    }
}

impl VoicePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Voices currently playing.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Requests turned away because every slot was busy.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.slots.iter().flatten()
    }
}

impl AudioSink for VoicePool {
    fn play(&mut self, sound: &Sound, cue: Cue) -> bool {
        let Some(free) = self.slots.iter().position(Option::is_none) else {
            self.dropped += 1;
            log::warn!("all {} voices busy, dropping `{}`", self.slots.len(), sound.name);
            return false;
        };
        self.slots[free] = Some(Voice {
            sound: sound.name.clone(),
            cue,
            remaining: sound.duration,
        });
        true
    }

    fn advance(&mut self, dt: f32) {
        for slot in &mut self.slots {
            let finished = match slot {
                Some(v) => {
                    v.remaining -= dt;
                    v.remaining <= 0.0
                }
                None => false,
            };
            if finished {
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian as LE, WriteBytesExt};
    use std::io::Write;

    /// Minimal PCM WAV: 8 kHz mono 16-bit, `samples` frames of silence.
    fn wav(samples: u32) -> Vec<u8> {
        let data_len = samples * 2;
        let mut v = Vec::new();
        v.write_all(b"RIFF").unwrap();
        v.write_u32::<LE>(36 + data_len).unwrap();
        v.write_all(b"WAVE").unwrap();
        v.write_all(b"fmt ").unwrap();
        v.write_u32::<LE>(16).unwrap();
        v.write_u16::<LE>(1).unwrap(); // PCM
        v.write_u16::<LE>(1).unwrap();
        v.write_u32::<LE>(8000).unwrap();
        v.write_u32::<LE>(16000).unwrap();
        v.write_u16::<LE>(2).unwrap();
        v.write_u16::<LE>(16).unwrap();
        v.write_all(b"data").unwrap();
        v.write_u32::<LE>(data_len).unwrap();
        v.extend(std::iter::repeat_n(0u8, data_len as usize));
        v
    }

    fn sound(frames: u32) -> Sound {
        Sound::decode("door.wav", wav(frames)).unwrap()
    }

    #[test]
    fn decoded_wav_gives_duration() {
        let s = sound(4000);
        assert_eq!((s.channels, s.sample_rate), (1, 8000));
        assert!((s.duration - 0.5).abs() < 1e-3);
        assert_eq!(s.source().unwrap().count(), 4000);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = Sound::decode("x.ogg", b"not a sound file at all".to_vec()).unwrap_err();
        assert!(matches!(err, SoundError::Decode { name, .. } if name == "x.ogg"));
        assert!(matches!(
            Sound::decode("short", b"RIF".to_vec()),
            Err(SoundError::Decode { .. })
        ));
    }

    #[test]
    fn bank_caches_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("door.wav"), wav(800)).unwrap();
        let mut bank = SoundBank::new();
        let a = bank.load(dir.path(), "door.wav").unwrap();
        let b = bank.load(dir.path(), "door.wav").unwrap();
        assert_eq!(a, b);
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get(a).unwrap().name, "door.wav");
        assert!(matches!(
            bank.load(dir.path(), "missing.wav"),
            Err(SoundError::Io { .. })
        ));
    }

    #[test]
    fn full_pool_drops_instead_of_failing() {
        let s = sound(8000);
        let mut pool = VoicePool::new(2);
        assert!(pool.play(&s, Cue::default()));
        assert!(pool.play(&s, Cue::at(Vec2::ONE)));
        assert!(!pool.play(&s, Cue::default()));
        assert_eq!((pool.active(), pool.dropped()), (2, 1));
    }

    #[test]
    fn finished_voices_free_their_slot() {
        let s = sound(4000); // 0.5 s
        let mut pool = VoicePool::new(1);
        assert!(pool.play(&s, Cue::default()));
        pool.advance(0.25);
        assert_eq!(pool.active(), 1);
        pool.advance(0.3);
        assert_eq!(pool.active(), 0);
        assert!(pool.play(&s, Cue::default()));
    }

    #[test]
    fn default_pool_has_150_voices() {
        assert_eq!(VoicePool::default().capacity(), MAX_VOICES);
    }
}
