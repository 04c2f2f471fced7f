//! A single playable unit in a soundscape's trigger pool.

use crate::backend::{AudioBackend, Positioning, SourceHandle};
use crate::speaker::SpeakerId;
use std::path::Path;

/// What a [`Sound`] plays when selected.
#[derive(Debug)]
pub(crate) enum SoundKind {
    /// A decodable source held by the backend. `handle` is `None` when the
    /// resource failed to open — the sound stays in the pool but plays as a
    /// no-op (inert).
    FileBacked { handle: Option<SourceHandle> },
    /// No audio resource at all; selection produces a timed silence.
    Empty,
}

/// A weighted, optionally spatialized one-shot sound.
///
/// Sounds are created once at scene-load time, moved into the
/// [`Soundscape`](crate::Soundscape) that owns them, and released when the
/// soundscape is torn down.
///
/// A sound is positioned in exactly one of two ways when it fires:
/// attached speakers (3D spatialization) or a pan range (stereo automation).
/// When both are configured, speakers win and the pan program is ignored.
#[derive(Debug)]
pub struct Sound {
    name: String,
    weight: f32,
    kind: SoundKind,
    pan_range: Option<(f32, f32)>,
    speakers: Vec<SpeakerId>,
    next_speaker: usize,
    positioning: Positioning,
}

impl Sound {
    /// Creates a file-backed sound with the given selection weight.
    ///
    /// A resource that cannot be opened is reported through the log and the
    /// sound becomes inert: it keeps its weight and stays selectable, but
    /// playing it is a no-op. The failure never aborts scene setup.
    pub fn from_file(
        name: impl Into<String>,
        weight: f32,
        path: &Path,
        backend: &mut dyn AudioBackend,
    ) -> Self {
        let name = name.into();
        let handle = match backend.create_source(path) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::warn!("sound `{name}`: {err}; sound will be inert");
                None
            }
        };
        Self {
            name,
            weight: Self::clamp_weight(weight),
            kind: SoundKind::FileBacked { handle },
            pan_range: None,
            speakers: Vec::new(),
            next_speaker: 0,
            positioning: Positioning::default(),
        }
    }

    /// Creates a silence placeholder carrying only a selection weight.
    ///
    /// Empty sounds participate in weight summation and selection exactly
    /// like file-backed ones; being selected is how silence gaps get a
    /// tunable probability.
    pub fn empty(weight: f32) -> Self {
        Self {
            name: "empty".to_owned(),
            weight: Self::clamp_weight(weight),
            kind: SoundKind::Empty,
            pan_range: None,
            speakers: Vec::new(),
            next_speaker: 0,
            positioning: Positioning::default(),
        }
    }

    fn clamp_weight(weight: f32) -> f32 {
        if weight < 0.0 || !weight.is_finite() {
            log::warn!("sound weight {weight} clamped to 0");
            0.0
        } else {
            weight
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = Self::clamp_weight(weight);
    }

    /// True for silence placeholders.
    pub fn is_empty_sound(&self) -> bool {
        matches!(self.kind, SoundKind::Empty)
    }

    /// True for a file-backed sound whose resource failed to open.
    pub fn is_inert(&self) -> bool {
        matches!(self.kind, SoundKind::FileBacked { handle: None })
    }

    /// True when selecting this sound can produce audible playback.
    pub(crate) fn is_playable(&self) -> bool {
        matches!(self.kind, SoundKind::FileBacked { handle: Some(_) })
    }

    pub(crate) fn handle(&self) -> Option<SourceHandle> {
        match self.kind {
            SoundKind::FileBacked { handle } => handle,
            SoundKind::Empty => None,
        }
    }

    /// Programs a stereo pan glide from `start` to `end` (each in `[-1, 1]`)
    /// over the sound's playback duration. Equal endpoints give a fixed pan.
    ///
    /// Ignored at play time while speakers are attached.
    pub fn set_pan(&mut self, start: f32, end: f32) {
        self.pan_range = Some((start.clamp(-1.0, 1.0), end.clamp(-1.0, 1.0)));
    }

    pub fn pan_range(&self) -> Option<(f32, f32)> {
        self.pan_range
    }

    /// Binds the sound to a speaker for 3D playback. With several speakers
    /// attached, plays rotate through them round-robin.
    pub fn attach_speaker(&mut self, id: SpeakerId) {
        self.speakers.push(id);
    }

    pub fn speakers(&self) -> &[SpeakerId] {
        &self.speakers
    }

    /// Sets how the backend interprets the position copied from a speaker.
    pub fn set_positioning(&mut self, positioning: Positioning) {
        self.positioning = positioning;
    }

    pub fn positioning(&self) -> Positioning {
        self.positioning
    }

    /// Returns the speaker to use for the next play and advances the
    /// round-robin cursor.
    pub(crate) fn advance_speaker(&mut self) -> Option<SpeakerId> {
        if self.speakers.is_empty() {
            return None;
        }
        let id = self.speakers[self.next_speaker % self.speakers.len()];
        self.next_speaker = (self.next_speaker + 1) % self.speakers.len();
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;

    #[test]
    fn empty_sound_has_no_handle() {
        let sound = Sound::empty(3.0);
        assert!(sound.is_empty_sound());
        assert!(!sound.is_inert());
        assert!(sound.handle().is_none());
        assert_eq!(sound.weight(), 3.0);
    }

    #[test]
    fn negative_weight_is_clamped() {
        let sound = Sound::empty(-2.0);
        assert_eq!(sound.weight(), 0.0);
    }

    #[test]
    fn failed_open_yields_inert_sound() {
        let mut backend = MockBackend::new();
        backend.fail_path("missing.ogg");
        let sound = Sound::from_file("broken", 1.0, Path::new("missing.ogg"), &mut backend);
        assert!(sound.is_inert());
        assert!(!sound.is_playable());
        assert_eq!(sound.weight(), 1.0);
    }

    #[test]
    fn round_robin_rotates_through_attachments() {
        let mut backend = MockBackend::new();
        let mut sound = Sound::from_file("s", 1.0, Path::new("s.wav"), &mut backend);
        let mut speakers = crate::Speakers::new();
        let a = speakers.insert(crate::Speaker::new("a", crate::Vec3::ZERO));
        let b = speakers.insert(crate::Speaker::new("b", crate::Vec3::ONE));
        sound.attach_speaker(a);
        sound.attach_speaker(b);
        assert_eq!(sound.advance_speaker(), Some(a));
        assert_eq!(sound.advance_speaker(), Some(b));
        assert_eq!(sound.advance_speaker(), Some(a));
    }

    #[test]
    fn pan_endpoints_are_clamped() {
        let mut sound = Sound::empty(1.0);
        sound.set_pan(-3.0, 2.0);
        assert_eq!(sound.pan_range(), Some((-1.0, 1.0)));
    }
}
