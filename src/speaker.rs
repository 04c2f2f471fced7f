//! Named 3D emitter positions that sounds can bind to for spatialization.
//!
//! Speakers are owned by the embedding application through a [`Speakers`]
//! registry; sounds reference them only by [`SpeakerId`]. Removing a speaker
//! leaves any referencing sound with a stale id, which is handled gracefully
//! at play time instead of dangling.

use crate::math::Vec3;
use std::collections::HashMap;

/// Lightweight, type-safe handle for speakers.
///
/// Returned when inserting a [`Speaker`] into a [`Speakers`] registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpeakerId(u64);

impl std::fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpeakerId({})", self.0)
    }
}

/// A named emitter position in scene space.
///
/// The position is mutable; moving a speaker takes effect on the next play
/// of any sound that references it. Sound already playing keeps the position
/// it was triggered with.
#[derive(Debug, Clone)]
pub struct Speaker {
    name: String,
    pub position: Vec3,
}

impl Speaker {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Caller-owned registry of speakers.
///
/// Sounds hold [`SpeakerId`]s into this registry rather than references, so
/// speaker lifetime is decoupled from sound lifetime. The registry must be
/// passed to the soundscape operations that resolve positions at play time.
#[derive(Debug, Default)]
pub struct Speakers {
    entries: HashMap<SpeakerId, Speaker>,
    next_id: u64,
}

impl Speakers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a speaker and returns its handle.
    pub fn insert(&mut self, speaker: Speaker) -> SpeakerId {
        let id = SpeakerId(self.next_id);
        self.next_id += 1;
        log::debug!("speaker `{}` registered as {}", speaker.name(), id);
        self.entries.insert(id, speaker);
        id
    }

    pub fn get(&self, id: SpeakerId) -> Option<&Speaker> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: SpeakerId) -> Option<&mut Speaker> {
        self.entries.get_mut(&id)
    }

    /// Removes a speaker. Sounds still referencing the id fall back to
    /// unpositioned playback.
    pub fn remove(&mut self, id: SpeakerId) -> Option<Speaker> {
        self.entries.remove(&id)
    }

    /// Convenience for moving a speaker. Returns false if the id is stale.
    pub fn set_position(&mut self, id: SpeakerId, position: Vec3) -> bool {
        match self.entries.get_mut(&id) {
            Some(speaker) => {
                speaker.position = position;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeakerId, &Speaker)> {
        self.entries.iter().map(|(id, s)| (*id, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut speakers = Speakers::new();
        let id = speakers.insert(Speaker::new("porch", Vec3::new(-5.0, 0.0, 0.0)));
        assert_eq!(speakers.get(id).unwrap().name(), "porch");
        assert_eq!(speakers.get(id).unwrap().position, Vec3::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn ids_are_unique_after_removal() {
        let mut speakers = Speakers::new();
        let a = speakers.insert(Speaker::new("a", Vec3::ZERO));
        speakers.remove(a);
        let b = speakers.insert(Speaker::new("b", Vec3::ZERO));
        assert_ne!(a, b);
        assert!(speakers.get(a).is_none());
        assert!(speakers.get(b).is_some());
    }

    #[test]
    fn set_position_reports_stale_ids() {
        let mut speakers = Speakers::new();
        let id = speakers.insert(Speaker::new("a", Vec3::ZERO));
        assert!(speakers.set_position(id, Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(speakers.get(id).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
        speakers.remove(id);
        assert!(!speakers.set_position(id, Vec3::ZERO));
    }
}
