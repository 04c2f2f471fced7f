//! The seam between the soundscape core and the audio engine that actually
//! decodes, mixes, and outputs sound.
//!
//! The core never touches samples or devices; it creates sources from file
//! paths, starts and stops them, and hands over coordinates and pan programs
//! through the [`AudioBackend`] trait. [`DeviceBackend`](device::DeviceBackend)
//! is the shipped implementation (cpal output, symphonia decoding); custom
//! engines implement the trait themselves.

pub mod device;
#[cfg(test)]
pub(crate) mod mock;

use crate::error::Result;
use crate::math::Vec3;
use std::path::Path;

/// Lightweight, type-safe handle for backend-owned playback sources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub(crate) u64);

impl std::fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SourceHandle({})", self.0)
    }
}

/// How a source's position is interpreted relative to the listener.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Positioning {
    /// Position is a point in scene space; the listener moves relative to it.
    #[default]
    Absolute,
    /// Position is an offset from the listener, following it around.
    Relative,
}

/// Playback events emitted by a backend, polled by the embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// A non-looping source reached its end and stopped.
    SourceCompleted { handle: SourceHandle },
    /// A looping source wrapped around to its beginning.
    SourceLooped { handle: SourceHandle },
}

/// Audio engine binding used by [`Soundscape`](crate::Soundscape) and
/// [`Sound`](crate::Sound).
///
/// Implementations own decoding, mixing, device output, and the global
/// listener; the soundscape core only drives this interface. All methods are
/// expected to return promptly — any heavy lifting happens on the backend's
/// own threads.
pub trait AudioBackend {
    /// Creates a playable source from an audio file.
    fn create_source(&mut self, path: &Path) -> Result<SourceHandle>;

    /// Releases a source and every resource held for it. Unknown handles are
    /// ignored.
    fn destroy_source(&mut self, handle: SourceHandle);

    /// Starts (or restarts) playback of a source from its beginning.
    fn play(&mut self, handle: SourceHandle) -> Result<()>;

    /// Stops playback of a source.
    fn stop(&mut self, handle: SourceHandle);

    /// Sets whether the source loops when it reaches its end.
    fn set_looping(&mut self, handle: SourceHandle, looping: bool);

    /// Places a source in 3D space. Takes effect for subsequent playback;
    /// whether live playback follows is up to the implementation.
    fn set_position(&mut self, handle: SourceHandle, position: Vec3, positioning: Positioning);

    /// Sets an instantaneous stereo pan in `[-1, 1]` (left to right).
    fn set_pan(&mut self, handle: SourceHandle, pan: f32);

    /// Programs a linear pan glide from `start` to `end` over the source's
    /// playback duration.
    fn set_pan_sweep(&mut self, handle: SourceHandle, start: f32, end: f32);

    /// Moves the global listener.
    fn set_listener_position(&mut self, position: Vec3);
}
