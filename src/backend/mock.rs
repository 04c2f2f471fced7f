//! Recording backend for deterministic tests.
//!
//! Stands in for a real engine so scheduler behavior can be asserted without
//! touching audio hardware: every trait call is logged in order, and opens
//! can be scripted to fail per path.

use super::{AudioBackend, Positioning, SourceHandle};
use crate::error::{Result, SusurrusError};
use crate::math::Vec3;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create(PathBuf),
    Destroy(SourceHandle),
    Play(SourceHandle),
    Stop(SourceHandle),
    SetLooping(SourceHandle, bool),
    SetPosition(SourceHandle, Vec3, Positioning),
    SetPan(SourceHandle, f32),
    SetPanSweep(SourceHandle, f32, f32),
    SetListener(Vec3),
}

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    next_handle: u64,
    pub calls: Vec<Call>,
    fail_paths: HashSet<PathBuf>,
    pub live: HashSet<SourceHandle>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `create_source` to fail for this path.
    pub fn fail_path(&mut self, path: impl Into<PathBuf>) {
        self.fail_paths.insert(path.into());
    }

    /// Number of `play` calls recorded so far.
    pub fn play_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Play(_)))
            .count()
    }

    /// Positions recorded for a handle, in call order.
    pub fn positions_of(&self, handle: SourceHandle) -> Vec<Vec3> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetPosition(h, pos, _) if *h == handle => Some(*pos),
                _ => None,
            })
            .collect()
    }
}

impl AudioBackend for MockBackend {
    fn create_source(&mut self, path: &Path) -> Result<SourceHandle> {
        self.calls.push(Call::Create(path.to_path_buf()));
        if self.fail_paths.contains(path) {
            return Err(SusurrusError::ResourceOpen {
                path: path.display().to_string(),
                reason: "scripted failure".to_owned(),
            });
        }
        let handle = SourceHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle);
        Ok(handle)
    }

    fn destroy_source(&mut self, handle: SourceHandle) {
        self.calls.push(Call::Destroy(handle));
        self.live.remove(&handle);
    }

    fn play(&mut self, handle: SourceHandle) -> Result<()> {
        self.calls.push(Call::Play(handle));
        if self.live.contains(&handle) {
            Ok(())
        } else {
            Err(SusurrusError::Backend(format!("{handle} is not live")))
        }
    }

    fn stop(&mut self, handle: SourceHandle) {
        self.calls.push(Call::Stop(handle));
    }

    fn set_looping(&mut self, handle: SourceHandle, looping: bool) {
        self.calls.push(Call::SetLooping(handle, looping));
    }

    fn set_position(&mut self, handle: SourceHandle, position: Vec3, positioning: Positioning) {
        self.calls.push(Call::SetPosition(handle, position, positioning));
    }

    fn set_pan(&mut self, handle: SourceHandle, pan: f32) {
        self.calls.push(Call::SetPan(handle, pan));
    }

    fn set_pan_sweep(&mut self, handle: SourceHandle, start: f32, end: f32) {
        self.calls.push(Call::SetPanSweep(handle, start, end));
    }

    fn set_listener_position(&mut self, position: Vec3) {
        self.calls.push(Call::SetListener(position));
    }
}
