//! Per-source playback state mixed by the output stream callback.

use crate::backend::Positioning;
use crate::math::Vec3;
use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;

/// Distance at which a positioned source plays at full volume.
const REFERENCE_DISTANCE: f32 = 1.0;

/// Stereo pan program for a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PanProgram {
    Fixed(f32),
    /// Linear glide across the voice's playback duration.
    Sweep { start: f32, end: f32 },
}

/// What happened to a voice during one mix pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VoiceEdge {
    None,
    /// A non-looping voice reached its end and stopped.
    Completed,
    /// A looping voice wrapped around at least once.
    Looped,
}

/// A playable source: mono samples at the device rate plus playback state.
#[derive(Debug)]
pub(crate) struct Voice {
    samples: Arc<Vec<f32>>,
    cursor: usize,
    playing: bool,
    looping: bool,
    pan: PanProgram,
    position: Option<(Vec3, Positioning)>,
}

impl Voice {
    pub fn new(samples: Arc<Vec<f32>>) -> Self {
        Self {
            samples,
            cursor: 0,
            playing: false,
            looping: false,
            pan: PanProgram::Fixed(0.0),
            position: None,
        }
    }

    pub fn play_from_start(&mut self) {
        self.cursor = 0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn set_pan(&mut self, pan: PanProgram) {
        self.pan = pan;
    }

    pub fn set_position(&mut self, position: Vec3, positioning: Positioning) {
        self.position = Some((position, positioning));
    }

    fn pan_at(&self, cursor: usize) -> f32 {
        match self.pan {
            PanProgram::Fixed(pan) => pan,
            PanProgram::Sweep { start, end } => {
                let len = self.samples.len().max(1);
                start + (end - start) * (cursor as f32 / len as f32)
            }
        }
    }

    /// Constant-power stereo gains for a pan in `[-1, 1]`.
    fn pan_gains(pan: f32) -> (f32, f32) {
        let theta = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
        (theta.cos(), theta.sin())
    }

    /// Full volume inside the reference distance, inverse falloff beyond it.
    fn distance_gain(distance: f32) -> f32 {
        if distance <= REFERENCE_DISTANCE {
            1.0
        } else {
            REFERENCE_DISTANCE / distance
        }
    }

    /// Gain and pan derived from the source position relative to `listener`.
    /// `None` when the voice is unpositioned.
    fn spatial_params(&self, listener: Vec3) -> Option<(f32, f32)> {
        let (position, positioning) = self.position?;
        let offset = match positioning {
            Positioning::Absolute => position - listener,
            Positioning::Relative => position,
        };
        let distance = offset.length();
        let pan = if distance > f32::EPSILON {
            (offset.x / distance).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Some((Self::distance_gain(distance), pan))
    }

    /// Mixes this voice into an interleaved output buffer.
    ///
    /// Spatial gain and pan are snapshots per mix pass; a pan sweep advances
    /// with the playback cursor. Channels beyond the first stereo pair are
    /// left untouched.
    pub fn mix_into(&mut self, buffer: &mut [f32], channels: usize, listener: Vec3) -> VoiceEdge {
        if !self.playing || self.samples.is_empty() || channels == 0 {
            return VoiceEdge::None;
        }
        let frames = buffer.len() / channels;
        let spatial = self.spatial_params(listener);
        let mut edge = VoiceEdge::None;

        for frame in 0..frames {
            if self.cursor >= self.samples.len() {
                if self.looping {
                    self.cursor = 0;
                    edge = VoiceEdge::Looped;
                } else {
                    self.playing = false;
                    return VoiceEdge::Completed;
                }
            }
            let sample = self.samples[self.cursor];
            let (gain, pan) = match spatial {
                Some((gain, pan)) => (gain, pan),
                None => (1.0, self.pan_at(self.cursor)),
            };
            let base = frame * channels;
            if channels >= 2 {
                let (left, right) = Self::pan_gains(pan);
                buffer[base] += sample * gain * left;
                buffer[base + 1] += sample * gain * right;
            } else {
                buffer[base] += sample * gain;
            }
            self.cursor += 1;
        }
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(samples: Vec<f32>) -> Voice {
        Voice::new(Arc::new(samples))
    }

    #[test]
    fn centered_pan_is_constant_power() {
        let (left, right) = Voice::pan_gains(0.0);
        assert!((left - right).abs() < 1e-6);
        assert!((left - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn hard_left_silences_the_right_channel() {
        let (left, right) = Voice::pan_gains(-1.0);
        assert!((left - 1.0).abs() < 1e-6);
        assert!(right.abs() < 1e-6);
    }

    #[test]
    fn sweep_pan_follows_the_cursor() {
        let mut v = voice(vec![0.0; 100]);
        v.set_pan(PanProgram::Sweep {
            start: -1.0,
            end: 1.0,
        });
        assert!((v.pan_at(0) - (-1.0)).abs() < 1e-6);
        assert!(v.pan_at(50).abs() < 0.05);
        assert!(v.pan_at(99) > 0.9);
    }

    #[test]
    fn non_looping_voice_completes_and_stops() {
        let mut v = voice(vec![1.0, 1.0, 1.0]);
        v.play_from_start();
        let mut buffer = vec![0.0; 16];
        let edge = v.mix_into(&mut buffer, 2, Vec3::ZERO);
        assert_eq!(edge, VoiceEdge::Completed);
        assert!(!v.is_playing());
        // three frames written, the rest silent
        assert!(buffer[0] > 0.0 && buffer[4] > 0.0);
        assert_eq!(buffer[6], 0.0);
    }

    #[test]
    fn looping_voice_wraps_and_keeps_playing() {
        let mut v = voice(vec![1.0, 1.0]);
        v.set_looping(true);
        v.play_from_start();
        let mut buffer = vec![0.0; 10];
        let edge = v.mix_into(&mut buffer, 2, Vec3::ZERO);
        assert_eq!(edge, VoiceEdge::Looped);
        assert!(v.is_playing());
        assert!(buffer.iter().step_by(2).all(|s| *s > 0.0));
    }

    #[test]
    fn distance_attenuates_beyond_reference() {
        assert_eq!(Voice::distance_gain(0.0), 1.0);
        assert_eq!(Voice::distance_gain(1.0), 1.0);
        assert!((Voice::distance_gain(2.0) - 0.5).abs() < 1e-6);
        assert!(Voice::distance_gain(10.0) < Voice::distance_gain(5.0));
    }

    #[test]
    fn source_right_of_listener_pans_right() {
        let mut v = voice(vec![1.0; 4]);
        v.set_position(Vec3::new(5.0, 0.0, 0.0), Positioning::Absolute);
        v.play_from_start();
        let mut buffer = vec![0.0; 8];
        v.mix_into(&mut buffer, 2, Vec3::ZERO);
        assert!(buffer[1] > buffer[0], "right {} <= left {}", buffer[1], buffer[0]);
    }

    #[test]
    fn relative_positioning_ignores_the_listener() {
        let mut v = voice(vec![1.0; 4]);
        v.set_position(Vec3::new(0.0, 0.0, 0.0), Positioning::Relative);
        v.play_from_start();
        let mut buffer = vec![0.0; 8];
        // listener far away; a relative source at zero offset stays at full volume
        v.mix_into(&mut buffer, 2, Vec3::new(100.0, 0.0, 0.0));
        let (left, right) = Voice::pan_gains(0.0);
        assert!((buffer[0] - left).abs() < 1e-6);
        assert!((buffer[1] - right).abs() < 1e-6);
    }

    #[test]
    fn stopped_voice_mixes_nothing() {
        let mut v = voice(vec![1.0; 4]);
        let mut buffer = vec![0.0; 8];
        assert_eq!(v.mix_into(&mut buffer, 2, Vec3::ZERO), VoiceEdge::None);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }
}
