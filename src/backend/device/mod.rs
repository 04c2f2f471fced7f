//! The shipped [`AudioBackend`]: decoding via symphonia, output via cpal.
//!
//! `DeviceBackend` opens the default output device and mixes a table of
//! voices directly in the stream callback. The callback never blocks or
//! allocates in the steady state: voice and listener state are taken with
//! `try_lock` (a contended pass mixes silence), completion and loop
//! notifications go out through a bounded channel with `try_send`.

mod loader;
mod resampler;
mod voice;

use crate::backend::{AudioBackend, BackendEvent, Positioning, SourceHandle};
use crate::error::{Result, SusurrusError};
use crate::math::Vec3;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use voice::{PanProgram, Voice, VoiceEdge};

const EVENT_QUEUE_SIZE: usize = 256;

struct SharedState {
    voices: Mutex<HashMap<SourceHandle, Voice>>,
    listener: Mutex<Vec3>,
}

/// Audio engine binding backed by the system's default output device.
///
/// Sources created here are decoded up front, resampled to the device rate,
/// and mixed with constant-power panning and inverse-distance attenuation
/// against the global listener. Poll [`poll_events`](Self::poll_events) from
/// the update loop to observe completions and loop wraps.
pub struct DeviceBackend {
    _stream: cpal::Stream,
    shared: Arc<SharedState>,
    events: Receiver<BackendEvent>,
    sample_rate: u32,
    next_handle: u64,
}

impl DeviceBackend {
    /// Opens the default output device and starts the output stream.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            SusurrusError::Device("no default output device available".to_owned())
        })?;
        let default_config = device
            .default_output_config()
            .map_err(|e| SusurrusError::Device(format!("failed to get default config: {e}")))?;

        let sample_rate = default_config.sample_rate().0;
        let channels = default_config.channels();
        let config = default_config.config();

        let shared = Arc::new(SharedState {
            voices: Mutex::new(HashMap::new()),
            listener: Mutex::new(Vec3::ZERO),
        });
        let (event_sender, event_receiver) = crossbeam_channel::bounded(EVENT_QUEUE_SIZE);

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, channels, shared.clone(), event_sender)?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, channels, shared.clone(), event_sender)?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, channels, shared.clone(), event_sender)?
            }
            format => {
                return Err(SusurrusError::Device(format!(
                    "unsupported sample format: {format:?}"
                )));
            }
        };
        stream
            .play()
            .map_err(|e| SusurrusError::Device(format!("failed to start stream: {e}")))?;

        log::debug!("output stream running at {sample_rate} Hz, {channels} channels");
        Ok(Self {
            _stream: stream,
            shared,
            events: event_receiver,
            sample_rate,
            next_handle: 0,
        })
    }

    /// Sample rate every source is resampled to.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Drains pending playback events without blocking.
    pub fn poll_events(&self) -> Vec<BackendEvent> {
        self.events.try_iter().collect()
    }

    fn with_voice(&self, handle: SourceHandle, op: impl FnOnce(&mut Voice)) {
        let mut voices = self.shared.voices.lock().unwrap();
        match voices.get_mut(&handle) {
            Some(voice) => op(voice),
            None => log::debug!("{handle} is unknown, call ignored"),
        }
    }
}

impl AudioBackend for DeviceBackend {
    fn create_source(&mut self, path: &Path) -> Result<SourceHandle> {
        let decoded = loader::decode_file(path)?;
        let samples =
            resampler::resample_mono(&decoded.samples, decoded.sample_rate, self.sample_rate)?;
        let handle = SourceHandle(self.next_handle);
        self.next_handle += 1;
        self.shared
            .voices
            .lock()
            .unwrap()
            .insert(handle, Voice::new(Arc::new(samples)));
        log::debug!("created {handle} from `{}`", path.display());
        Ok(handle)
    }

    fn destroy_source(&mut self, handle: SourceHandle) {
        if self.shared.voices.lock().unwrap().remove(&handle).is_none() {
            log::debug!("{handle} already destroyed");
        }
    }

    fn play(&mut self, handle: SourceHandle) -> Result<()> {
        let mut voices = self.shared.voices.lock().unwrap();
        match voices.get_mut(&handle) {
            Some(voice) => {
                voice.play_from_start();
                Ok(())
            }
            None => Err(SusurrusError::Backend(format!("{handle} is not a live source"))),
        }
    }

    fn stop(&mut self, handle: SourceHandle) {
        self.with_voice(handle, |voice| voice.stop());
    }

    fn set_looping(&mut self, handle: SourceHandle, looping: bool) {
        self.with_voice(handle, |voice| voice.set_looping(looping));
    }

    fn set_position(&mut self, handle: SourceHandle, position: Vec3, positioning: Positioning) {
        self.with_voice(handle, |voice| voice.set_position(position, positioning));
    }

    fn set_pan(&mut self, handle: SourceHandle, pan: f32) {
        self.with_voice(handle, |voice| voice.set_pan(PanProgram::Fixed(pan)));
    }

    fn set_pan_sweep(&mut self, handle: SourceHandle, start: f32, end: f32) {
        self.with_voice(handle, |voice| voice.set_pan(PanProgram::Sweep { start, end }));
    }

    fn set_listener_position(&mut self, position: Vec3) {
        *self.shared.listener.lock().unwrap() = position;
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: u16,
    shared: Arc<SharedState>,
    events: Sender<BackendEvent>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = channels as usize;
    let mut mix_buffer: Vec<f32> = Vec::new();

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                mix_buffer.resize(data.len(), 0.0);
                mix_buffer.fill(0.0);

                let listener = shared
                    .listener
                    .try_lock()
                    .map(|guard| *guard)
                    .unwrap_or(Vec3::ZERO);
                if let Ok(mut voices) = shared.voices.try_lock() {
                    for (handle, voice) in voices.iter_mut() {
                        if !voice.is_playing() {
                            continue;
                        }
                        match voice.mix_into(&mut mix_buffer, channels, listener) {
                            VoiceEdge::Completed => {
                                let _ = events.try_send(BackendEvent::SourceCompleted {
                                    handle: *handle,
                                });
                            }
                            VoiceEdge::Looped => {
                                let _ = events
                                    .try_send(BackendEvent::SourceLooped { handle: *handle });
                            }
                            VoiceEdge::None => {}
                        }
                    }
                } else {
                    log::warn!("voice table contended, mixing silence for one block");
                }

                for (out, mixed) in data.iter_mut().zip(mix_buffer.iter()) {
                    *out = T::from_sample(*mixed);
                }
            },
            move |err| {
                log::error!("audio stream error: {err}");
            },
            None,
        )
        .map_err(|e| SusurrusError::Device(format!("failed to build stream: {e}")))?;

    Ok(stream)
}
