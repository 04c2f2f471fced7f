//! The soundscape scheduler: an ambient loop plus a weighted pool of
//! one-shot sounds fired on a randomized trigger timer.
//!
//! A [`Soundscape`] owns its sounds and their engine-side resources. The
//! embedding drives it from its update loop: construct, [`add_sound`],
//! [`start`], then [`tick`] once per time-step with the elapsed time. Each
//! expiry of the trigger timer performs one weighted roulette draw over the
//! pool — walking it in insertion order and accumulating weights until the
//! running sum exceeds a uniform draw in `[0, total_weight)` — so selection
//! is deterministic for a fixed pool order and a seeded random source.
//!
//! [`add_sound`]: Soundscape::add_sound
//! [`start`]: Soundscape::start
//! [`tick`]: Soundscape::tick

use crate::backend::AudioBackend;
use crate::config::SoundscapeDesc;
use crate::error::{Result, SusurrusError};
use crate::sound::Sound;
use crate::speaker::Speakers;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::path::Path;
use std::time::Duration;

/// What a trigger produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A file-backed sound was started on the backend.
    Played { name: String },
    /// The selection fired but produced no audio: an empty sound, an inert
    /// sound, or a sound whose play call failed. Counts as a fired event for
    /// scheduling either way.
    Silence { name: String },
}

impl Trigger {
    pub fn name(&self) -> &str {
        match self {
            Self::Played { name } | Self::Silence { name } => name,
        }
    }
}

/// An ambient loop plus a weighted trigger pool, driven by discrete ticks.
///
/// All scheduling state lives here and is mutated only from the explicit
/// calls below; nothing runs on its own thread. Call [`uninit`] before
/// tearing down the backend — it releases every engine-held source, after
/// which the soundscape refuses further work instead of corrupting state.
///
/// [`uninit`]: Soundscape::uninit
pub struct Soundscape {
    name: String,
    desc: SoundscapeDesc,
    ambient: Option<Sound>,
    pool: Vec<Sound>,
    timer: Duration,
    running: bool,
    torn_down: bool,
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for Soundscape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Soundscape")
            .field("name", &self.name)
            .field("sounds", &self.pool.len())
            .field("running", &self.running)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl Soundscape {
    /// Builds a soundscape with default scheduling.
    ///
    /// A non-`None` `ambient_path` creates the looping background sound. An
    /// ambient resource that fails to open is reported through the log and
    /// the soundscape stays usable without ambient audio.
    pub fn new(
        name: impl Into<String>,
        backend: &mut dyn AudioBackend,
        ambient_path: Option<&Path>,
    ) -> Self {
        Self::with_desc(name, backend, ambient_path, SoundscapeDesc::default())
    }

    /// Builds a soundscape with explicit scheduling configuration.
    pub fn with_desc(
        name: impl Into<String>,
        backend: &mut dyn AudioBackend,
        ambient_path: Option<&Path>,
        desc: SoundscapeDesc,
    ) -> Self {
        let name = name.into();
        let ambient =
            ambient_path.map(|path| Sound::from_file(format!("{name}/ambient"), 0.0, path, backend));
        Self {
            name,
            desc,
            ambient,
            pool: Vec::new(),
            timer: Duration::ZERO,
            running: false,
            torn_down: false,
            rng: Box::new(StdRng::from_os_rng()),
        }
    }

    /// Replaces the random source used for selection and trigger intervals.
    ///
    /// The default draws from OS entropy; inject a seeded generator for
    /// reproducible behavior.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }

    /// Builder form of [`set_rng`](Self::set_rng).
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The pooled sounds, in insertion order.
    pub fn sounds(&self) -> &[Sound] {
        &self.pool
    }

    /// Sum of the pool's weights, recomputed fresh.
    pub fn total_weight(&self) -> f32 {
        self.pool.iter().map(|s| s.weight()).sum()
    }

    /// Appends a sound to the trigger pool.
    ///
    /// Insertion order is preserved and is the walk order of the weighted
    /// draw. Sounds sharing a name are allowed and selected independently of
    /// each other.
    pub fn add_sound(&mut self, sound: Sound) -> Result<()> {
        self.guard()?;
        log::debug!(
            "soundscape `{}`: added `{}` (weight {})",
            self.name,
            sound.name(),
            sound.weight()
        );
        self.pool.push(sound);
        Ok(())
    }

    /// Starts the ambient loop (if any) and arms the trigger timer.
    ///
    /// Idempotent while running; a second call does not restart the ambient
    /// sound.
    pub fn start(&mut self, backend: &mut dyn AudioBackend) -> Result<()> {
        self.guard()?;
        if self.running {
            log::debug!("soundscape `{}` already running", self.name);
            return Ok(());
        }
        if let Some(ambient) = &self.ambient {
            if let Some(handle) = ambient.handle() {
                backend.set_looping(handle, true);
                if let Err(err) = backend.play(handle) {
                    log::warn!("soundscape `{}`: ambient failed to start: {err}", self.name);
                }
            }
        }
        self.timer = self.draw_interval();
        self.running = true;
        log::debug!(
            "soundscape `{}` started, first trigger in {:?}",
            self.name,
            self.timer
        );
        Ok(())
    }

    /// Advances the trigger timer by the elapsed time the caller supplies.
    ///
    /// When the timer expires, one weighted draw fires (empty and inert
    /// sounds count as fired silence) and the timer re-arms with a fresh
    /// random interval. At most one trigger fires per call, however large
    /// `dt` is. Returns what fired, if anything.
    ///
    /// Does nothing before [`start`](Self::start); errors after
    /// [`uninit`](Self::uninit).
    pub fn tick(
        &mut self,
        dt: Duration,
        backend: &mut dyn AudioBackend,
        speakers: &Speakers,
    ) -> Result<Option<Trigger>> {
        self.guard()?;
        if !self.running {
            return Ok(None);
        }
        if dt < self.timer {
            self.timer -= dt;
            return Ok(None);
        }
        self.timer = self.draw_interval();
        let index = self.select_weighted()?;
        Ok(Some(self.play_at(index, backend, speakers)))
    }

    /// Immediately selects and plays from the pool with the same weighted
    /// draw the trigger timer uses. The timer is neither consumed nor reset.
    pub fn play_sound(
        &mut self,
        backend: &mut dyn AudioBackend,
        speakers: &Speakers,
    ) -> Result<Trigger> {
        self.guard()?;
        let index = self.select_weighted()?;
        Ok(self.play_at(index, backend, speakers))
    }

    /// Like [`play_sound`](Self::play_sound), but draws only over sounds
    /// that can actually produce audio — empty and inert sounds are excluded
    /// from the weight universe, so this never retries.
    ///
    /// Errors with [`SusurrusError::NoNonEmptyCandidate`] when the pool
    /// holds no playable sound with positive weight.
    pub fn play_sound_skip_empty(
        &mut self,
        backend: &mut dyn AudioBackend,
        speakers: &Speakers,
    ) -> Result<Trigger> {
        self.guard()?;
        let total: f32 = self
            .pool
            .iter()
            .filter(|s| s.is_playable() && s.weight() > 0.0)
            .map(|s| s.weight())
            .sum();
        if !(total > 0.0) {
            return Err(SusurrusError::NoNonEmptyCandidate);
        }
        let draw = self.rng.random_range(0.0..total);
        let mut acc = 0.0;
        let mut selected = None;
        for (index, sound) in self.pool.iter().enumerate() {
            if !sound.is_playable() || sound.weight() <= 0.0 {
                continue;
            }
            selected = Some(index);
            acc += sound.weight();
            if draw < acc {
                break;
            }
        }
        match selected {
            Some(index) => Ok(self.play_at(index, backend, speakers)),
            None => Err(SusurrusError::NoNonEmptyCandidate),
        }
    }

    /// Stops the ambient loop and releases every engine-held source.
    ///
    /// Safe on a soundscape that was never started, idempotent, and must run
    /// before the backend (or any referenced speaker) is torn down. All
    /// later operations report [`SusurrusError::UseAfterUninit`].
    pub fn uninit(&mut self, backend: &mut dyn AudioBackend) {
        if self.torn_down {
            return;
        }
        if let Some(ambient) = &self.ambient {
            if let Some(handle) = ambient.handle() {
                backend.stop(handle);
                backend.destroy_source(handle);
            }
        }
        for sound in &self.pool {
            if let Some(handle) = sound.handle() {
                backend.destroy_source(handle);
            }
        }
        self.running = false;
        self.torn_down = true;
        log::debug!("soundscape `{}` released", self.name);
    }

    fn guard(&self) -> Result<()> {
        if self.torn_down {
            Err(SusurrusError::UseAfterUninit(self.name.clone()))
        } else {
            Ok(())
        }
    }

    fn draw_interval(&mut self) -> Duration {
        let mean = self.desc.tick_interval.as_secs_f32();
        let jitter = self.desc.interval_jitter.clamp(0.0, 1.0);
        let factor = if jitter > 0.0 {
            self.rng.random_range(1.0 - jitter..1.0 + jitter)
        } else {
            1.0
        };
        Duration::from_secs_f32((mean * factor).max(0.0))
    }

    /// Classic weighted roulette over the whole pool. The total is summed
    /// fresh on every call; the pool may have changed since the last draw.
    fn select_weighted(&mut self) -> Result<usize> {
        let total = self.total_weight();
        if !(total > 0.0) {
            return Err(SusurrusError::EmptyPool);
        }
        let draw = self.rng.random_range(0.0..total);
        let mut acc = 0.0;
        for (index, sound) in self.pool.iter().enumerate() {
            acc += sound.weight();
            if draw < acc {
                return Ok(index);
            }
        }
        // float accumulation can leave the draw a hair past the last bucket
        Ok(self.pool.len() - 1)
    }

    fn play_at(
        &mut self,
        index: usize,
        backend: &mut dyn AudioBackend,
        speakers: &Speakers,
    ) -> Trigger {
        let sound = &mut self.pool[index];
        let name = sound.name().to_owned();
        if sound.is_empty_sound() {
            log::trace!("soundscape `{}`: silence (`{name}`)", self.name);
            return Trigger::Silence { name };
        }
        let Some(handle) = sound.handle() else {
            log::warn!("soundscape `{}`: `{name}` is inert, nothing to play", self.name);
            return Trigger::Silence { name };
        };
        // Speakers take precedence over a configured pan program. The
        // position is a snapshot: moving the speaker afterwards only affects
        // the next play.
        if let Some(speaker_id) = sound.advance_speaker() {
            match speakers.get(speaker_id) {
                Some(speaker) => {
                    backend.set_position(handle, speaker.position, sound.positioning());
                }
                None => {
                    log::warn!(
                        "soundscape `{}`: `{name}` references removed {speaker_id}; playing unpositioned",
                        self.name
                    );
                }
            }
        } else if let Some((start, end)) = sound.pan_range() {
            backend.set_pan_sweep(handle, start, end);
        }
        if let Err(err) = backend.play(handle) {
            log::warn!("soundscape `{}`: `{name}` failed to play: {err}", self.name);
            return Trigger::Silence { name };
        }
        log::trace!("soundscape `{}`: playing `{name}`", self.name);
        Trigger::Played { name }
    }
}

impl std::fmt::Display for Soundscape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "soundscape `{}`: {} sounds, total weight {}",
            self.name,
            self.pool.len(),
            self.total_weight()
        )?;
        if let Some(ambient) = &self.ambient {
            let state = if ambient.is_inert() { "inert" } else { "ready" };
            writeln!(f, "  ambient `{}` ({state})", ambient.name())?;
        }
        for sound in &self.pool {
            let kind = if sound.is_empty_sound() {
                "empty"
            } else if sound.is_inert() {
                "inert"
            } else {
                "file"
            };
            writeln!(f, "  `{}` weight {} [{kind}]", sound.name(), sound.weight())?;
        }
        Ok(())
    }
}
