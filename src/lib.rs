//! # Susurrus
//!
//! A tick-driven ambient soundscape scheduler: an always-on ambient loop, a
//! weighted pool of one-shot sounds (with silence as a first-class,
//! tunable outcome), and optional 3D speaker spatialization or stereo pan
//! automation per sound.
//!
//! Susurrus owns the *when* and *which* of ambient audio; the *how* is
//! delegated through the [`AudioBackend`] trait. [`DeviceBackend`] is the
//! shipped implementation (symphonia decoding, cpal output); anything that
//! can create, position, and play sources can stand in for it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use susurrus::*;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! // Open the default output device
//! let mut backend = DeviceBackend::new()?;
//!
//! // Speakers are owned by the caller; sounds reference them by id
//! let mut speakers = Speakers::new();
//! let porch = speakers.insert(Speaker::new("porch", Vec3::new(-5.0, 0.0, 0.0)));
//!
//! // Ambient loop + weighted one-shot pool
//! let mut scape = Soundscape::new("meadow", &mut backend, Some(Path::new("wind.ogg")));
//! let mut chirp = Sound::from_file("chirp", 2.0, Path::new("chirp.wav"), &mut backend);
//! chirp.attach_speaker(porch);
//! scape.add_sound(chirp)?;
//! scape.add_sound(Sound::empty(3.0))?; // silence, 3:2 odds against the chirp
//! scape.start(&mut backend)?;
//!
//! // Drive it from the update loop
//! for _ in 0..600 {
//!     scape.tick(Duration::from_millis(16), &mut backend, &speakers)?;
//!     backend.set_listener_position(Vec3::ZERO); // follow the camera
//! }
//! scape.uninit(&mut backend);
//! # Ok::<(), SusurrusError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`Soundscape`]**: owns the ambient loop and the trigger pool, runs the
//!   tick/selection scheduler
//! - **[`Sound`]**: a weighted one-shot — file-backed or an empty silence
//!   placeholder — with optional pan automation or speaker bindings
//! - **[`Speaker`]** / **[`Speakers`]**: caller-owned 3D emitter positions,
//!   referenced by sounds through [`SpeakerId`] handles
//! - **[`AudioBackend`]**: the engine seam (create/play/position sources,
//!   move the listener)
//! - **[`DeviceBackend`]**: the default engine on the system output device
//!
//! ## Scheduling model
//!
//! Everything is synchronous and single-threaded: `tick` is called from the
//! embedding's update loop with the elapsed time, and all scheduler state is
//! mutated only inside the explicit calls. When the trigger timer expires,
//! one weighted roulette draw picks the sound to fire — walking the pool in
//! insertion order makes selection reproducible under an injected seeded
//! random source ([`Soundscape::set_rng`]).

pub mod backend;
pub mod config;
pub mod error;
pub mod math;
pub mod sound;
pub mod soundscape;
pub mod speaker;

pub use backend::device::DeviceBackend;
pub use backend::{AudioBackend, BackendEvent, Positioning, SourceHandle};
pub use config::SoundscapeDesc;
pub use error::{Result, SusurrusError};
pub use math::Vec3;
pub use sound::Sound;
pub use soundscape::{Soundscape, Trigger};
pub use speaker::{Speaker, SpeakerId, Speakers};
