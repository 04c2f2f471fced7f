//! Symphonia-based file decoding for the device backend.
//!
//! Every decodable format symphonia enables by default (WAV, FLAC, OGG,
//! Vorbis, ...) is accepted. Output is mono f32 PCM; multi-channel files are
//! downmixed by averaging, since a voice is positioned or panned as a single
//! emitter anyway.

use crate::error::{Result, SusurrusError};
use std::fs::File;
use std::path::Path;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

#[derive(Debug)]
pub(crate) struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

pub(crate) fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let open_err = |reason: String| SusurrusError::ResourceOpen {
        path: path.display().to_string(),
        reason,
    };

    let file = File::open(path).map_err(|e| open_err(e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| open_err(format!("unrecognized audio format: {e:?}")))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| open_err("no default audio track".to_owned()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| SusurrusError::Decode("sample rate not found".to_owned()))?;
    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| SusurrusError::Decode("channel count not found".to_owned()))?
        .count();

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| SusurrusError::Decode(format!("failed to create decoder: {e:?}")))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break, // end-of-file
            Err(e) => {
                return Err(SusurrusError::Decode(format!("error reading packet: {e:?}")));
            }
        };
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::IoError(_)) => break, // also EOF in some formats
            Err(Error::DecodeError(_)) => continue, // recoverable corruption
            Err(e) => {
                return Err(SusurrusError::Decode(format!("error decoding packet: {e:?}")));
            }
        };

        let spec = *decoded.spec();
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    let mono = if channels <= 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    log::debug!(
        "decoded `{}`: {} frames at {} Hz ({} channels)",
        path.display(),
        mono.len(),
        sample_rate,
        channels
    );
    Ok(DecodedAudio {
        samples: mono,
        sample_rate,
    })
}
