//! Audio file resolution and decoding
//!
//! Recordings are looked up by name in a library directory and decoded to a
//! mono sample sequence at the file's native sample rate. WAV files go
//! through `hound`; compressed formats (mp3, ogg) go through `symphonia`.

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::audio::AudioSignal;
use crate::error::AudioError;

/// Extensions probed when resolving a name, in priority order
const EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

/// Resolves an item name to a decoded mono signal
pub trait AudioSource {
    fn resolve(&self, name: &str) -> Result<AudioSignal, AudioError>;
}

/// Audio source backed by a directory of recordings
#[derive(Debug, Clone)]
pub struct FileAudioSource {
    dir: PathBuf,
}

impl FileAudioSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List the names of all recordings in the library, sorted.
    ///
    /// Preview clips (stems containing `_sample`) are excluded.
    pub fn catalog(&self) -> Result<Vec<String>, AudioError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|_| AudioError::FileNotFound(self.dir.display().to_string()))?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem.contains("_sample") {
                    continue;
                }
                names.push(stem.to_string());
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }

    fn locate(&self, name: &str) -> Result<PathBuf, AudioError> {
        for ext in EXTENSIONS {
            let candidate = self.dir.join(format!("{}.{}", name, ext));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(AudioError::FileNotFound(format!(
            "{}/{}.{{{}}}",
            self.dir.display(),
            name,
            EXTENSIONS.join(",")
        )))
    }
}

impl AudioSource for FileAudioSource {
    fn resolve(&self, name: &str) -> Result<AudioSignal, AudioError> {
        let path = self.locate(name)?;
        debug!("Decoding {}", path.display());

        let signal = match path.extension().and_then(|e| e.to_str()) {
            Some("wav") => decode_wav(&path)?,
            _ => decode_compressed(&path)?,
        };

        if signal.samples.is_empty() {
            return Err(AudioError::DegenerateSignal);
        }

        debug!(
            "Decoded {} samples at {} Hz ({:.1}s)",
            signal.samples.len(),
            signal.sample_rate,
            signal.duration_seconds()
        );
        Ok(signal)
    }
}

/// Decode a WAV file, downmixing to mono
fn decode_wav(path: &Path) -> Result<AudioSignal, AudioError> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| AudioError::Open(e.to_string()))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(|s| s.ok()).collect(),
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    let mono = downmix(&samples, spec.channels as usize);
    Ok(AudioSignal::new(mono, spec.sample_rate))
}

/// Decode a compressed file (mp3, ogg) via symphonia, downmixing to mono
fn decode_compressed(path: &Path) -> Result<AudioSignal, AudioError> {
    let file = File::open(path).map_err(|e| AudioError::Open(e.to_string()))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Probe(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut channels = 1usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    channels = spec.channels.count().max(1);
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    for frame in buf.samples().chunks_exact(channels) {
                        samples.push(frame.iter().sum::<f32>() / channels as f32);
                    }
                }
            }
            // A corrupt packet is not fatal; keep decoding the rest
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        }
    }

    Ok(AudioSignal::new(samples, sample_rate))
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
