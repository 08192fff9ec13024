// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Sample decoding and caching.
//!
//! Samples are decoded entirely into memory before playback so that attacks never
//! touch the disk.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use super::LoadError;

/// A decoded sample. The data is shared so voices can play it without copying.
#[derive(Clone)]
pub struct LoadedSample {
    /// Interleaved f32 samples.
    data: Arc<Vec<f32>>,
    channel_count: u16,
    sample_rate: u32,
}

impl LoadedSample {
    /// Wraps already decoded interleaved samples.
    pub fn new(data: Vec<f32>, channel_count: u16, sample_rate: u32) -> LoadedSample {
        LoadedSample {
            data: Arc::new(data),
            channel_count: channel_count.max(1),
            sample_rate,
        }
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Returns the sample rate of the data.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.data.len() / self.channel_count as usize
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// Reads one channel at a fractional frame position with linear interpolation.
    /// Channels past the last one fold back onto the last channel, so mono samples
    /// play on both sides. Positions outside the sample read as silence.
    pub fn read_interpolated(&self, position: f64, channel: usize) -> f32 {
        let frames = self.frames();
        if position < 0.0 || frames == 0 {
            return 0.0;
        }
        let frame = position.floor() as usize;
        if frame >= frames {
            return 0.0;
        }

        let channels = self.channel_count as usize;
        let channel = channel.min(channels - 1);
        let s0 = self.data[frame * channels + channel];
        let s1 = self
            .data
            .get((frame + 1) * channels + channel)
            .copied()
            .unwrap_or(0.0);
        let frac = (position - frame as f64) as f32;
        s0 + (s1 - s0) * frac
    }
}

/// Decodes sample files and caches them by path.
pub struct SampleLoader {
    cache: HashMap<PathBuf, LoadedSample>,
    /// Sample rate every loaded sample is converted to.
    target_sample_rate: u32,
}

impl SampleLoader {
    /// Creates a new sample loader.
    pub fn new(target_sample_rate: u32) -> Self {
        Self {
            cache: HashMap::new(),
            target_sample_rate,
        }
    }

    /// Loads a sample from a file into memory.
    /// Returns a cached version if already loaded.
    pub fn load(&mut self, path: &Path) -> Result<LoadedSample, LoadError> {
        if let Some(sample) = self.cache.get(path) {
            debug!(path = ?path, "Using cached sample");
            return Ok(sample.clone());
        }

        let (samples, channel_count, source_sample_rate) = decode_file(path)?;
        if samples.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }

        let samples = if source_sample_rate != self.target_sample_rate {
            debug!(
                path = ?path,
                source_rate = source_sample_rate,
                target_rate = self.target_sample_rate,
                "Transcoding sample"
            );
            transcode_samples(
                &samples,
                channel_count,
                source_sample_rate,
                self.target_sample_rate,
            )
        } else {
            samples
        };

        let loaded = LoadedSample::new(samples, channel_count, self.target_sample_rate);
        let duration =
            Duration::from_secs_f64(loaded.frames() as f64 / self.target_sample_rate as f64);
        info!(
            path = ?path,
            channels = channel_count,
            duration_ms = duration.as_millis(),
            memory_kb = loaded.memory_size() / 1024,
            "Sample loaded"
        );

        self.cache.insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    /// Returns the total memory used by cached samples.
    pub fn total_memory_usage(&self) -> usize {
        self.cache.values().map(|s| s.memory_size()).sum()
    }
}

impl std::fmt::Debug for SampleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleLoader")
            .field("cached_samples", &self.cache.len())
            .field("target_sample_rate", &self.target_sample_rate)
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}

/// Decodes a whole audio file (WAV, MP3, FLAC, OGG, ...) into interleaved f32 samples.
/// Returns the samples, the channel count and the file's sample rate.
fn decode_file(path: &Path) -> Result<(Vec<f32>, u16, u32), LoadError> {
    let decode_error = |source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_error)?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| LoadError::NoAudioTrack(path.to_path_buf()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_error)?;

    let mut samples = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(decode_error(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt packets are skipped rather than failing the whole sample.
            Err(SymphoniaError::DecodeError(e)) => {
                debug!(path = ?path, error = e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(decode_error(e)),
        };

        let spec = *decoded.spec();
        if channels == 0 {
            channels = spec.channels.count() as u16;
        }
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    if channels == 0 || sample_rate == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    Ok((samples, channels, sample_rate))
}

/// Transcodes samples from one sample rate to another using linear interpolation.
/// Piano samples are long and tonal, but the render rate almost always matches the
/// sample set, so this path is rarely hit.
fn transcode_samples(
    samples: &[f32],
    channel_count: u16,
    source_rate: u32,
    target_rate: u32,
) -> Vec<f32> {
    let ratio = target_rate as f64 / source_rate as f64;
    let channels = channel_count.max(1) as usize;
    let source_frames = samples.len() / channels;
    let target_frames = (source_frames as f64 * ratio).ceil() as usize;

    let mut output = Vec::with_capacity(target_frames * channels);
    for target_frame in 0..target_frames {
        let source_pos = target_frame as f64 / ratio;
        let source_frame = source_pos.floor() as usize;
        let frac = source_pos.fract() as f32;

        for channel in 0..channels {
            let s0 = samples
                .get(source_frame * channels + channel)
                .copied()
                .unwrap_or(0.0);
            let s1 = samples
                .get((source_frame + 1) * channels + channel)
                .copied()
                .unwrap_or(s0);
            output.push(s0 + (s1 - s0) * frac);
        }
    }

    output
}
