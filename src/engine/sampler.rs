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

//! A sample engine that plays decoded samples from memory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::loader::{LoadedSample, SampleLoader};
use super::voice::{Voice, Voices};
use super::{LoadError, RenderContext, SampleEngine};
use crate::note::note_to_midi;
use crate::util::db_to_gain;

/// Furthest distance in semitones to look for a sample to repitch.
pub const MAX_INTERVAL: u8 = 96;

/// Default release tail length.
pub const DEFAULT_RELEASE: Duration = Duration::from_millis(400);

/// Default output boost applied to every sample, in dB.
pub const DEFAULT_VOLUME_DB: f32 = 3.0;

/// Default render sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Playback settings shared by every layer's sampler.
#[derive(Clone, Copy, Debug)]
pub struct SamplerOptions {
    /// Length of the release tail.
    pub release: Duration,
    /// Output boost in dB.
    pub volume_db: f32,
    /// Sample rate samples are converted to on load.
    pub sample_rate: u32,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        SamplerOptions {
            release: DEFAULT_RELEASE,
            volume_db: DEFAULT_VOLUME_DB,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Plays one velocity layer's samples, repitching the nearest sampled note for notes
/// that were not recorded.
pub struct MemorySampler {
    /// Files to load, by MIDI note.
    files: HashMap<u8, PathBuf>,
    /// Decoded samples, by MIDI note. Empty until loaded.
    samples: HashMap<u8, LoadedSample>,
    voices: Voices,
    options: SamplerOptions,
}

impl MemorySampler {
    /// Creates a sampler for the given note files. Nothing is read until `load`.
    pub fn new(files: HashMap<u8, PathBuf>, options: SamplerOptions) -> Self {
        Self {
            files,
            samples: HashMap::new(),
            voices: Voices::default(),
            options,
        }
    }

    /// Creates a sampler from samples that are already in memory.
    pub fn from_samples(samples: HashMap<u8, LoadedSample>, options: SamplerOptions) -> Self {
        Self {
            files: HashMap::new(),
            samples,
            voices: Voices::default(),
            options,
        }
    }

    /// Returns the number of sounding voices.
    pub fn active_voice_count(&self) -> usize {
        self.voices.active_count()
    }

    /// Returns the memory used by decoded samples.
    pub fn memory_usage(&self) -> usize {
        self.samples.values().map(|s| s.memory_size()).sum()
    }

    /// Finds the closest sampled note and the interval (in semitones) to pitch it by.
    /// Prefers the sample above when two are equally close.
    fn closest(&self, midi: u8) -> Option<(u8, i32)> {
        (0..MAX_INTERVAL as i32).find_map(|interval| {
            let above = midi as i32 + interval;
            let below = midi as i32 - interval;
            [(above, -interval), (below, interval)]
                .into_iter()
                .filter_map(|(candidate, shift)| {
                    let note = u8::try_from(candidate).ok()?;
                    self.samples.contains_key(&note).then_some((note, shift))
                })
                .next()
        })
    }
}

impl SampleEngine for MemorySampler {
    async fn load(&mut self) -> Result<(), LoadError> {
        let files = self.files.clone();
        let sample_rate = self.options.sample_rate;

        let samples = tokio::task::spawn_blocking(move || {
            let mut loader = SampleLoader::new(sample_rate);
            files
                .into_iter()
                .map(|(note, path)| loader.load(&path).map(|sample| (note, sample)))
                .collect::<Result<HashMap<u8, LoadedSample>, LoadError>>()
        })
        .await??;

        self.samples.extend(samples);
        info!(
            samples = self.samples.len(),
            memory_kb = self.memory_usage() / 1024,
            "Sampler loaded"
        );
        Ok(())
    }

    fn trigger_attack(&mut self, note: &str, time: f64, velocity: f32) {
        let Some(midi) = note_to_midi(note) else {
            warn!(note, "Unrecognized note name");
            return;
        };
        let Some((sampled, interval)) = self.closest(midi) else {
            warn!(note, "No sample within range of note");
            return;
        };
        let Some(sample) = self.samples.get(&sampled) else {
            return;
        };

        let playback_rate = 2f64.powf(interval as f64 / 12.0);
        let amplitude = velocity * db_to_gain(self.options.volume_db);
        self.voices.add(Voice::new(
            midi,
            sample.clone(),
            time,
            playback_rate,
            amplitude,
        ));
        debug!(note, sampled, interval, time, velocity, "Voice started");
    }

    fn trigger_release(&mut self, note: &str, time: f64) {
        let Some(midi) = note_to_midi(note) else {
            warn!(note, "Unrecognized note name");
            return;
        };
        let released = self.voices.release(midi, time);
        debug!(note, time, released, "Voices released");
    }

    fn render(&mut self, out: &mut [f32], ctx: &RenderContext) {
        self.voices
            .render(out, ctx, self.options.release.as_secs_f64());
    }
}

impl std::fmt::Debug for MemorySampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySampler")
            .field("files", &self.files.len())
            .field("samples", &self.samples.len())
            .field("voices", &self.voices)
            .field("memory_kb", &(self.memory_usage() / 1024))
            .finish()
    }
}
