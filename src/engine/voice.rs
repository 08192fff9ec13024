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

//! Voices for in-memory sample playback.

use tracing::debug;

use super::loader::LoadedSample;
use super::{RenderContext, OUTPUT_CHANNELS};

/// Level the release tail decays to before the voice is dropped (-60 dB).
const RELEASE_FLOOR: f32 = 0.001;

/// One sounding sample.
pub struct Voice {
    /// The MIDI note that triggered this voice (for release matching).
    note: u8,
    sample: LoadedSample,
    /// Time in seconds the sample starts.
    start_time: f64,
    /// Source frames advanced per second of output.
    frames_per_second: f64,
    amplitude: f32,
    /// Time in seconds the release tail starts, if released.
    release_time: Option<f64>,
    finished: bool,
}

impl Voice {
    /// Creates a voice that plays `sample` from `start_time`, pitched by `playback_rate`.
    pub fn new(
        note: u8,
        sample: LoadedSample,
        start_time: f64,
        playback_rate: f64,
        amplitude: f32,
    ) -> Self {
        let frames_per_second = sample.sample_rate() as f64 * playback_rate;
        Self {
            note,
            sample,
            start_time,
            frames_per_second,
            amplitude,
            release_time: None,
            finished: false,
        }
    }

    /// Starts the release tail at the given time. Later releases keep the earliest.
    fn release(&mut self, time: f64) {
        let time = time.max(self.start_time);
        self.release_time = Some(self.release_time.map_or(time, |r| r.min(time)));
    }

    /// Returns the envelope level at the given time for a release lasting `release` seconds.
    fn envelope(&self, time: f64, release: f64) -> Option<f32> {
        match self.release_time {
            Some(release_time) if time >= release_time => {
                let elapsed = time - release_time;
                if release <= 0.0 || elapsed >= release {
                    None
                } else {
                    Some(RELEASE_FLOOR.powf((elapsed / release) as f32))
                }
            }
            _ => Some(1.0),
        }
    }

    /// Adds this voice to the interleaved output block.
    fn render(&mut self, out: &mut [f32], ctx: &RenderContext, release: f64) {
        let frames = out.len() / OUTPUT_CHANNELS;
        for frame in 0..frames {
            let time = ctx.frame_time(frame);
            if time < self.start_time {
                continue;
            }

            let position = (time - self.start_time) * self.frames_per_second;
            if position >= self.sample.frames() as f64 {
                self.finished = true;
                return;
            }

            let Some(level) = self.envelope(time, release) else {
                self.finished = true;
                return;
            };

            let gain = self.amplitude * level;
            for channel in 0..OUTPUT_CHANNELS {
                out[frame * OUTPUT_CHANNELS + channel] +=
                    self.sample.read_interpolated(position, channel) * gain;
            }
        }
    }
}

/// The voices currently owned by one sampler.
#[derive(Default)]
pub struct Voices {
    voices: Vec<Voice>,
}

impl Voices {
    /// Adds a voice.
    pub fn add(&mut self, voice: Voice) {
        self.voices.push(voice);
    }

    /// Releases every voice playing the given note. Returns how many were released.
    pub fn release(&mut self, note: u8, time: f64) -> usize {
        let mut released = 0;
        for voice in self.voices.iter_mut().filter(|v| v.note == note) {
            voice.release(time);
            released += 1;
        }
        released
    }

    /// Renders every voice into `out` and drops the ones that have finished.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderContext, release: f64) {
        for voice in self.voices.iter_mut() {
            voice.render(out, ctx, release);
        }

        let before = self.voices.len();
        self.voices.retain(|v| !v.finished);
        let dropped = before - self.voices.len();
        if dropped > 0 {
            debug!(dropped, remaining = self.voices.len(), "Voices finished");
        }
    }

    /// Returns the current number of voices.
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }
}

impl std::fmt::Debug for Voices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voices")
            .field("active_voices", &self.voices.len())
            .finish()
    }
}
