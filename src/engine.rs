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

//! Sample playback engines.
//!
//! This module provides:
//! - The `SampleEngine` trait that each velocity layer drives
//! - Gain automation for layer outputs
//! - An in-memory sampler that decodes sample files up front
//! - A recording engine for tests

use std::future::Future;
use std::path::PathBuf;

mod gain;
mod loader;
#[cfg(test)]
pub mod mock;
mod sampler;
mod voice;

pub use gain::GainNode;
pub use loader::{LoadedSample, SampleLoader};
pub use sampler::{MemorySampler, SamplerOptions, DEFAULT_SAMPLE_RATE, DEFAULT_VOLUME_DB};

/// Number of interleaved output channels every engine renders.
pub const OUTPUT_CHANNELS: usize = 2;

/// Errors raised while preparing an engine's samples.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    #[error("No audio track found in {0}")]
    NoAudioTrack(PathBuf),

    #[error("No audio data in {0}")]
    Empty(PathBuf),

    #[error("Sample loading task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Describes the block of audio being rendered.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext {
    /// Output sample rate.
    pub sample_rate: u32,
    /// Time in seconds of the first frame in the block.
    pub start_time: f64,
}

impl RenderContext {
    /// Returns the time in seconds of the given frame within the block.
    pub fn frame_time(&self, frame: usize) -> f64 {
        self.start_time + frame as f64 / self.sample_rate as f64
    }
}

/// A sample player for one velocity layer. Times are in seconds on the shared clock.
pub trait SampleEngine: Send {
    /// Prepares the engine's samples. Not re-entrant: callers await one load at a time.
    fn load(&mut self) -> impl Future<Output = Result<(), LoadError>> + Send;

    /// Starts the given note (e.g. "C4") at `time` with the given amplitude.
    fn trigger_attack(&mut self, note: &str, time: f64, velocity: f32);

    /// Releases the given note at `time`, letting its release tail play out.
    fn trigger_release(&mut self, note: &str, time: f64);

    /// Adds this engine's audio into `out`, interleaved with `OUTPUT_CHANNELS` channels.
    fn render(&mut self, out: &mut [f32], ctx: &RenderContext);
}
