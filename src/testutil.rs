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

use std::error::Error;
use std::path::PathBuf;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Writes a 32-bit float WAV file. Each inner Vec is one channel; all channels
/// must be the same length.
pub fn write_wav(
    path: PathBuf,
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let num_channels = channels.len();
    assert!(num_channels <= u16::MAX.into(), "Too many channels!");
    let frames = channels.first().map(|c| c.len()).unwrap_or(0);
    assert!(
        channels.iter().all(|c| c.len() == frames),
        "Channels must be the same length"
    );

    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: num_channels as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    )?;

    for frame in 0..frames {
        for channel in &channels {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Generates a sine wave of the given frequency and amplitude.
pub fn sine(frequency: f32, amplitude: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Calculate RMS (Root Mean Square) of a signal
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|&x| x * x).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
