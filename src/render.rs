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

//! Offline rendering of a performance to a WAV file.

use std::path::Path;
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info};

use crate::clock::ManualClock;
use crate::config::DEFAULT_TAIL;
use crate::engine::{RenderContext, SampleEngine, DEFAULT_SAMPLE_RATE, OUTPUT_CHANNELS};
use crate::midi::TimedEvent;
use crate::performance::Performance;
use crate::strings::PianoStrings;

/// Default number of frames rendered per block.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Settings for an offline render.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub sample_rate: u32,
    /// Frames per block. Events are applied at block boundaries and scheduled
    /// within the block at their exact times.
    pub block_size: usize,
    /// Silence rendered after the last event.
    pub tail: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            tail: DEFAULT_TAIL,
        }
    }
}

/// What a render produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSummary {
    pub frames: u64,
    pub events: usize,
    pub duration: Duration,
}

/// Plays `events` on the strings and writes the result to `path` as a 32-bit float
/// stereo WAV file. The clock is moved to each event's time as it is applied.
pub fn render_to_wav<E: SampleEngine>(
    strings: &mut PianoStrings<E>,
    events: &[TimedEvent],
    clock: &ManualClock,
    options: &RenderOptions,
    path: &Path,
) -> Result<RenderSummary, hound::Error> {
    let sample_rate = options.sample_rate.max(1);
    let block_size = options.block_size.max(1);
    let last_time = events.last().map_or(0.0, |e| e.time.max(0.0));
    let total_frames = ((last_time + options.tail.as_secs_f64()) * f64::from(sample_rate))
        .round() as u64;

    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: OUTPUT_CHANNELS as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    )?;
    info!(
        file = %path.display(),
        events = events.len(),
        frames = total_frames,
        sample_rate,
        "Rendering"
    );

    let mut performance = Performance::new();
    let mut next_event = 0;
    let mut finished = false;
    let mut buffer = vec![0.0f32; block_size * OUTPUT_CHANNELS];
    let mut frame = 0u64;

    while frame < total_frames {
        let frames = block_size.min((total_frames - frame) as usize);
        let ctx = RenderContext {
            sample_rate,
            start_time: frame as f64 / f64::from(sample_rate),
        };
        let block_end = ctx.frame_time(frames);

        while let Some(event) = events.get(next_event).filter(|e| e.time < block_end) {
            clock.set(event.time);
            performance.apply(strings, event.time, event.event);
            next_event += 1;
        }
        if !finished && next_event == events.len() {
            clock.set(last_time);
            performance.finish(strings, last_time);
            finished = true;
            debug!(time = last_time, "Performance finished");
        }

        let block = &mut buffer[..frames * OUTPUT_CHANNELS];
        block.fill(0.0);
        strings.render(block, &ctx);
        for sample in block.iter() {
            writer.write_sample(*sample)?;
        }

        frame += frames as u64;
    }

    // Events at the very end of a render with no tail land past the last block.
    for event in &events[next_event..] {
        clock.set(event.time);
        performance.apply(strings, event.time, event.event);
        next_event += 1;
    }
    if !finished {
        clock.set(last_time);
        performance.finish(strings, last_time);
        debug!(time = last_time, "Performance finished");
    }

    writer.finalize()?;

    let summary = RenderSummary {
        frames: total_frames,
        events: next_event,
        duration: Duration::from_secs_f64(total_frames as f64 / f64::from(sample_rate)),
    };
    info!(
        file = %path.display(),
        frames = summary.frames,
        events = summary.events,
        "Render complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::Clock;
    use crate::engine::mock::{self, Call};
    use crate::midi::PianoEvent;
    use crate::strings::{LayerPlayer, DEFAULT_GAIN_RAMP};

    async fn loaded_strings(clock: &ManualClock) -> PianoStrings<mock::Engine> {
        let log = mock::call_log();
        let layers = vec![LayerPlayer::new(
            8,
            mock::Engine::new(0, log).with_level(0.25),
            DEFAULT_GAIN_RAMP,
        )];
        let mut strings = PianoStrings::new(layers, Arc::new(clock.clone()));
        strings.load().await.unwrap();
        strings
    }

    fn read_samples(path: &Path) -> (WavSpec, Vec<f32>) {
        let mut reader = hound::WavReader::open(path).unwrap();
        let spec = reader.spec();
        let samples = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        (spec, samples)
    }

    #[tokio::test]
    async fn test_render_applies_events_by_block() {
        let clock = ManualClock::new();
        let mut strings = loaded_strings(&clock).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let events = vec![
            TimedEvent {
                time: 0.0,
                event: PianoEvent::NoteOn {
                    note: 60,
                    velocity: 0.5,
                },
            },
            TimedEvent {
                time: 0.01,
                event: PianoEvent::NoteOff { note: 60 },
            },
        ];
        let options = RenderOptions {
            sample_rate: 1000,
            block_size: 8,
            tail: Duration::from_millis(50),
        };

        let summary = render_to_wav(&mut strings, &events, &clock, &options, &path).unwrap();
        assert_eq!(summary.frames, 60);
        assert_eq!(summary.events, 2);
        assert_eq!(clock.now(), 0.01);
        assert_eq!(strings.active_note_count(), 0);

        let (spec, samples) = read_samples(&path);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 1000);
        assert_eq!(spec.sample_format, SampleFormat::Float);
        assert_eq!(samples.len(), 120);
        // The note is held for the first block only.
        assert!(samples[..16].iter().all(|s| *s == 0.25));
        assert!(samples[16..].iter().all(|s| *s == 0.0));
    }

    #[tokio::test]
    async fn test_render_releases_notes_left_sounding() {
        let clock = ManualClock::new();
        let mut strings = loaded_strings(&clock).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let events = vec![
            TimedEvent {
                time: 0.0,
                event: PianoEvent::Sustain { value: 1.0 },
            },
            TimedEvent {
                time: 0.0,
                event: PianoEvent::NoteOn {
                    note: 64,
                    velocity: 1.0,
                },
            },
        ];
        let options = RenderOptions {
            sample_rate: 1000,
            block_size: 16,
            tail: Duration::from_millis(20),
        };

        let summary = render_to_wav(&mut strings, &events, &clock, &options, &path).unwrap();
        assert_eq!(summary.frames, 20);
        assert_eq!(strings.active_note_count(), 0);
    }

    #[tokio::test]
    async fn test_render_without_tail_applies_final_events() {
        let clock = ManualClock::new();
        let log = mock::call_log();
        let layers = vec![LayerPlayer::new(
            8,
            mock::Engine::new(0, log.clone()),
            DEFAULT_GAIN_RAMP,
        )];
        let mut strings = PianoStrings::new(layers, Arc::new(clock.clone()));
        strings.load().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let events = vec![
            TimedEvent {
                time: 0.0,
                event: PianoEvent::NoteOn {
                    note: 60,
                    velocity: 0.5,
                },
            },
            TimedEvent {
                time: 0.5,
                event: PianoEvent::NoteOff { note: 60 },
            },
        ];
        let options = RenderOptions {
            sample_rate: 1000,
            block_size: 100,
            tail: Duration::ZERO,
        };

        let summary = render_to_wav(&mut strings, &events, &clock, &options, &path).unwrap();
        assert_eq!(summary.frames, 500);
        assert_eq!(summary.events, 2);
        assert_eq!(strings.active_note_count(), 0);
        assert_eq!(clock.now(), 0.5);
        assert_eq!(
            log.lock().last(),
            Some(&(
                0,
                Call::Release {
                    note: "C4".to_string(),
                    time: 0.5
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_render_no_events_is_tail_only() {
        let clock = ManualClock::new();
        let mut strings = loaded_strings(&clock).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let options = RenderOptions {
            sample_rate: 100,
            ..Default::default()
        };
        let summary = render_to_wav(&mut strings, &[], &clock, &options, &path).unwrap();
        assert_eq!(summary.frames, 200);
        assert_eq!(summary.duration, Duration::from_secs(2));

        let (_, samples) = read_samples(&path);
        assert_eq!(samples.len(), 400);
        assert!(samples.iter().all(|s| *s == 0.0));
    }
}
