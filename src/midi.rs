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

//! Reads piano performances from Standard MIDI Files.

use std::fs;
use std::path::Path;

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::debug;

/// Tempo assumed until the file sets one: 120 BPM.
pub const DEFAULT_TEMPO: u32 = 500_000;

/// The sustain pedal controller.
const SUSTAIN_CONTROLLER: u8 = 64;

/// Errors raised while reading a MIDI file.
#[derive(Debug, thiserror::Error)]
pub enum MidiFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    Parse(#[from] midly::Error),
}

/// Something the pianist does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PianoEvent {
    /// A key goes down with the given velocity, 0.0 to 1.0.
    NoteOn { note: u8, velocity: f32 },
    /// A key comes up.
    NoteOff { note: u8 },
    /// The sustain pedal moves. 0.0 is up, 1.0 is fully down.
    Sustain { value: f32 },
}

/// A piano event at a time in seconds from the start of the performance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedEvent {
    pub time: f64,
    pub event: PianoEvent,
}

enum RawEvent {
    Piano(PianoEvent),
    Tempo(u32),
}

/// Reads every piano event in the given file, in time order.
pub fn read_events(path: &Path) -> Result<Vec<TimedEvent>, MidiFileError> {
    let buf = fs::read(path)?;
    let smf = Smf::parse(&buf)?;
    let events = events_from_smf(&smf);
    debug!(
        file = %path.display(),
        tracks = smf.tracks.len(),
        events = events.len(),
        "Read MIDI file"
    );
    Ok(events)
}

/// Merges the tracks of a parsed file into piano events in time order. Sequential
/// files play each track after the one before it.
pub fn events_from_smf(smf: &Smf) -> Vec<TimedEvent> {
    let mut raw: Vec<(u64, RawEvent)> = Vec::new();
    let mut track_start = 0u64;

    for track in smf.tracks.iter() {
        let mut tick = track_start;
        for event in track {
            tick += u64::from(event.delta.as_int());
            match event.kind {
                TrackEventKind::Midi { message, .. } => {
                    if let Some(event) = piano_event(message) {
                        raw.push((tick, RawEvent::Piano(event)));
                    }
                }
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    raw.push((tick, RawEvent::Tempo(tempo.as_int())));
                }
                _ => {}
            }
        }
        if matches!(smf.header.format, Format::Sequential) {
            track_start = tick;
        }
    }

    // Stable, so events on the same tick keep their track order.
    raw.sort_by_key(|(tick, _)| *tick);

    let timing = smf.header.timing;
    let mut tempo = DEFAULT_TEMPO;
    let mut last_tick = 0u64;
    let mut time = 0.0;
    let mut events = Vec::with_capacity(raw.len());

    for (tick, event) in raw {
        time += (tick - last_tick) as f64 * seconds_per_tick(timing, tempo);
        last_tick = tick;
        match event {
            RawEvent::Tempo(new_tempo) => tempo = new_tempo,
            RawEvent::Piano(event) => events.push(TimedEvent { time, event }),
        }
    }

    events
}

fn seconds_per_tick(timing: Timing, tempo: u32) -> f64 {
    match timing {
        Timing::Metrical(ppq) => {
            f64::from(tempo) / 1_000_000.0 / f64::from(ppq.as_int().max(1))
        }
        // Timecode timing ignores the tempo map.
        Timing::Timecode(fps, subframes) => {
            1.0 / (f64::from(fps.as_f32()) * f64::from(subframes.max(1)))
        }
    }
}

fn piano_event(message: MidiMessage) -> Option<PianoEvent> {
    match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => Some(PianoEvent::NoteOff {
            note: key.as_int(),
        }),
        MidiMessage::NoteOn { key, vel } => Some(PianoEvent::NoteOn {
            note: key.as_int(),
            velocity: f32::from(vel.as_int()) / 127.0,
        }),
        MidiMessage::NoteOff { key, .. } => Some(PianoEvent::NoteOff {
            note: key.as_int(),
        }),
        MidiMessage::Controller { controller, value }
            if controller.as_int() == SUSTAIN_CONTROLLER =>
        {
            Some(PianoEvent::Sustain {
                value: f32::from(value.as_int()) / 127.0,
            })
        }
        _ => None,
    }
}
