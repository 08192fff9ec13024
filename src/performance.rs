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

//! Plays piano events on the strings, including the sustain pedal.

use std::collections::BTreeSet;

use tracing::debug;

use crate::engine::SampleEngine;
use crate::midi::PianoEvent;
use crate::strings::PianoStrings;

/// Tracks the sustain pedal and the notes it is holding.
#[derive(Debug, Default)]
pub struct Performance {
    /// Pedal position. 0.0 is up, 1.0 is fully down.
    sustain: f32,
    /// Notes whose keys are up but are still sounding because of the pedal.
    sustained: BTreeSet<u8>,
}

impl Performance {
    /// Creates a performance with the pedal up.
    pub fn new() -> Performance {
        Performance::default()
    }

    /// Applies the event at `time`. Damping happens at the strings' clock time, so
    /// the clock should already read `time`.
    pub fn apply<E: SampleEngine>(
        &mut self,
        strings: &mut PianoStrings<E>,
        time: f64,
        event: PianoEvent,
    ) {
        match event {
            PianoEvent::NoteOn { note, velocity } => {
                self.sustained.remove(&note);
                strings.trigger_attack(note, time, velocity);
            }
            PianoEvent::NoteOff { note } => {
                if self.pedal_down() {
                    self.sustained.insert(note);
                    if self.sustain < 1.0 {
                        strings.dampen_string(note, self.sustain);
                    }
                } else {
                    strings.trigger_release(note, time);
                }
            }
            PianoEvent::Sustain { value } => self.set_sustain(strings, time, value),
        }
    }

    /// Releases everything still sounding at `time` and lifts the pedal.
    pub fn finish<E: SampleEngine>(&mut self, strings: &mut PianoStrings<E>, time: f64) {
        self.sustain = 0.0;
        self.sustained.clear();
        strings.release_all(time);
    }

    /// Returns true if the pedal is down at all.
    pub fn pedal_down(&self) -> bool {
        self.sustain > 0.0
    }

    /// Returns the notes held only by the pedal, lowest first.
    pub fn sustained(&self) -> impl Iterator<Item = u8> + '_ {
        self.sustained.iter().copied()
    }

    fn set_sustain<E: SampleEngine>(
        &mut self,
        strings: &mut PianoStrings<E>,
        time: f64,
        value: f32,
    ) {
        let value = value.clamp(0.0, 1.0);
        self.sustain = value;

        if value > 0.0 {
            for note in self.sustained.iter() {
                strings.dampen_string(*note, value);
            }
            debug!(value, sustained = self.sustained.len(), "Pedal moved");
            return;
        }

        debug!(released = self.sustained.len(), "Pedal up");
        for note in std::mem::take(&mut self.sustained) {
            strings.trigger_release(note, time);
        }
    }
}
