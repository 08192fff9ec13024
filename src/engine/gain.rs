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

//! Scheduled gain automation.

/// How the gain moves from the previous event to this one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    /// Jump to the value at the event time.
    Step,
    /// Move linearly from the previous event's value, arriving at the event time.
    Linear,
}

/// A point on the gain automation timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainEvent {
    pub time: f64,
    pub value: f32,
    pub curve: Curve,
}

/// A gain control whose value can be scheduled ahead of time.
///
/// Every scheduling call cancels any automation at or after its start time and
/// holds the value there, so the timeline is always sorted by time.
#[derive(Clone, Debug)]
pub struct GainNode {
    /// Value before the first event.
    initial: f32,
    events: Vec<GainEvent>,
}

impl GainNode {
    /// Creates a gain node holding the given value.
    pub fn new(value: f32) -> GainNode {
        GainNode {
            initial: value,
            events: Vec::new(),
        }
    }

    /// Replaces all automation with the given value.
    pub fn set_value_now(&mut self, level: f32) {
        self.initial = level;
        self.events.clear();
    }

    /// Jumps to `level` at `time`.
    pub fn set_value_at_time(&mut self, level: f32, time: f64) {
        self.cancel_from(time);
        self.events.push(GainEvent {
            time,
            value: level,
            curve: Curve::Step,
        });
    }

    /// Ramps linearly from the value held at `start_time` to `level` over `duration` seconds.
    pub fn ramp_to(&mut self, level: f32, duration: f64, start_time: f64) {
        let held = self.value_at(start_time);
        self.set_value_at_time(held, start_time);
        self.events.push(GainEvent {
            time: start_time + duration.max(0.0),
            value: level,
            curve: Curve::Linear,
        });
    }

    /// Returns the gain at the given time.
    pub fn value_at(&self, time: f64) -> f32 {
        let next = self.events.partition_point(|e| e.time <= time);
        let (prev_time, prev_value) = match next.checked_sub(1) {
            Some(i) => (self.events[i].time, self.events[i].value),
            None => (f64::NEG_INFINITY, self.initial),
        };

        match self.events.get(next) {
            Some(event) if event.curve == Curve::Linear && prev_time.is_finite() => {
                let progress = ((time - prev_time) / (event.time - prev_time)) as f32;
                prev_value + (event.value - prev_value) * progress
            }
            _ => prev_value,
        }
    }

    /// Folds every event that finished before `time` into the initial value.
    pub fn prune_before(&mut self, time: f64) {
        let done = self.events.partition_point(|e| e.time <= time);
        if done == 0 {
            return;
        }
        // The last finished event still anchors a ramp that ends after `time`.
        let keep_from = match self.events.get(done) {
            Some(event) if event.curve == Curve::Linear => done - 1,
            _ => done,
        };
        if keep_from > 0 {
            self.initial = self.events[keep_from - 1].value;
            self.events.drain(..keep_from);
        }
    }

    /// The scheduled automation, oldest first.
    pub fn events(&self) -> &[GainEvent] {
        &self.events
    }

    fn cancel_from(&mut self, time: f64) {
        let keep = self.events.partition_point(|e| e.time < time);
        self.events.truncate(keep);
    }
}

impl Default for GainNode {
    fn default() -> Self {
        GainNode::new(1.0)
    }
}
