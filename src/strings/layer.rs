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

//! A single velocity layer of strings.

use tracing::debug;

use crate::engine::{GainNode, LoadError, RenderContext, SampleEngine, OUTPUT_CHANNELS};

/// Output gain of a layer with no damping applied.
pub const UNDAMPED_GAIN: f32 = 1.0;

/// Default length in seconds of the ramp used when damping a layer. Short enough to
/// feel immediate, long enough not to click.
pub const DEFAULT_GAIN_RAMP: f64 = 0.1;

/// Plays one velocity layer's samples through its own output gain.
pub struct LayerPlayer<E> {
    /// The sample set's velocity identifier for this layer.
    velocity: u8,
    engine: E,
    output: GainNode,
    /// Seconds taken to ramp to a new gain.
    gain_ramp: f64,
    /// Whether this layer contributes to the strings' output.
    connected: bool,
    /// Render buffer reused between blocks.
    scratch: Vec<f32>,
}

impl<E: SampleEngine> LayerPlayer<E> {
    /// Creates a disconnected layer around the given engine.
    pub fn new(velocity: u8, engine: E, gain_ramp: f64) -> Self {
        Self {
            velocity,
            engine,
            output: GainNode::new(UNDAMPED_GAIN),
            gain_ramp,
            connected: false,
            scratch: Vec::new(),
        }
    }

    /// Prepares the layer's samples.
    pub async fn load(&mut self) -> Result<(), LoadError> {
        self.engine.load().await?;
        debug!(velocity = self.velocity, "Layer loaded");
        Ok(())
    }

    /// Starts `note` at `time`. The damper is always fully off when a string is
    /// struck, so the output gain jumps back to unity at the same moment.
    pub fn trigger_attack(&mut self, note: &str, time: f64, gain: f32) {
        self.output.set_value_at_time(UNDAMPED_GAIN, time);
        self.engine.trigger_attack(note, time, gain);
    }

    /// Releases `note` at `time`.
    pub fn trigger_release(&mut self, note: &str, time: f64) {
        self.engine.trigger_release(note, time);
    }

    /// Ramps the output gain to `level`, starting at `time`.
    pub fn set_gain(&mut self, level: f32, time: f64) {
        self.output.ramp_to(level, self.gain_ramp, time);
    }

    /// Adds this layer's output into the interleaved block. Silent unless connected.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderContext) {
        if !self.connected {
            return;
        }

        self.scratch.clear();
        self.scratch.resize(out.len(), 0.0);
        self.engine.render(&mut self.scratch, ctx);

        for (frame, (out, rendered)) in out
            .chunks_mut(OUTPUT_CHANNELS)
            .zip(self.scratch.chunks(OUTPUT_CHANNELS))
            .enumerate()
        {
            let gain = self.output.value_at(ctx.frame_time(frame));
            for (sample, value) in out.iter_mut().zip(rendered) {
                *sample += value * gain;
            }
        }

        self.output.prune_before(ctx.start_time);
    }

    /// Adds this layer to the strings' output.
    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// Removes this layer from the strings' output and drops any pending gain
    /// automation, leaving the layer undamped.
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.output.set_value_now(UNDAMPED_GAIN);
    }

    /// Returns true if the layer contributes to the strings' output.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The sample set's velocity identifier for this layer.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// The layer's output gain.
    pub fn output(&self) -> &GainNode {
        &self.output
    }

    /// The layer's sample engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E> std::fmt::Debug for LayerPlayer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerPlayer")
            .field("velocity", &self.velocity)
            .field("connected", &self.connected)
            .field("gain_ramp", &self.gain_ramp)
            .finish()
    }
}
