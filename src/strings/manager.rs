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

//! Manages all of the hammered string sounds.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{debug, error, info};

use super::layer::LayerPlayer;
use super::selection::select_layer;
use crate::clock::Clock;
use crate::config::{ConfigError, PianoConfig};
use crate::engine::{LoadError, RenderContext, SampleEngine};
use crate::library::SampleLibrary;
use crate::note::midi_to_note;

/// Owns one layer player per velocity layer and tracks which layer is sounding
/// each note.
pub struct PianoStrings<E> {
    /// Velocity layers, softest first.
    layers: Vec<LayerPlayer<E>>,
    /// Maps a sounding MIDI note to the index of the layer playing it.
    active_notes: HashMap<u8, usize>,
    /// Time source for changes that happen "now".
    clock: Arc<dyn Clock>,
    loaded: bool,
}

impl<E: SampleEngine> PianoStrings<E> {
    /// Creates strings from already built layers, softest first.
    pub fn new(layers: Vec<LayerPlayer<E>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            layers,
            active_notes: HashMap::new(),
            clock,
            loaded: false,
        }
    }

    /// Creates one layer per configured velocity, with an engine built by
    /// `make_engine` from the layer's velocity identifier and its note files.
    pub fn from_library<F>(
        config: &PianoConfig,
        library: &dyn SampleLibrary,
        clock: Arc<dyn Clock>,
        mut make_engine: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(u8, HashMap<u8, PathBuf>) -> E,
    {
        let velocities = library
            .velocity_layers(config.velocities())
            .ok_or(ConfigError::UnsupportedVelocities(config.velocities()))?;
        let gain_ramp = config.gain_ramp()?.as_secs_f64();

        let layers = velocities
            .into_iter()
            .map(|velocity| {
                let files = library.layer_files(config.min_note(), config.max_note(), velocity);
                LayerPlayer::new(velocity, make_engine(velocity, files), gain_ramp)
            })
            .collect();

        Ok(Self::new(layers, clock))
    }

    /// Loads every layer concurrently. Each layer joins the output once its own
    /// samples are ready. If any layer fails, every layer is disconnected and the
    /// first error is returned.
    pub async fn load(&mut self) -> Result<(), LoadError> {
        info!(layers = self.layers.len(), "Loading strings");

        let result = try_join_all(self.layers.iter_mut().map(|layer| async move {
            layer.load().await?;
            layer.connect();
            Ok::<(), LoadError>(())
        }))
        .await;

        if let Err(e) = result {
            for layer in self.layers.iter_mut() {
                layer.disconnect();
            }
            self.loaded = false;
            error!(err = %e, "Failed to load strings");
            return Err(e);
        }

        self.loaded = true;
        info!(layers = self.layers.len(), "Strings loaded");
        Ok(())
    }

    /// Returns true once every layer has loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Strikes `midi` at `time` with `velocity` (0.0 to 1.0). A note that is already
    /// sounding is released first. Strikes that map past the last layer are dropped.
    pub fn trigger_attack(&mut self, midi: u8, time: f64, velocity: f32) {
        let selection = select_layer(velocity, self.layers.len());

        if self.active_notes.contains_key(&midi) {
            self.trigger_release(midi, time);
        }

        let Some(selection) = selection else {
            debug!(midi, velocity, "No layer for velocity, dropping strike");
            return;
        };
        let Some(layer) = self.layers.get_mut(selection.index) else {
            return;
        };

        self.active_notes.insert(midi, selection.index);
        layer.trigger_attack(&midi_to_note(midi), time, selection.gain);
        debug!(
            midi,
            time,
            velocity,
            layer = selection.index,
            gain = selection.gain,
            "String struck"
        );
    }

    /// Releases `midi` at `time`. Does nothing if the note isn't sounding.
    pub fn trigger_release(&mut self, midi: u8, time: f64) {
        let Some(index) = self.active_notes.remove(&midi) else {
            return;
        };
        if let Some(layer) = self.layers.get_mut(index) {
            layer.trigger_release(&midi_to_note(midi), time);
            debug!(midi, time, layer = index, "String released");
        }
    }

    /// Simulates partial pedaling by moving a sounding note's layer gain to
    /// `level`, starting now. Does nothing if the note isn't sounding.
    pub fn dampen_string(&mut self, midi: u8, level: f32) {
        let Some(&index) = self.active_notes.get(&midi) else {
            return;
        };
        if let Some(layer) = self.layers.get_mut(index) {
            let now = self.clock.now();
            layer.set_gain(level, now);
            debug!(midi, level, time = now, layer = index, "String dampened");
        }
    }

    /// Releases every sounding note at `time`.
    pub fn release_all(&mut self, time: f64) {
        let mut notes: Vec<u8> = self.active_notes.keys().copied().collect();
        notes.sort_unstable();
        for midi in notes {
            self.trigger_release(midi, time);
        }
    }

    /// Adds every connected layer's output into the interleaved block.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderContext) {
        for layer in self.layers.iter_mut() {
            layer.render(out, ctx);
        }
    }

    /// Returns the index of the layer sounding `midi`, if any.
    pub fn active_layer(&self, midi: u8) -> Option<usize> {
        self.active_notes.get(&midi).copied()
    }

    /// Returns the number of sounding notes.
    pub fn active_note_count(&self) -> usize {
        self.active_notes.len()
    }

    /// Returns the number of velocity layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns the layer at `index`.
    pub fn layer(&self, index: usize) -> Option<&LayerPlayer<E>> {
        self.layers.get(index)
    }
}

impl<E> std::fmt::Debug for PianoStrings<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PianoStrings")
            .field("layers", &self.layers)
            .field("active_notes", &self.active_notes.len())
            .field("loaded", &self.loaded)
            .finish()
    }
}
