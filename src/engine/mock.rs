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
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{LoadError, RenderContext, SampleEngine, OUTPUT_CHANNELS};

/// A call made on a mock engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Load,
    Attack {
        note: String,
        time: f64,
        velocity: f32,
    },
    Release {
        note: String,
        time: f64,
    },
}

/// Calls from every mock engine sharing the log, tagged with the engine's layer.
pub type CallLog = Arc<Mutex<Vec<(usize, Call)>>>;

/// A mock engine. Doesn't play samples; records every call instead.
pub struct Engine {
    layer: usize,
    log: CallLog,
    fail_load: bool,
    /// Constant level written for every frame while at least one note is held.
    level: f32,
    held: usize,
}

impl Engine {
    /// Creates a mock engine for the given layer.
    pub fn new(layer: usize, log: CallLog) -> Engine {
        Engine {
            layer,
            log,
            fail_load: false,
            level: 0.0,
            held: 0,
        }
    }

    /// Makes `load` fail with an IO error.
    pub fn failing(mut self) -> Engine {
        self.fail_load = true;
        self
    }

    /// Makes `render` output a constant level while a note is held.
    pub fn with_level(mut self, level: f32) -> Engine {
        self.level = level;
        self
    }

    fn record(&self, call: Call) {
        self.log.lock().push((self.layer, call));
    }
}

impl SampleEngine for Engine {
    async fn load(&mut self) -> Result<(), LoadError> {
        // Give the other layers' loads a chance to interleave.
        tokio::task::yield_now().await;
        self.record(Call::Load);
        if self.fail_load {
            return Err(LoadError::Io {
                path: PathBuf::from(format!("layer-{}", self.layer)),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock failure"),
            });
        }
        Ok(())
    }

    fn trigger_attack(&mut self, note: &str, time: f64, velocity: f32) {
        self.held += 1;
        self.record(Call::Attack {
            note: note.to_string(),
            time,
            velocity,
        });
    }

    fn trigger_release(&mut self, note: &str, time: f64) {
        self.held = self.held.saturating_sub(1);
        self.record(Call::Release {
            note: note.to_string(),
            time,
        });
    }

    fn render(&mut self, out: &mut [f32], _: &RenderContext) {
        if self.held == 0 {
            return;
        }
        for frame in out.chunks_mut(OUTPUT_CHANNELS) {
            for sample in frame {
                *sample += self.level;
            }
        }
    }
}

/// Creates a fresh shared call log.
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}
