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
use std::sync::Arc;

use parking_lot::RwLock;

/// Provides the scheduling time (in seconds) for events that should happen "now".
pub trait Clock: Send + Sync {
    /// Returns the current scheduling time in seconds.
    fn now(&self) -> f64;
}

/// A clock that only moves when told to. The offline renderer advances it block by
/// block, and tests set it directly.
#[derive(Clone, Default)]
pub struct ManualClock {
    time: Arc<RwLock<f64>>,
}

impl ManualClock {
    /// Creates a new clock at time zero.
    pub fn new() -> ManualClock {
        ManualClock::default()
    }

    /// Moves the clock to the given time.
    pub fn set(&self, time: f64) {
        *self.time.write() = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.time.read()
    }
}
