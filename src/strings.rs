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

//! The hammered strings of the piano.
//!
//! This module provides:
//! - Velocity to sample layer selection with blend gains
//! - One layer player per velocity layer, with its own output gain
//! - The string manager that tracks which layer is sounding each note, so the
//!   note can later be released or dampened

mod layer;
mod manager;
mod selection;

pub use layer::{LayerPlayer, DEFAULT_GAIN_RAMP, UNDAMPED_GAIN};
pub use manager::PianoStrings;
pub use selection::{select_layer, LayerSelection};
