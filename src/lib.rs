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

//! A velocity layered piano sample engine.
//!
//! The strings hold one sample player per velocity layer. Each strike picks the
//! layer for its velocity and remembers it, so the note can later be released or
//! dampened on the layer that is actually sounding it.

pub mod clock;
pub mod config;
pub mod engine;
pub mod library;
pub mod midi;
pub mod note;
pub mod performance;
pub mod render;
pub mod strings;
#[cfg(test)]
mod testutil;
pub mod util;
