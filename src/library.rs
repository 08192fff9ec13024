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

//! Describes which sample files exist for a piano sample set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::note::midi_to_note;

/// The notes the Salamander Grand Piano was sampled at: every minor third from A0 to C8.
const SALAMANDER_NOTES: [u8; 30] = [
    21, 24, 27, 30, 33, 36, 39, 42, 45, 48, 51, 54, 57, 60, 63, 66, 69, 72, 75, 78, 81, 84, 87, 90,
    93, 96, 99, 102, 105, 108,
];

/// Velocity identifiers to load for a given number of layers, softest first.
const SALAMANDER_VELOCITIES: [&[u8]; 16] = [
    &[8],
    &[6, 12],
    &[1, 7, 15],
    &[1, 5, 10, 15],
    &[1, 4, 8, 12, 16],
    &[1, 3, 7, 10, 13, 16],
    &[1, 3, 6, 9, 11, 13, 16],
    &[1, 3, 5, 7, 9, 11, 13, 15],
    &[1, 3, 5, 7, 9, 11, 13, 15, 16],
    &[1, 2, 3, 5, 7, 9, 11, 13, 15, 16],
    &[1, 2, 3, 5, 7, 9, 11, 13, 14, 15, 16],
    &[1, 2, 3, 4, 5, 7, 9, 11, 13, 14, 15, 16],
    &[1, 2, 3, 4, 5, 7, 9, 11, 12, 13, 14, 15, 16],
    &[1, 2, 3, 4, 5, 6, 7, 9, 11, 12, 13, 14, 15, 16],
    &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
];

/// Default file extension for Salamander samples.
pub const DEFAULT_SAMPLE_EXTENSION: &str = "mp3";

/// A set of recorded piano samples.
pub trait SampleLibrary: Send + Sync {
    /// Returns the velocity identifiers for the given layer count, softest first.
    /// Returns None if the library has no table for that many layers.
    fn velocity_layers(&self, count: usize) -> Option<Vec<u8>>;

    /// Returns the sampled MIDI notes between min and max, inclusive.
    fn notes_in_range(&self, min: u8, max: u8) -> Vec<u8>;

    /// Resolves the file holding the given note at the given velocity.
    fn sample_path(&self, note: u8, velocity: u8) -> PathBuf;

    /// Maps every sampled note in range to its file for one velocity layer.
    fn layer_files(&self, min: u8, max: u8, velocity: u8) -> HashMap<u8, PathBuf> {
        self.notes_in_range(min, max)
            .into_iter()
            .map(|note| (note, self.sample_path(note, velocity)))
            .collect()
    }
}

/// The Salamander Grand Piano sample set, e.g. `Ds1v7.mp3`.
#[derive(Clone, Debug)]
pub struct SalamanderLibrary {
    base_path: PathBuf,
    extension: String,
}

impl SalamanderLibrary {
    /// Creates a library rooted at the given directory.
    pub fn new(base_path: &Path, extension: &str) -> SalamanderLibrary {
        SalamanderLibrary {
            base_path: base_path.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// The largest layer count the Salamander set supports.
    pub fn max_layers() -> usize {
        SALAMANDER_VELOCITIES.len()
    }
}

impl SampleLibrary for SalamanderLibrary {
    fn velocity_layers(&self, count: usize) -> Option<Vec<u8>> {
        count
            .checked_sub(1)
            .and_then(|i| SALAMANDER_VELOCITIES.get(i))
            .map(|velocities| velocities.to_vec())
    }

    fn notes_in_range(&self, min: u8, max: u8) -> Vec<u8> {
        SALAMANDER_NOTES
            .iter()
            .copied()
            .filter(|note| min <= *note && *note <= max)
            .collect()
    }

    fn sample_path(&self, note: u8, velocity: u8) -> PathBuf {
        let name = midi_to_note(note).replace('#', "s");
        self.base_path
            .join(format!("{}v{}.{}", name, velocity, self.extension))
    }
}
