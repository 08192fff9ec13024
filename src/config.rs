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

//! Piano configuration.
//!
//! This module provides:
//! - The YAML piano configuration: sample location, note range, velocity layers
//!   and playback settings
//! - A typed error for configuration failures
//! - Construction of the strings described by a configuration

use std::sync::Arc;

use tracing::info;

use crate::clock::Clock;
use crate::engine::MemorySampler;
use crate::strings::PianoStrings;

mod error;
mod piano;

pub use error::ConfigError;
pub use piano::{PianoConfig, DEFAULT_TAIL};

/// Builds unloaded strings for the given configuration, with one in-memory
/// sampler per velocity layer.
pub fn init_strings(
    config: &PianoConfig,
    clock: Arc<dyn Clock>,
) -> Result<PianoStrings<MemorySampler>, ConfigError> {
    let library = config.library();
    let options = config.sampler_options()?;

    let strings = PianoStrings::from_library(config, &library, clock, |_, files| {
        MemorySampler::new(files, options)
    })?;
    info!(
        samples = %config.samples().display(),
        layers = strings.layer_count(),
        min_note = config.min_note(),
        max_note = config.max_note(),
        "Strings configured"
    );
    Ok(strings)
}
