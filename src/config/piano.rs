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
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;
use crate::engine::{SamplerOptions, DEFAULT_VOLUME_DB};
use crate::library::{SalamanderLibrary, DEFAULT_SAMPLE_EXTENSION};
use crate::strings::DEFAULT_GAIN_RAMP;

/// Lowest note of an 88 key piano.
pub const DEFAULT_MIN_NOTE: u8 = 21;

/// Highest note of an 88 key piano.
pub const DEFAULT_MAX_NOTE: u8 = 108;

/// Default number of velocity layers.
pub const DEFAULT_VELOCITIES: usize = 1;

/// Default silence rendered after the last event so release tails can ring out.
pub const DEFAULT_TAIL: Duration = Duration::from_secs(2);

/// A YAML representation of the piano configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct PianoConfig {
    /// Directory holding the sample files. Relative paths are resolved against the
    /// directory of the config file.
    samples: String,

    /// File extension of the sample files.
    extension: Option<String>,

    /// The lowest note to load samples for.
    #[serde(default = "default_min_note")]
    min_note: u8,

    /// The highest note to load samples for.
    #[serde(default = "default_max_note")]
    max_note: u8,

    /// The number of velocity layers to load.
    #[serde(default = "default_velocities")]
    velocities: usize,

    /// Length of the release tail, e.g. "400ms".
    release: Option<String>,

    /// Output boost applied to every sample, in dB.
    volume_db: Option<f32>,

    /// Length of the ramp used when damping strings, e.g. "100ms".
    gain_ramp: Option<String>,

    /// Render sample rate. Samples are converted to this rate on load.
    sample_rate: Option<u32>,

    /// Silence rendered after the last event, e.g. "2s".
    tail: Option<String>,

    /// Directory relative sample paths are resolved against.
    #[serde(skip)]
    base_path: PathBuf,
}

fn default_min_note() -> u8 {
    DEFAULT_MIN_NOTE
}

fn default_max_note() -> u8 {
    DEFAULT_MAX_NOTE
}

fn default_velocities() -> usize {
    DEFAULT_VELOCITIES
}

impl PianoConfig {
    /// Creates a new piano configuration with default playback settings.
    pub fn new(samples: &str, min_note: u8, max_note: u8, velocities: usize) -> PianoConfig {
        PianoConfig {
            samples: samples.to_string(),
            extension: None,
            min_note,
            max_note,
            velocities,
            release: None,
            volume_db: None,
            gain_ramp: None,
            sample_rate: None,
            tail: None,
            base_path: PathBuf::new(),
        }
    }

    /// Parse a piano configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<PianoConfig, ConfigError> {
        let mut piano = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<PianoConfig>()?;
        piano.base_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        piano.validate()?;
        Ok(piano)
    }

    /// Checks values that serde can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_note > self.max_note || self.max_note > 127 {
            return Err(ConfigError::InvalidNoteRange {
                min: self.min_note,
                max: self.max_note,
            });
        }
        self.release()?;
        self.gain_ramp()?;
        self.tail()?;
        Ok(())
    }

    /// Returns the resolved sample directory.
    pub fn samples(&self) -> PathBuf {
        let samples = Path::new(&self.samples);
        if samples.is_absolute() {
            samples.to_path_buf()
        } else {
            self.base_path.join(samples)
        }
    }

    /// Returns the sample file extension.
    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or(DEFAULT_SAMPLE_EXTENSION)
    }

    /// Returns the lowest note.
    pub fn min_note(&self) -> u8 {
        self.min_note
    }

    /// Returns the highest note.
    pub fn max_note(&self) -> u8 {
        self.max_note
    }

    /// Returns the number of velocity layers.
    pub fn velocities(&self) -> usize {
        self.velocities
    }

    /// Returns the release tail length.
    pub fn release(&self) -> Result<Duration, ConfigError> {
        parse_duration("release", &self.release, SamplerOptions::default().release)
    }

    /// Returns the damping ramp length.
    pub fn gain_ramp(&self) -> Result<Duration, ConfigError> {
        parse_duration(
            "gain_ramp",
            &self.gain_ramp,
            Duration::from_secs_f64(DEFAULT_GAIN_RAMP),
        )
    }

    /// Returns the silence rendered after the last event.
    pub fn tail(&self) -> Result<Duration, ConfigError> {
        parse_duration("tail", &self.tail, DEFAULT_TAIL)
    }

    /// Returns the render sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
            .unwrap_or(SamplerOptions::default().sample_rate)
    }

    /// Returns the playback settings for each layer's sampler.
    pub fn sampler_options(&self) -> Result<SamplerOptions, ConfigError> {
        Ok(SamplerOptions {
            release: self.release()?,
            volume_db: self.volume_db.unwrap_or(DEFAULT_VOLUME_DB),
            sample_rate: self.sample_rate(),
        })
    }

    /// Returns the sample library described by this configuration.
    pub fn library(&self) -> SalamanderLibrary {
        SalamanderLibrary::new(&self.samples(), self.extension())
    }
}

fn parse_duration(
    field: &'static str,
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => Ok(DurationString::from_string(value.clone())
            .map_err(|e| ConfigError::Duration {
                field,
                message: e.to_string(),
            })?
            .into()),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("piano.yaml");
        fs::write(&path, "samples: salamander\n")?;

        let config = PianoConfig::deserialize(&path)?;
        assert_eq!(config.samples(), dir.path().join("salamander"));
        assert_eq!(config.extension(), "mp3");
        assert_eq!(config.min_note(), 21);
        assert_eq!(config.max_note(), 108);
        assert_eq!(config.velocities(), 1);
        assert_eq!(config.release()?, Duration::from_millis(400));
        assert_eq!(config.gain_ramp()?, Duration::from_millis(100));
        assert_eq!(config.tail()?, Duration::from_secs(2));
        assert_eq!(config.sample_rate(), 44100);
        assert_eq!(config.sampler_options()?.volume_db, 3.0);
        Ok(())
    }

    #[test]
    fn test_full_config() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("piano.yaml");
        fs::write(
            &path,
            r#"
samples: /opt/salamander
extension: ogg
min_note: 48
max_note: 72
velocities: 5
release: 1s
volume_db: -2.5
gain_ramp: 50ms
sample_rate: 48000
tail: 500ms
"#,
        )?;

        let config = PianoConfig::deserialize(&path)?;
        assert_eq!(config.samples(), PathBuf::from("/opt/salamander"));
        assert_eq!(config.extension(), "ogg");
        assert_eq!((config.min_note(), config.max_note()), (48, 72));
        assert_eq!(config.velocities(), 5);
        assert_eq!(config.gain_ramp()?, Duration::from_millis(50));
        assert_eq!(config.tail()?, Duration::from_millis(500));

        let options = config.sampler_options()?;
        assert_eq!(options.release, Duration::from_secs(1));
        assert_eq!(options.volume_db, -2.5);
        assert_eq!(options.sample_rate, 48000);
        Ok(())
    }

    #[test]
    fn test_invalid_note_range() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("piano.yaml");
        fs::write(&path, "samples: s\nmin_note: 80\nmax_note: 60\n")?;

        assert!(matches!(
            PianoConfig::deserialize(&path),
            Err(ConfigError::InvalidNoteRange { min: 80, max: 60 })
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_duration() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("piano.yaml");
        fs::write(&path, "samples: s\nrelease: soon\n")?;

        assert!(matches!(
            PianoConfig::deserialize(&path),
            Err(ConfigError::Duration {
                field: "release",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PianoConfig::deserialize(Path::new("/definitely/not/here.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
