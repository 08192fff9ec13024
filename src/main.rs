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
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};

use pianostrings::clock::ManualClock;
use pianostrings::config::{init_strings, PianoConfig};
use pianostrings::library::{SalamanderLibrary, SampleLibrary, DEFAULT_SAMPLE_EXTENSION};
use pianostrings::midi;
use pianostrings::note::midi_to_note;
use pianostrings::render::{render_to_wav, RenderOptions};
use pianostrings::util::duration_minutes_seconds;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A velocity layered piano sampler."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the sample velocities loaded for the given number of layers.
    Layers {
        /// The number of velocity layers.
        count: usize,
    },
    /// Lists the sample files the given piano config would load.
    Notes {
        /// The path to the piano config.
        config_path: String,
    },
    /// Loads every sample the given piano config refers to.
    Verify {
        /// The path to the piano config.
        config_path: String,
    },
    /// Renders a MIDI file to a WAV file.
    Render {
        /// The path to the piano config.
        config_path: String,
        /// The MIDI file to play.
        midi_file: String,
        /// The WAV file to write.
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layers { count } => {
            let library = SalamanderLibrary::new(Path::new("."), DEFAULT_SAMPLE_EXTENSION);
            let Some(velocities) = library.velocity_layers(count) else {
                return Err(format!(
                    "no velocity table for {} layers (1-{} supported)",
                    count,
                    SalamanderLibrary::max_layers()
                )
                .into());
            };

            println!("Velocity layers (count: {}):", velocities.len());
            for (index, velocity) in velocities.iter().enumerate() {
                println!("- {}: v{}", index, velocity);
            }
        }
        Commands::Notes { config_path } => {
            let config = PianoConfig::deserialize(&PathBuf::from(&config_path))?;
            let library = config.library();
            let velocities = library
                .velocity_layers(config.velocities())
                .ok_or(format!("no velocity table for {} layers", config.velocities()))?;
            let notes = library.notes_in_range(config.min_note(), config.max_note());

            let mut missing = 0;
            for velocity in velocities {
                println!("Layer v{} (notes: {}):", velocity, notes.len());
                for note in notes.iter() {
                    let path = library.sample_path(*note, velocity);
                    let exists = path.exists();
                    if !exists {
                        missing += 1;
                    }
                    println!(
                        "- {} ({}): {}{}",
                        midi_to_note(*note),
                        note,
                        path.display(),
                        if exists { "" } else { " (missing)" }
                    );
                }
            }

            if missing > 0 {
                println!("\n{} sample files missing.", missing);
            }
        }
        Commands::Verify { config_path } => {
            let config = PianoConfig::deserialize(&PathBuf::from(&config_path))?;
            let mut strings = init_strings(&config, Arc::new(ManualClock::new()))?;
            strings.load().await?;

            println!("Strings loaded (layers: {}):", strings.layer_count());
            for index in 0..strings.layer_count() {
                if let Some(layer) = strings.layer(index) {
                    println!(
                        "- v{}: {} KB",
                        layer.velocity(),
                        layer.engine().memory_usage() / 1024
                    );
                }
            }
        }
        Commands::Render {
            config_path,
            midi_file,
            output,
        } => {
            let config = PianoConfig::deserialize(&PathBuf::from(&config_path))?;
            let clock = ManualClock::new();
            let mut strings = init_strings(&config, Arc::new(clock.clone()))?;
            strings.load().await?;

            let events = midi::read_events(&PathBuf::from(&midi_file))?;
            let options = RenderOptions {
                sample_rate: config.sample_rate(),
                tail: config.tail()?,
                ..Default::default()
            };
            let summary = render_to_wav(
                &mut strings,
                &events,
                &clock,
                &options,
                &PathBuf::from(&output),
            )?;

            println!(
                "Rendered {} events to {} ({})",
                summary.events,
                output,
                duration_minutes_seconds(summary.duration)
            );
        }
    }

    Ok(())
}
