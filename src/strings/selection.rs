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

/// The layer chosen for a strike and the gain to play it at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerSelection {
    /// Index of the velocity layer, softest first.
    pub index: usize,
    /// Amplitude for the selected layer. Near layer boundaries this stands in for
    /// a crossfade with the neighbouring layer.
    pub gain: f32,
}

/// Linearly maps `value` from [in_min, in_max] to [out_min, out_max].
fn scale(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    ((value - in_min) / (in_max - in_min)) * (out_max - out_min) + out_min
}

/// Picks the velocity layer for a strike of `velocity` (0.0 to 1.0) across
/// `layers` layers.
///
/// The velocity is spread over [-0.5, layers - 0.51] and rounded half away from
/// zero, so -0.5 rounds to -1 and is clamped to layer 0. The distance from the
/// rounded layer becomes the blend gain. With a single layer the velocity is the
/// gain. Returns None when there are no layers or the rounded index lands past
/// the last layer, in which case the strike makes no sound.
pub fn select_layer(velocity: f32, layers: usize) -> Option<LayerSelection> {
    if layers == 0 {
        return None;
    }
    if layers == 1 {
        return Some(LayerSelection {
            index: 0,
            gain: velocity,
        });
    }

    let scaled = scale(velocity as f64, 0.0, 1.0, -0.5, layers as f64 - 0.51);
    let index = scaled.round().max(0.0);
    if index > (layers - 1) as f64 {
        return None;
    }

    Some(LayerSelection {
        index: index as usize,
        gain: (1.0 + scaled - index) as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_middle_velocity_three_layers() {
        // scaled = 0.5 * 2.99 - 0.5 = 0.995
        let selection = select_layer(0.5, 3).unwrap();
        assert_eq!(selection.index, 1);
        assert_close(selection.gain, 0.995);
    }

    #[test]
    fn test_zero_velocity_rounds_half_away_from_zero() {
        // scaled = -0.5 is a tie; rounding away from zero gives -1, clamped to 0.
        let selection = select_layer(0.0, 3).unwrap();
        assert_eq!(selection.index, 0);
        // gain = 1 + (-0.5) - 0
        assert_close(selection.gain, 0.5);
    }

    #[test]
    fn test_full_velocity_hits_top_layer() {
        for layers in 2..=16 {
            let selection = select_layer(1.0, layers).unwrap();
            assert_eq!(selection.index, layers - 1);
            // scaled = layers - 0.51 rounds down to layers - 1, leaving 1 + 0.49.
            assert_close(selection.gain, 1.49);
        }
    }

    #[test]
    fn test_index_always_in_range() {
        for layers in 2..=16 {
            for step in 0..=1000 {
                let velocity = step as f32 / 1000.0;
                let selection = select_layer(velocity, layers)
                    .unwrap_or_else(|| panic!("no layer for {} of {}", velocity, layers));
                assert!(selection.index < layers);
                assert!(selection.gain >= 0.5 - 1e-4 && selection.gain <= 1.5 + 1e-4);
            }
        }
    }

    #[test]
    fn test_past_top_layer_is_dropped() {
        // Velocities above 1.0 scale past the last layer and round to `layers`.
        assert_eq!(select_layer(1.2, 3), None);
        assert_eq!(select_layer(1.2, 2), None);
    }

    #[test]
    fn test_single_layer_uses_velocity() {
        for velocity in [0.0, 0.001, 0.33, 0.5, 0.999, 1.0] {
            let selection = select_layer(velocity, 1).unwrap();
            assert_eq!(selection.index, 0);
            assert_eq!(selection.gain, velocity);
        }
    }

    #[test]
    fn test_no_layers() {
        assert_eq!(select_layer(0.5, 0), None);
    }

    #[test]
    fn test_layer_boundaries_are_monotonic() {
        let mut last = 0;
        for step in 0..=127 {
            let selection = select_layer(step as f32 / 127.0, 5).unwrap();
            assert!(selection.index >= last);
            last = selection.index;
        }
        assert_eq!(last, 4);
    }
}
