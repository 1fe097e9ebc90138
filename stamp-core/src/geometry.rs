//! Rotation-aware footprint and boundary math.
//!
//! A stamp rotates about its own center while its stored `x`/`y` anchor the
//! top-left corner of the *unrotated* box. For quarter turns this means the
//! on-screen box has swapped extents and is shifted relative to the anchor by
//! the [`axis_offset`]. Every caller that needs bounds goes through [`clamp`]
//! or [`clamp_bounds`]; nothing else recomputes them.
//!
//! ```text
//!        anchor (x, y)
//!        ┌──────────────┐            ┌──────┐  <- visual box at 90°
//!        │   w × h      │    rotate  │      │     left = x - min_x
//!        └──────────────┘    ─────►  │ h × w│     top  = y - min_y
//!                                    └──────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::Rotation;

/// Whether a rotation swaps the axis-aligned footprint.
#[must_use]
pub const fn is_vertical(rotation: Rotation) -> bool {
    matches!(rotation, Rotation::Deg90 | Rotation::Deg270)
}

/// Axis-aligned `(width, height)` a box occupies after rotation.
#[must_use]
pub fn rotated_footprint(width: f64, height: f64, rotation: Rotation) -> (f64, f64) {
    if is_vertical(rotation) {
        (height, width)
    } else {
        (width, height)
    }
}

/// Offset `(min_x, min_y)` between the stored anchor and the visual box corner.
///
/// Doubles as the lower clamp bound: an anchor at `min_x` puts the visual
/// box flush against the container's left edge.
#[must_use]
pub fn axis_offset(width: f64, height: f64, rotation: Rotation) -> (f64, f64) {
    if is_vertical(rotation) {
        ((height - width) / 2.0, (width - height) / 2.0)
    } else {
        (0.0, 0.0)
    }
}

/// Allowed anchor range for a stamp inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest allowed anchor x.
    pub min_x: f64,
    /// Largest allowed anchor x.
    pub max_x: f64,
    /// Smallest allowed anchor y.
    pub min_y: f64,
    /// Largest allowed anchor y.
    pub max_y: f64,
}

impl Bounds {
    /// Clamp a candidate anchor into these bounds.
    ///
    /// When the stamp is larger than the container (`max < min`) the result
    /// collapses to `min`.
    #[must_use]
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x.min(self.max_x).max(self.min_x),
            y.min(self.max_y).max(self.min_y),
        )
    }

    /// Check whether an anchor lies inside the bounds (inclusive).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Compute the anchor bounds for a `width × height` stamp at `rotation`.
#[must_use]
pub fn clamp_bounds(
    width: f64,
    height: f64,
    rotation: Rotation,
    container_width: f64,
    container_height: f64,
) -> Bounds {
    let (rotated_width, rotated_height) = rotated_footprint(width, height, rotation);
    let (min_x, min_y) = axis_offset(width, height, rotation);
    Bounds {
        min_x,
        max_x: container_width - rotated_width + min_x,
        min_y,
        max_y: container_height - rotated_height + min_y,
    }
}

/// Clamp an anchor so the rotated stamp stays inside the container.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn clamp(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: Rotation,
    container_width: f64,
    container_height: f64,
) -> (f64, f64) {
    clamp_bounds(width, height, rotation, container_width, container_height).clamp(x, y)
}

/// The box a stamp visually occupies on screen, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualBox {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width after rotation.
    pub width: f64,
    /// Height after rotation.
    pub height: f64,
}

impl VisualBox {
    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Visual box of a stamp anchored at `(x, y)`.
#[must_use]
pub fn visual_box(x: f64, y: f64, width: f64, height: f64, rotation: Rotation) -> VisualBox {
    let (rotated_width, rotated_height) = rotated_footprint(width, height, rotation);
    let (min_x, min_y) = axis_offset(width, height, rotation);
    VisualBox {
        left: x - min_x,
        top: y - min_y,
        width: rotated_width,
        height: rotated_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[test]
    fn test_footprint_swaps_on_quarter_turns() {
        assert_eq!(rotated_footprint(100.0, 50.0, Rotation::Deg0), (100.0, 50.0));
        assert_eq!(rotated_footprint(100.0, 50.0, Rotation::Deg90), (50.0, 100.0));
        assert_eq!(rotated_footprint(100.0, 50.0, Rotation::Deg180), (100.0, 50.0));
        assert_eq!(rotated_footprint(100.0, 50.0, Rotation::Deg270), (50.0, 100.0));
    }

    #[test]
    fn test_bounds_unrotated() {
        let bounds = clamp_bounds(100.0, 50.0, Rotation::Deg0, 800.0, 600.0);
        assert_eq!(
            bounds,
            Bounds {
                min_x: 0.0,
                max_x: 700.0,
                min_y: 0.0,
                max_y: 550.0,
            }
        );
    }

    #[test]
    fn test_bounds_after_quarter_turn() {
        let bounds = clamp_bounds(100.0, 50.0, Rotation::Deg90, 800.0, 600.0);
        assert_eq!(
            bounds,
            Bounds {
                min_x: -25.0,
                max_x: 725.0,
                min_y: 25.0,
                max_y: 525.0,
            }
        );
    }

    #[test]
    fn test_clamp_collapses_to_min_when_stamp_exceeds_container() {
        let (x, y) = clamp(300.0, 300.0, 1000.0, 900.0, Rotation::Deg0, 800.0, 600.0);
        assert_eq!((x, y), (0.0, 0.0));

        let (x, y) = clamp(-50.0, -50.0, 1000.0, 900.0, Rotation::Deg0, 800.0, 600.0);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let candidates = [-500.0, -25.0, 0.0, 12.5, 360.0, 724.9, 725.0, 5000.0];
        let sizes = [(100.0, 50.0), (50.0, 100.0), (64.0, 64.0), (900.0, 20.0)];
        for rotation in ALL {
            for &(w, h) in &sizes {
                for &cx in &candidates {
                    for &cy in &candidates {
                        let once = clamp(cx, cy, w, h, rotation, 800.0, 600.0);
                        let twice = clamp(once.0, once.1, w, h, rotation, 800.0, 600.0);
                        assert_eq!(once, twice, "rotation {rotation:?} size {w}x{h}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_clamped_anchor_keeps_visual_box_inside_container() {
        for rotation in ALL {
            let (x, y) = clamp(10_000.0, 10_000.0, 100.0, 50.0, rotation, 800.0, 600.0);
            let visual = visual_box(x, y, 100.0, 50.0, rotation);
            assert!((visual.right() - 800.0).abs() < 1e-9);
            assert!((visual.top + visual.height - 600.0).abs() < 1e-9);

            let (x, y) = clamp(-10_000.0, -10_000.0, 100.0, 50.0, rotation, 800.0, 600.0);
            let visual = visual_box(x, y, 100.0, 50.0, rotation);
            assert!(visual.left.abs() < 1e-9);
            assert!(visual.top.abs() < 1e-9);
        }
    }

    #[test]
    fn test_square_stamp_has_no_axis_offset() {
        for rotation in ALL {
            assert_eq!(axis_offset(64.0, 64.0, rotation), (0.0, 0.0));
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_rotation() -> impl Strategy<Value = Rotation> {
            prop_oneof![
                Just(Rotation::Deg0),
                Just(Rotation::Deg90),
                Just(Rotation::Deg180),
                Just(Rotation::Deg270),
            ]
        }

        proptest! {
            #[test]
            fn prop_clamp_is_idempotent(
                x in -5_000.0f64..5_000.0,
                y in -5_000.0f64..5_000.0,
                width in 0.0f64..2_000.0,
                height in 0.0f64..2_000.0,
                rotation in arb_rotation(),
                container_width in 1.0f64..2_000.0,
                container_height in 1.0f64..2_000.0,
            ) {
                let once = clamp(x, y, width, height, rotation, container_width, container_height);
                let twice = clamp(
                    once.0, once.1, width, height, rotation, container_width, container_height,
                );
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_clamped_stamp_fits_when_it_can(
                x in -5_000.0f64..5_000.0,
                y in -5_000.0f64..5_000.0,
                width in 1.0f64..400.0,
                height in 1.0f64..400.0,
                rotation in arb_rotation(),
            ) {
                let (x, y) = clamp(x, y, width, height, rotation, 800.0, 600.0);
                let visual = visual_box(x, y, width, height, rotation);
                prop_assert!(visual.left >= -1e-9 && visual.right() <= 800.0 + 1e-9);
                prop_assert!(visual.top >= -1e-9 && visual.top + visual.height <= 600.0 + 1e-9);
            }

            #[test]
            fn prop_footprint_swaps_only_when_vertical(
                width in 0.0f64..1_000.0,
                height in 0.0f64..1_000.0,
                rotation in arb_rotation(),
            ) {
                let footprint = rotated_footprint(width, height, rotation);
                if is_vertical(rotation) {
                    prop_assert_eq!(footprint, (height, width));
                } else {
                    prop_assert_eq!(footprint, (width, height));
                }
            }
        }
    }
}
