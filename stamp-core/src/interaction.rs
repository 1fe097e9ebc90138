//! Per-stamp gesture state machines.
//!
//! Each visible stamp owns a [`StampInteraction`] with two independent
//! pieces of state:
//!
//! ```text
//!   drag:   Idle ──press──► Dragging{offset} ──move──► Dragging
//!            ▲                                  │
//!            └─────────────release──────────────┘
//!
//!   hover:  visible while over the stamp image or its rotate affordance
//! ```
//!
//! Rotation is a discrete action with no hold state; see [`rotate`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, VisualBox};
use crate::render::SurfaceBounds;
use crate::{Stamp, StampError, StampIndex, StampResult};

/// Default outward margin of the rotate affordance from the stamp's corner.
pub const DEFAULT_AFFORDANCE_MARGIN: f64 = 10.0;

/// Drag gesture state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Pointer is held down on the stamp.
    Dragging {
        /// Pointer x minus the stamp's anchor x at press time.
        offset_x: f64,
        /// Pointer y minus the stamp's anchor y at press time.
        offset_y: f64,
    },
}

/// Which part of a stamp the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverTarget {
    /// The stamp image itself.
    Stamp,
    /// The rotate affordance next to it.
    Affordance,
}

/// Hover state controlling rotate-affordance visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverState {
    over_stamp: bool,
    over_affordance: bool,
}

impl HoverState {
    /// Whether the rotate affordance should be shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.over_stamp || self.over_affordance
    }

    fn set(&mut self, target: HoverTarget, over: bool) {
        match target {
            HoverTarget::Stamp => self.over_stamp = over,
            HoverTarget::Affordance => self.over_affordance = over,
        }
    }
}

/// Screen position of a stamp's rotate affordance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffordancePosition {
    /// Left edge in container pixels.
    pub left: f64,
    /// Top edge in container pixels.
    pub top: f64,
}

/// Diagnostic snapshot emitted when a drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionReadout {
    /// Which stamp.
    pub index: StampIndex,
    /// Left edge of the visual box, relative to the container.
    pub left: f64,
    /// Top edge of the visual box, relative to the container.
    pub top: f64,
    /// `left` as a percentage of the container width.
    pub left_percent: f64,
    /// `top` as a percentage of the container height.
    pub top_percent: f64,
    /// Container width.
    pub container_width: f64,
    /// Container height.
    pub container_height: f64,
    /// Visual box width.
    pub stamp_width: f64,
    /// Visual box height.
    pub stamp_height: f64,
}

impl PositionReadout {
    fn new(index: StampIndex, visual: VisualBox, container: SurfaceBounds) -> Self {
        Self {
            index,
            left: visual.left,
            top: visual.top,
            left_percent: percent(visual.left, container.width),
            top_percent: percent(visual.top, container.height),
            container_width: container.width,
            container_height: container.height,
            stamp_width: visual.width,
            stamp_height: visual.height,
        }
    }
}

fn percent(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

/// The visual (rotated) box of a stamp at `scale`.
#[must_use]
pub fn stamp_visual_box(stamp: &Stamp, scale: f64) -> VisualBox {
    let (width, height) = stamp.displayed_size(scale);
    geometry::visual_box(stamp.x, stamp.y, width, height, stamp.rotation)
}

/// Clamp a candidate anchor for `stamp` into `container`.
fn clamp_anchor(stamp: &Stamp, x: f64, y: f64, scale: f64, container: SurfaceBounds) -> (f64, f64) {
    let (width, height) = stamp.displayed_size(scale);
    geometry::clamp(
        x,
        y,
        width,
        height,
        stamp.rotation,
        container.width,
        container.height,
    )
}

/// Rotate a stamp a quarter turn clockwise and re-clamp its anchor.
///
/// The current anchor is the clamp candidate; the stamp is not re-centered,
/// so its apparent center can shift.
pub fn rotate(stamp: &mut Stamp, scale: f64, container: SurfaceBounds) {
    stamp.rotation = stamp.rotation.turned();
    let (x, y) = clamp_anchor(stamp, stamp.x, stamp.y, scale, container);
    stamp.x = x;
    stamp.y = y;
    tracing::debug!(
        "Rotated stamp {} to {}deg at ({x}, {y})",
        stamp.index,
        stamp.rotation.degrees()
    );
}

/// Where to draw a stamp's rotate affordance.
///
/// Anchored at the top-right corner of the visual box, pushed `margin`
/// pixels inward horizontally and outward above the box.
#[must_use]
pub fn affordance_position(stamp: &Stamp, scale: f64, margin: f64) -> AffordancePosition {
    let visual = stamp_visual_box(stamp, scale);
    AffordancePosition {
        left: visual.right() - margin,
        top: visual.top - margin,
    }
}

/// Gesture state for one visible stamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampInteraction {
    index: StampIndex,
    drag: DragState,
    hover: HoverState,
}

impl StampInteraction {
    /// Fresh, idle state for a stamp.
    #[must_use]
    pub fn new(index: StampIndex) -> Self {
        Self {
            index,
            drag: DragState::Idle,
            hover: HoverState::default(),
        }
    }

    /// The stamp this state belongs to.
    #[must_use]
    pub fn index(&self) -> StampIndex {
        self.index
    }

    /// Current drag state.
    #[must_use]
    pub fn drag(&self) -> DragState {
        self.drag
    }

    /// Current hover state.
    #[must_use]
    pub fn hover(&self) -> HoverState {
        self.hover
    }

    /// Check if a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Pointer pressed on the stamp: `Idle → Dragging`.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::DragInProgress`] if the stamp is already being
    /// dragged.
    pub fn press(&mut self, stamp: &Stamp, pointer_x: f64, pointer_y: f64) -> StampResult<()> {
        if self.is_dragging() {
            return Err(StampError::DragInProgress(self.index));
        }
        self.drag = DragState::Dragging {
            offset_x: pointer_x - stamp.x,
            offset_y: pointer_y - stamp.y,
        };
        tracing::debug!("Drag start on stamp {} at ({pointer_x}, {pointer_y})", self.index);
        Ok(())
    }

    /// Pointer moved while dragging: commit the clamped anchor.
    ///
    /// `container` must be the surface's bounds as of this move. Returns the
    /// committed anchor.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::NoActiveDrag`] if no drag is in progress.
    pub fn drag_to(
        &mut self,
        stamp: &mut Stamp,
        pointer_x: f64,
        pointer_y: f64,
        scale: f64,
        container: SurfaceBounds,
    ) -> StampResult<(f64, f64)> {
        let DragState::Dragging { offset_x, offset_y } = self.drag else {
            return Err(StampError::NoActiveDrag(self.index));
        };
        let (x, y) = clamp_anchor(
            stamp,
            pointer_x - offset_x,
            pointer_y - offset_y,
            scale,
            container,
        );
        stamp.x = x;
        stamp.y = y;
        Ok((x, y))
    }

    /// Pointer released: `Dragging → Idle`, producing a position readout.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::NoActiveDrag`] if no drag is in progress.
    pub fn release(
        &mut self,
        stamp: &Stamp,
        scale: f64,
        container: SurfaceBounds,
    ) -> StampResult<PositionReadout> {
        if !self.is_dragging() {
            return Err(StampError::NoActiveDrag(self.index));
        }
        self.drag = DragState::Idle;

        let readout = PositionReadout::new(self.index, stamp_visual_box(stamp, scale), container);
        tracing::info!(
            stamp = %self.index,
            top = readout.top,
            left = readout.left,
            container_height = readout.container_height,
            container_width = readout.container_width,
            stamp_height = readout.stamp_height,
            stamp_width = readout.stamp_width,
            "Stamp placed at top={:.2}%, left={:.2}%",
            readout.top_percent,
            readout.left_percent
        );
        Ok(readout)
    }

    /// Abandon any drag without a readout.
    pub fn cancel(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Pointer entered `target`. Returns whether the affordance became visible.
    pub fn enter(&mut self, target: HoverTarget) -> bool {
        let was_visible = self.hover.is_visible();
        self.hover.set(target, true);
        !was_visible
    }

    /// Pointer left `target`. Returns whether the affordance became hidden.
    pub fn leave(&mut self, target: HoverTarget) -> bool {
        let was_visible = self.hover.is_visible();
        self.hover.set(target, false);
        was_visible && !self.hover.is_visible()
    }
}

/// Gesture state for every stamp on the visible page.
#[derive(Debug, Clone, Default)]
pub struct Interactions {
    machines: BTreeMap<StampIndex, StampInteraction>,
}

impl Interactions {
    /// Create with no attached stamps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach gesture state to a newly visible stamp.
    pub fn attach(&mut self, index: StampIndex) {
        self.machines
            .entry(index)
            .or_insert_with(|| StampInteraction::new(index));
    }

    /// Detach a stamp that left the overlay, abandoning any drag.
    pub fn detach(&mut self, index: StampIndex) {
        if let Some(machine) = self.machines.remove(&index) {
            if machine.is_dragging() {
                tracing::warn!("Stamp {index} unmounted mid-drag; drag cancelled");
            }
        }
    }

    /// Gesture state for a stamp.
    #[must_use]
    pub fn get(&self, index: StampIndex) -> Option<&StampInteraction> {
        self.machines.get(&index)
    }

    /// Mutable gesture state for a stamp.
    pub fn get_mut(&mut self, index: StampIndex) -> Option<&mut StampInteraction> {
        self.machines.get_mut(&index)
    }

    /// Stamps with a drag in progress, in index order.
    #[must_use]
    pub fn dragging(&self) -> Vec<StampIndex> {
        self.machines
            .values()
            .filter(|m| m.is_dragging())
            .map(StampInteraction::index)
            .collect()
    }

    /// Number of attached stamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Check if no stamps are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
