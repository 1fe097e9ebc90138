//! Render sync: reconcile the stamp store against the visible overlay.
//!
//! The overlay holds one element per stamp on the current page. Each sync
//! diffs the desired styles against what was last applied and reports only
//! the difference, so re-running with unchanged inputs yields an empty patch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Rotation, Session, Stamp, StampIndex};

/// Pixel size of the rendered page surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBounds {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// Readiness of the page surface the overlay sits on.
///
/// Bounds can only be read once the asynchronous page render has completed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SurfaceState {
    /// No document has been opened yet.
    Closed,
    /// A render of `page` at `scale` was requested and has not completed.
    Pending {
        /// Requested page.
        page: u32,
        /// Requested scale.
        scale: f64,
    },
    /// The page is rendered and its pixel size is known.
    Ready {
        /// Rendered page.
        page: u32,
        /// Rendered scale.
        scale: f64,
        /// Pixel size of the surface.
        bounds: SurfaceBounds,
    },
}

impl SurfaceState {
    /// Surface bounds, if the surface is ready.
    #[must_use]
    pub fn bounds(&self) -> Option<SurfaceBounds> {
        match self {
            Self::Ready { bounds, .. } => Some(*bounds),
            Self::Closed | Self::Pending { .. } => None,
        }
    }

    /// Check if the surface is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Style the host must apply to one stamp's overlay element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampStyle {
    /// Left offset in pixels (the stored anchor x).
    pub left: f64,
    /// Top offset in pixels (the stored anchor y).
    pub top: f64,
    /// Displayed width of the unrotated element.
    pub width: f64,
    /// Displayed height of the unrotated element.
    pub height: f64,
    /// Rotation about the element's center.
    pub rotation: Rotation,
}

impl StampStyle {
    /// Style for `stamp` at the session's `scale`.
    #[must_use]
    pub fn for_stamp(stamp: &Stamp, scale: f64) -> Self {
        let (width, height) = stamp.displayed_size(scale);
        Self {
            left: stamp.x,
            top: stamp.y,
            width,
            height,
            rotation: stamp.rotation,
        }
    }

    /// Render as an inline CSS declaration block.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; \
             transform-origin: 50% 50%; transform: rotate({}deg);",
            self.left,
            self.top,
            self.width,
            self.height,
            self.rotation.degrees()
        )
    }
}

/// A stamp together with its overlay style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledStamp {
    /// Which stamp.
    pub index: StampIndex,
    /// Its image payload, needed when mounting.
    pub src: String,
    /// Style to apply.
    pub style: StampStyle,
}

/// Changes to apply to the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayPatch {
    /// Page the overlay now shows.
    pub page: u32,
    /// Elements to create.
    pub mounted: Vec<StyledStamp>,
    /// Elements whose style changed.
    pub updated: Vec<StyledStamp>,
    /// Elements to remove.
    pub unmounted: Vec<StampIndex>,
}

impl OverlayPatch {
    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.updated.is_empty() && self.unmounted.is_empty()
    }
}

/// Tracks what the overlay currently shows.
#[derive(Debug, Clone, Default)]
pub struct RenderSync {
    page: Option<u32>,
    applied: BTreeMap<StampIndex, StampStyle>,
}

impl RenderSync {
    /// Create a sync with an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the overlay with the session's current page.
    ///
    /// The caller must only invoke this once the page surface is ready.
    pub fn sync(&mut self, session: &Session) -> OverlayPatch {
        let page = session.current_page();
        let scale = session.current_scale();
        let mut patch = OverlayPatch {
            page,
            ..OverlayPatch::default()
        };

        let mut desired = BTreeMap::new();
        for stamp in session.stamps_on_page(page) {
            let style = StampStyle::for_stamp(stamp, scale);
            desired.insert(stamp.index, style);
            let styled = StyledStamp {
                index: stamp.index,
                src: stamp.src.clone(),
                style,
            };
            match self.applied.get(&stamp.index) {
                None => patch.mounted.push(styled),
                Some(previous) if *previous != style => patch.updated.push(styled),
                Some(_) => {}
            }
        }

        patch.unmounted = self
            .applied
            .keys()
            .filter(|index| !desired.contains_key(index))
            .copied()
            .collect();

        if !patch.is_empty() {
            tracing::debug!(
                "Overlay page {page}: +{} ~{} -{}",
                patch.mounted.len(),
                patch.updated.len(),
                patch.unmounted.len()
            );
        }

        self.page = Some(page);
        self.applied = desired;
        patch
    }

    /// Page the overlay last synced to.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Style currently applied to a stamp, if it is mounted.
    #[must_use]
    pub fn style(&self, index: StampIndex) -> Option<&StampStyle> {
        self.applied.get(&index)
    }

    /// Check if a stamp currently has an overlay element.
    #[must_use]
    pub fn is_mounted(&self, index: StampIndex) -> bool {
        self.applied.contains_key(&index)
    }

    /// Mounted stamps and their styles, in index order.
    pub fn mounted(&self) -> impl Iterator<Item = (StampIndex, &StampStyle)> {
        self.applied.iter().map(|(index, style)| (*index, style))
    }
}
