//! Events the host feeds into the editor, and effects it must carry out.

use serde::{Deserialize, Serialize};

use crate::interaction::{HoverTarget, PositionReadout};
use crate::render::OverlayPatch;
use crate::StampIndex;

/// Everything the host can tell the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The document service finished opening a document.
    DocumentOpened {
        /// Number of pages in the document.
        page_count: u32,
    },

    /// An asynchronous page render completed.
    SurfaceReady {
        /// Page that was rendered.
        page: u32,
        /// Scale it was rendered at.
        scale: f64,
        /// Surface width in pixels.
        width: f64,
        /// Surface height in pixels.
        height: f64,
    },

    /// The user picked an image to place on the current page.
    StampPicked {
        /// Image payload reference.
        src: String,
    },

    /// A stamp's bitmap resolved its natural size.
    BitmapLoaded {
        /// Which stamp.
        index: StampIndex,
        /// Natural width.
        width: f64,
        /// Natural height.
        height: f64,
    },

    /// A stamp's bitmap could not be decoded.
    BitmapFailed {
        /// Which stamp.
        index: StampIndex,
        /// Loader's description of the failure.
        reason: String,
    },

    /// Previous-page button.
    PrevPage,

    /// Next-page button.
    NextPage,

    /// Page number typed into the page field.
    GoToPage {
        /// Requested page (1-based).
        page: u32,
    },

    /// Zoom-in button.
    ZoomIn,

    /// Zoom-out button.
    ZoomOut,

    /// Scale typed into the scale field.
    SetScale {
        /// Requested scale.
        scale: f64,
    },

    /// Pointer pressed on a stamp image.
    PointerDown {
        /// Which stamp.
        index: StampIndex,
        /// Pointer x in container pixels.
        x: f64,
        /// Pointer y in container pixels.
        y: f64,
    },

    /// Pointer moved anywhere.
    PointerMove {
        /// Pointer x in container pixels.
        x: f64,
        /// Pointer y in container pixels.
        y: f64,
    },

    /// Pointer released anywhere.
    PointerUp {
        /// Pointer x in container pixels.
        x: f64,
        /// Pointer y in container pixels.
        y: f64,
    },

    /// Pointer entered a stamp or its affordance.
    PointerEnter {
        /// Which stamp.
        index: StampIndex,
        /// What was entered.
        target: HoverTarget,
    },

    /// Pointer left a stamp or its affordance.
    PointerLeave {
        /// Which stamp.
        index: StampIndex,
        /// What was left.
        target: HoverTarget,
    },

    /// Rotate affordance clicked.
    RotateClicked {
        /// Which stamp.
        index: StampIndex,
    },
}

impl HostEvent {
    /// Whether handling this event reads the page surface bounds.
    ///
    /// Such events are queued until the surface is ready.
    #[must_use]
    pub fn needs_surface(&self) -> bool {
        matches!(
            self,
            Self::PointerDown { .. }
                | Self::PointerMove { .. }
                | Self::PointerUp { .. }
                | Self::PointerEnter { .. }
                | Self::PointerLeave { .. }
                | Self::RotateClicked { .. }
        )
    }
}

/// Everything the editor asks the host to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEffect {
    /// Render `page` at `scale`, then report [`HostEvent::SurfaceReady`].
    RenderPage {
        /// Page to render.
        page: u32,
        /// Scale to render at.
        scale: f64,
    },

    /// Decode a stamp bitmap, then report [`HostEvent::BitmapLoaded`].
    LoadBitmap {
        /// Which stamp.
        index: StampIndex,
        /// Image payload reference.
        src: String,
    },

    /// Apply overlay changes.
    Overlay(OverlayPatch),

    /// Show (or move) a stamp's rotate affordance.
    ShowAffordance {
        /// Which stamp.
        index: StampIndex,
        /// Left edge in container pixels.
        left: f64,
        /// Top edge in container pixels.
        top: f64,
    },

    /// Hide a stamp's rotate affordance.
    HideAffordance {
        /// Which stamp.
        index: StampIndex,
    },

    /// Update the page counter.
    PageIndicator {
        /// Current page.
        current: u32,
        /// Page count.
        count: u32,
    },

    /// Update the scale field.
    ScaleIndicator {
        /// Current scale.
        scale: f64,
    },

    /// Drag finished; diagnostic position readout.
    Readout(PositionReadout),
}
