//! A headless host surface that records what a real host would paint.

use std::collections::BTreeMap;

use image::RgbaImage;
use serde::Serialize;
use stamp_core::{
    AffordancePosition, HostEffect, HostSurface, OverlayPatch, PositionReadout, StampIndex,
    StyledStamp,
};
use stamp_renderer::DecodedBitmap;

/// A rendered page as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresentedPage {
    /// Page number.
    pub page: u32,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
}

/// Overlay and indicator state accumulated from editor effects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingHost {
    /// Page the overlay currently shows.
    pub overlay_page: Option<u32>,
    /// Mounted overlay elements.
    pub overlay: BTreeMap<StampIndex, StyledStamp>,
    /// Visible rotate affordances.
    pub affordances: BTreeMap<StampIndex, AffordancePosition>,
    /// Last page indicator (current, count).
    pub page_indicator: Option<(u32, u32)>,
    /// Last scale indicator.
    pub scale_indicator: Option<f64>,
    /// Drag-release readouts in order.
    pub readouts: Vec<PositionReadout>,
    /// Every page raster presented, in order.
    pub rendered: Vec<PresentedPage>,
    /// Natural sizes of presented stamp bitmaps.
    pub bitmaps: BTreeMap<StampIndex, (u32, u32)>,
}

impl RecordingHost {
    /// Create an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_patch(&mut self, patch: &OverlayPatch) {
        if self.overlay_page != Some(patch.page) {
            tracing::debug!("Overlay switched to page {}", patch.page);
        }
        self.overlay_page = Some(patch.page);
        for index in &patch.unmounted {
            self.overlay.remove(index);
            self.affordances.remove(index);
        }
        for styled in patch.mounted.iter().chain(&patch.updated) {
            self.overlay.insert(styled.index, styled.clone());
        }
    }
}

impl HostSurface for RecordingHost {
    type Raster = RgbaImage;
    type Bitmap = DecodedBitmap;

    fn present_page(&mut self, page: u32, raster: RgbaImage) {
        let (width, height) = raster.dimensions();
        tracing::debug!("Presented page {page} ({width}x{height})");
        self.rendered.push(PresentedPage {
            page,
            width,
            height,
        });
    }

    fn present_bitmap(&mut self, index: StampIndex, bitmap: DecodedBitmap) {
        self.bitmaps.insert(index, (bitmap.width, bitmap.height));
    }

    fn apply(&mut self, effect: &HostEffect) {
        match effect {
            HostEffect::Overlay(patch) => self.apply_patch(patch),
            HostEffect::ShowAffordance { index, left, top } => {
                self.affordances.insert(
                    *index,
                    AffordancePosition {
                        left: *left,
                        top: *top,
                    },
                );
            }
            HostEffect::HideAffordance { index } => {
                self.affordances.remove(index);
            }
            HostEffect::PageIndicator { current, count } => {
                self.page_indicator = Some((*current, *count));
            }
            HostEffect::ScaleIndicator { scale } => self.scale_indicator = Some(*scale),
            HostEffect::Readout(readout) => self.readouts.push(*readout),
            HostEffect::RenderPage { .. } | HostEffect::LoadBitmap { .. } => {
                tracing::warn!("Collaborator effect reached the host unserviced: {effect:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamp_core::{Rotation, StampStyle};

    fn styled(index: usize, left: f64) -> StyledStamp {
        StyledStamp {
            index: StampIndex::new(index),
            src: "s".to_string(),
            style: StampStyle {
                left,
                top: 0.0,
                width: 10.0,
                height: 10.0,
                rotation: Rotation::Deg0,
            },
        }
    }

    #[test]
    fn test_patch_mounts_updates_and_unmounts() {
        let mut host = RecordingHost::new();
        host.apply(&HostEffect::Overlay(OverlayPatch {
            page: 1,
            mounted: vec![styled(0, 0.0), styled(1, 5.0)],
            updated: Vec::new(),
            unmounted: Vec::new(),
        }));
        host.apply(&HostEffect::ShowAffordance {
            index: StampIndex::new(0),
            left: 1.0,
            top: 2.0,
        });
        host.apply(&HostEffect::Overlay(OverlayPatch {
            page: 1,
            mounted: Vec::new(),
            updated: vec![styled(1, 50.0)],
            unmounted: vec![StampIndex::new(0)],
        }));

        assert_eq!(host.overlay.len(), 1);
        assert_eq!(host.overlay[&StampIndex::new(1)].style.left, 50.0);
        assert!(host.affordances.is_empty());
    }

    #[test]
    fn test_indicators_track_last_value() {
        let mut host = RecordingHost::new();
        host.apply(&HostEffect::PageIndicator { current: 1, count: 3 });
        host.apply(&HostEffect::PageIndicator { current: 2, count: 3 });
        host.apply(&HostEffect::ScaleIndicator { scale: 1.2 });

        assert_eq!(host.page_indicator, Some((2, 3)));
        assert_eq!(host.scale_indicator, Some(1.2));
    }
}
