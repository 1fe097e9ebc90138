//! Document session: current page, zoom scale and the stamp collection.

use serde::{Deserialize, Serialize};

use crate::{Stamp, StampError, StampIndex, StampResult};

/// Default zoom scale (1.0 = 100%).
pub const DEFAULT_SCALE: f64 = 1.0;

/// Round a scale to one decimal place.
#[must_use]
pub fn round_scale(scale: f64) -> f64 {
    (scale * 10.0).round() / 10.0
}

/// Round `scale` and check that it is a usable zoom factor.
///
/// # Errors
///
/// Returns [`StampError::InvalidScale`] if the rounded scale is not a
/// positive finite number.
pub fn checked_scale(scale: f64) -> StampResult<f64> {
    let rounded = round_scale(scale);
    if !rounded.is_finite() || rounded <= 0.0 {
        return Err(StampError::InvalidScale(rounded));
    }
    Ok(rounded)
}

/// The authoritative stamp store plus page/zoom state.
///
/// Stamps are kept in creation order, so a stamp's [`StampIndex`] is also its
/// position in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Page currently shown (1-based).
    current_page: u32,
    /// Number of pages in the open document (0 before a document is open).
    page_count: u32,
    /// Current zoom scale.
    current_scale: f64,
    /// All stamps across all pages.
    stamps: Vec<Stamp>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session on page 1 at 100% zoom.
    #[must_use]
    pub fn new() -> Self {
        Self::empty(DEFAULT_SCALE)
    }

    /// Create an empty session with a starting scale, rounded to one decimal.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::InvalidScale`] if the rounded scale is not a
    /// positive finite number.
    pub fn with_scale(scale: f64) -> StampResult<Self> {
        Ok(Self::empty(checked_scale(scale)?))
    }

    fn empty(scale: f64) -> Self {
        Self {
            current_page: 1,
            page_count: 0,
            current_scale: scale,
            stamps: Vec::new(),
        }
    }

    /// Page currently shown.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Number of pages in the open document.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Current zoom scale.
    #[must_use]
    pub fn current_scale(&self) -> f64 {
        self.current_scale
    }

    /// Record the page count of a newly opened document.
    ///
    /// The current page is pulled back inside the new document if needed.
    pub fn set_page_count(&mut self, page_count: u32) {
        self.page_count = page_count;
        if page_count > 0 && self.current_page > page_count {
            self.current_page = page_count;
        }
        tracing::debug!("Document has {page_count} pages");
    }

    /// Append a new stamp on `page` and return its index.
    pub fn create_stamp(&mut self, page: u32, src: impl Into<String>) -> StampIndex {
        let index = StampIndex::new(self.stamps.len());
        self.stamps.push(Stamp::new(index, page, src));
        tracing::debug!("Created stamp {index} on page {page}");
        index
    }

    /// Change the zoom scale, rescaling every stamp's anchor.
    ///
    /// The scale is rounded to one decimal and every stamp on every page has
    /// its `x`/`y` multiplied by `new / current`. Anchors are *not* re-clamped
    /// against the resized page. Returns the applied scale.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::InvalidScale`] if the rounded scale is not a
    /// positive finite number.
    pub fn set_scale(&mut self, scale: f64) -> StampResult<f64> {
        let scale = checked_scale(scale)?;

        let ratio = scale / self.current_scale;
        for stamp in &mut self.stamps {
            stamp.x *= ratio;
            stamp.y *= ratio;
        }
        tracing::debug!(
            "Scale {} -> {scale} (ratio {ratio:.4})",
            self.current_scale
        );
        self.current_scale = scale;
        Ok(scale)
    }

    /// Move to page `page`.
    ///
    /// Out-of-range pages are ignored. Returns whether the page changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.page_count {
            tracing::debug!("Ignoring navigation to page {page} of {}", self.page_count);
            return false;
        }
        let changed = page != self.current_page;
        self.current_page = page;
        changed
    }

    /// Move to the next page if there is one.
    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_add(1))
    }

    /// Move to the previous page if there is one.
    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// Record a stamp's natural bitmap size.
    ///
    /// Each dimension is written only while it is still zero, so a size that
    /// has been captured once is never overwritten. Returns whether anything
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::StampNotFound`] if the stamp does not exist.
    pub fn apply_natural_size(
        &mut self,
        index: StampIndex,
        width: f64,
        height: f64,
    ) -> StampResult<bool> {
        let stamp = self
            .stamp_mut(index)
            .ok_or(StampError::StampNotFound(index))?;

        let mut changed = false;
        if stamp.width <= 0.0 {
            stamp.width = width;
            changed = true;
        }
        if stamp.height <= 0.0 {
            stamp.height = height;
            changed = true;
        }
        if changed {
            tracing::debug!("Stamp {index} sized {}x{}", stamp.width, stamp.height);
        }
        Ok(changed)
    }

    /// Get a stamp by index.
    #[must_use]
    pub fn stamp(&self, index: StampIndex) -> Option<&Stamp> {
        self.stamps.get(index.get()).filter(|s| s.index == index)
    }

    /// Get a mutable reference to a stamp by index.
    pub fn stamp_mut(&mut self, index: StampIndex) -> Option<&mut Stamp> {
        self.stamps.get_mut(index.get()).filter(|s| s.index == index)
    }

    /// All stamps in creation order.
    pub fn stamps(&self) -> impl Iterator<Item = &Stamp> {
        self.stamps.iter()
    }

    /// Stamps anchored to `page`, in creation order.
    pub fn stamps_on_page(&self, page: u32) -> impl Iterator<Item = &Stamp> {
        self.stamps.iter().filter(move |s| s.page == page)
    }

    /// Number of stamps across all pages.
    #[must_use]
    pub fn stamp_count(&self) -> usize {
        self.stamps.len()
    }

    /// Check if no stamps have been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Serialize the session to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> StampResult<String> {
        serde_json::to_string(self).map_err(StampError::Serialization)
    }

    /// Deserialize a session from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> StampResult<Self> {
        serde_json::from_str(json).map_err(StampError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_pages(pages: u32) -> Session {
        let mut session = Session::new();
        session.set_page_count(pages);
        session
    }

    #[test]
    fn test_create_stamp_uses_insertion_count() {
        let mut session = session_with_pages(5);
        session.create_stamp(1, "a");
        session.create_stamp(1, "b");

        let index = session.create_stamp(3, "c");
        assert_eq!(index, StampIndex::new(2));

        let stamp = session.stamp(index).expect("stamp exists");
        assert_eq!(stamp.page, 3);
        assert_eq!((stamp.x, stamp.y, stamp.width, stamp.height), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(stamp.rotation.degrees(), 0);
    }

    #[test]
    fn test_set_scale_rescales_every_page() {
        let mut session = session_with_pages(2);
        let a = session.create_stamp(1, "a");
        let b = session.create_stamp(2, "b");
        session.stamp_mut(a).expect("a").x = 100.0;
        session.stamp_mut(b).expect("b").y = 40.0;

        assert!((session.set_scale(1.2).expect("scale") - 1.2).abs() < f64::EPSILON);
        assert!((session.stamp(a).expect("a").x - 120.0).abs() < 1e-9);
        assert!((session.stamp(b).expect("b").y - 48.0).abs() < 1e-9);

        session.set_scale(1.0).expect("scale");
        assert!((session.stamp(a).expect("a").x - 100.0).abs() < 1e-9);
        assert!((session.stamp(b).expect("b").y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_scale_round_trip() {
        let mut session = session_with_pages(1);
        let positions = [(13.0, 7.5), (250.25, 410.0), (0.0, 599.0)];
        for (x, y) in positions {
            let index = session.create_stamp(1, "s");
            let stamp = session.stamp_mut(index).expect("stamp");
            stamp.x = x;
            stamp.y = y;
        }

        session.set_scale(2.3).expect("s1");
        session.set_scale(0.7).expect("s2");
        session.set_scale(2.3).expect("s1 again");
        session.set_scale(1.0).expect("back");

        for (stamp, (x, y)) in session.stamps().zip(positions) {
            assert!((stamp.x - x).abs() < 1e-9);
            assert!((stamp.y - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_set_scale_rounds_to_one_decimal() {
        let mut session = Session::new();
        let applied = session.set_scale(1.44).expect("scale");
        assert!((applied - 1.4).abs() < 1e-12);
        assert!((session.current_scale() - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_set_scale_rejects_zero_after_rounding() {
        let mut session = Session::new();
        assert!(matches!(
            session.set_scale(0.04),
            Err(StampError::InvalidScale(_))
        ));
        assert!(session.set_scale(f64::NAN).is_err());
        assert!((session.current_scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_scale_validates_starting_scale() {
        let session = Session::with_scale(1.26).expect("scale");
        assert!((session.current_scale() - 1.3).abs() < 1e-12);

        assert!(matches!(
            Session::with_scale(0.0),
            Err(StampError::InvalidScale(_))
        ));
        assert!(Session::with_scale(-2.0).is_err());
        assert!(Session::with_scale(f64::INFINITY).is_err());
    }

    #[test]
    fn test_set_scale_does_not_reclamp() {
        let mut session = session_with_pages(1);
        let index = session.create_stamp(1, "s");
        session.stamp_mut(index).expect("stamp").x = 700.0;

        // Doubling pushes the anchor past what the old page could hold; the
        // store leaves it unclamped.
        session.set_scale(2.0).expect("scale");
        assert!((session.stamp(index).expect("stamp").x - 1400.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_page_ignores_out_of_range() {
        let mut session = session_with_pages(3);
        assert!(!session.set_page(0));
        assert!(!session.set_page(4));
        assert_eq!(session.current_page(), 1);

        assert!(session.set_page(3));
        assert!(!session.next_page());
        assert_eq!(session.current_page(), 3);
        assert!(session.prev_page());
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn test_prev_page_stops_at_first_page() {
        let mut session = session_with_pages(3);
        assert!(!session.prev_page());
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn test_natural_size_is_captured_once() {
        let mut session = session_with_pages(1);
        let index = session.create_stamp(1, "s");

        assert!(session.apply_natural_size(index, 100.0, 50.0).expect("size"));
        assert!(!session.apply_natural_size(index, 300.0, 300.0).expect("size"));

        let stamp = session.stamp(index).expect("stamp");
        assert_eq!((stamp.width, stamp.height), (100.0, 50.0));
    }

    #[test]
    fn test_natural_size_unknown_stamp() {
        let mut session = Session::new();
        let result = session.apply_natural_size(StampIndex::new(9), 1.0, 1.0);
        assert!(matches!(result, Err(StampError::StampNotFound(_))));
    }

    #[test]
    fn test_page_count_pulls_current_page_back() {
        let mut session = session_with_pages(10);
        session.set_page(8);
        session.set_page_count(4);
        assert_eq!(session.current_page(), 4);
    }

    #[test]
    fn test_session_json_roundtrip() {
        let mut session = session_with_pages(2);
        let index = session.create_stamp(2, "data:image/png;base64,AAAA");
        session.apply_natural_size(index, 20.0, 10.0).expect("size");

        let json = session.to_json().expect("to_json");
        let restored = Session::from_json(&json).expect("from_json");
        assert_eq!(session, restored);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_scale_round_trip_restores_anchors(
                anchors in prop::collection::vec((0.0f64..1_000.0, 0.0f64..1_000.0), 1..8),
                first in 0.1f64..5.0,
                second in 0.1f64..5.0,
            ) {
                let mut session = Session::new();
                session.set_page_count(1);
                for (x, y) in &anchors {
                    let index = session.create_stamp(1, "s");
                    let stamp = session.stamp_mut(index).expect("stamp");
                    stamp.x = *x;
                    stamp.y = *y;
                }

                session.set_scale(first).expect("first");
                let before: Vec<(f64, f64)> = session.stamps().map(|s| (s.x, s.y)).collect();
                session.set_scale(second).expect("second");
                session.set_scale(first).expect("back");

                for (stamp, (x, y)) in session.stamps().zip(before) {
                    prop_assert!((stamp.x - x).abs() < 1e-6);
                    prop_assert!((stamp.y - y).abs() < 1e-6);
                }
            }
        }
    }
}
