//! Stamps - image annotations anchored to a document page.

use serde::{Deserialize, Serialize};

/// Stable identifier for a stamp.
///
/// Assigned from the insertion count at creation time and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampIndex(usize);

impl StampIndex {
    /// Create from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for StampIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quarter-turn rotation, serialized as integer degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// Upright.
    #[default]
    Deg0,
    /// Quarter turn clockwise.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three quarter turns clockwise.
    Deg270,
}

impl Rotation {
    /// Rotation in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// The next +90° step, wrapping at 360.
    #[must_use]
    pub const fn turned(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(format!("rotation must be 0, 90, 180 or 270, got {other}")),
        }
    }
}

/// One placed stamp annotation.
///
/// `x`/`y` are stored in *scaled* container pixels (they already reflect the
/// session's current scale). `width`/`height` are the bitmap's natural,
/// unscaled size, zero until the bitmap has loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    /// Stable identity.
    pub index: StampIndex,
    /// Page the stamp is anchored to (1-based).
    pub page: u32,
    /// Anchor x of the unrotated box, in scaled pixels.
    pub x: f64,
    /// Anchor y of the unrotated box, in scaled pixels.
    pub y: f64,
    /// Current rotation.
    pub rotation: Rotation,
    /// Natural bitmap width.
    pub width: f64,
    /// Natural bitmap height.
    pub height: f64,
    /// Image payload reference (typically a data URI).
    pub src: String,
}

impl Stamp {
    /// Create an unplaced, unsized stamp.
    #[must_use]
    pub fn new(index: StampIndex, page: u32, src: impl Into<String>) -> Self {
        Self {
            index,
            page,
            x: 0.0,
            y: 0.0,
            rotation: Rotation::Deg0,
            width: 0.0,
            height: 0.0,
            src: src.into(),
        }
    }

    /// Whether the bitmap's natural size has been recorded.
    #[must_use]
    pub fn is_sized(&self) -> bool {
        self.width > 0.0 || self.height > 0.0
    }

    /// On-screen `(width, height)` of the unrotated box at `scale`.
    #[must_use]
    pub fn displayed_size(&self, scale: f64) -> (f64, f64) {
        (self.width * scale, self.height * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps_after_four_turns() {
        let start = Rotation::Deg90;
        let end = start.turned().turned().turned().turned();
        assert_eq!(start, end);
        assert_eq!(Rotation::Deg270.turned(), Rotation::Deg0);
    }

    #[test]
    fn test_rotation_serializes_as_degrees() {
        let json = serde_json::to_string(&Rotation::Deg180).expect("serialize");
        assert_eq!(json, "180");
        let parsed: Rotation = serde_json::from_str("270").expect("deserialize");
        assert_eq!(parsed, Rotation::Deg270);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn test_new_stamp_is_unplaced_and_unsized() {
        let stamp = Stamp::new(StampIndex::new(2), 3, "data:image/png;base64,AAAA");
        assert_eq!(stamp.index.get(), 2);
        assert_eq!(stamp.page, 3);
        assert_eq!((stamp.x, stamp.y), (0.0, 0.0));
        assert_eq!(stamp.rotation, Rotation::Deg0);
        assert!(!stamp.is_sized());
    }
}
