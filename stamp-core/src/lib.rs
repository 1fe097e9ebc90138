//! # Saorsa Stamp Core
//!
//! Stamp transform and interaction engine: movable, rotatable image stamps
//! overlaid on a paginated, zoomable document surface.
//! Compiles to WASM for browser hosts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               stamp-core                    │
//! ├─────────────────────────────────────────────┤
//! │  Session         │  Interaction             │
//! │  - Stamp store   │  - Drag state machine    │
//! │  - Page / zoom   │  - Rotate + re-clamp     │
//! │  - Rescaling     │  - Hover affordance      │
//! ├─────────────────────────────────────────────┤
//! │  Render Sync     │  Geometry                │
//! │  - Overlay diff  │  - Rotated footprint     │
//! │  - Surface gate  │  - Axis offset / clamp   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Hosts drive a [`StampEditor`] with [`HostEvent`]s and apply the
//! [`HostEffect`]s it returns; [`driver::EditorDriver`] does this against
//! async document and bitmap collaborators.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod driver;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod render;
pub mod session;
pub mod stamp;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use document::{
    BitmapLoader, Document, DocumentService, DocumentSource, HostSurface, LoadedBitmap, Page,
    Viewport,
};
pub use driver::EditorDriver;
pub use editor::{EditorConfig, StampEditor};
pub use error::{StampError, StampResult};
pub use event::{HostEffect, HostEvent};
pub use geometry::{Bounds, VisualBox};
pub use interaction::{
    AffordancePosition, DragState, HoverState, HoverTarget, Interactions, PositionReadout,
    StampInteraction,
};
pub use render::{OverlayPatch, RenderSync, StampStyle, StyledStamp, SurfaceBounds, SurfaceState};
pub use session::Session;
pub use stamp::{Rotation, Stamp, StampIndex};

/// Stamp core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
