//! The stamp editor: session, overlay and gesture state behind one event loop.
//!
//! Hosts push [`HostEvent`]s through [`StampEditor::handle`] and carry out the
//! returned [`HostEffect`]s. Each call runs to completion before the next, so
//! the session needs no locking.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::interaction::{self, Interactions, DEFAULT_AFFORDANCE_MARGIN};
use crate::render::{RenderSync, SurfaceBounds, SurfaceState};
use crate::session::DEFAULT_SCALE;
use crate::{HostEffect, HostEvent, Session, StampError, StampIndex, StampResult};

/// Scales closer than this are treated as the same render.
const SCALE_TOLERANCE: f64 = 1e-9;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Factor applied by zoom in / divided by zoom out.
    pub zoom_step: f64,
    /// Outward margin of the rotate affordance.
    pub affordance_margin: f64,
    /// Scale the session starts at.
    pub initial_scale: f64,
    /// Maximum events held while the page surface is not ready.
    pub max_deferred: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_step: 1.2,
            affordance_margin: DEFAULT_AFFORDANCE_MARGIN,
            initial_scale: DEFAULT_SCALE,
            max_deferred: 256,
        }
    }
}

/// Stamp editor state machine.
#[derive(Debug, Clone)]
pub struct StampEditor {
    config: EditorConfig,
    session: Session,
    surface: SurfaceState,
    overlay: RenderSync,
    interactions: Interactions,
    deferred: VecDeque<HostEvent>,
}

impl Default for StampEditor {
    fn default() -> Self {
        Self::with_session(EditorConfig::default(), Session::new())
    }
}

impl StampEditor {
    /// Create an editor with no document open.
    ///
    /// The starting scale is rounded to one decimal, as every later zoom is.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::InvalidScale`] if `config.initial_scale` does not
    /// round to a positive finite number.
    pub fn new(config: EditorConfig) -> StampResult<Self> {
        let session = Session::with_scale(config.initial_scale)?;
        Ok(Self::with_session(config, session))
    }

    fn with_session(mut config: EditorConfig, session: Session) -> Self {
        config.initial_scale = session.current_scale();
        Self {
            config,
            session,
            surface: SurfaceState::Closed,
            overlay: RenderSync::new(),
            interactions: Interactions::new(),
            deferred: VecDeque::new(),
        }
    }

    /// Editor configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The stamp store.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Page surface readiness.
    #[must_use]
    pub fn surface(&self) -> SurfaceState {
        self.surface
    }

    /// What the overlay currently shows.
    #[must_use]
    pub fn overlay(&self) -> &RenderSync {
        &self.overlay
    }

    /// Gesture state of visible stamps.
    #[must_use]
    pub fn interactions(&self) -> &Interactions {
        &self.interactions
    }

    /// Number of events waiting for the surface.
    #[must_use]
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Process one host event.
    ///
    /// # Errors
    ///
    /// Returns an error for gestures on stamps that are not visible, invalid
    /// scales, and bitmap failures reported by the host. The editor's state
    /// is unchanged by a failed event.
    pub fn handle(&mut self, event: HostEvent) -> StampResult<Vec<HostEffect>> {
        let mut effects = Vec::new();
        self.dispatch(event, &mut effects)?;
        Ok(effects)
    }

    fn dispatch(&mut self, event: HostEvent, effects: &mut Vec<HostEffect>) -> StampResult<()> {
        if event.needs_surface() {
            if let Some(bounds) = self.surface.bounds() {
                return self.dispatch_gesture(event, bounds, effects);
            }
            self.defer(event);
            return Ok(());
        }

        match event {
            HostEvent::DocumentOpened { page_count } => {
                tracing::info!("Document opened with {page_count} pages");
                self.session.set_page_count(page_count);
                self.page_changed(effects);
                effects.push(HostEffect::ScaleIndicator {
                    scale: self.session.current_scale(),
                });
            }
            HostEvent::SurfaceReady {
                page,
                scale,
                width,
                height,
            } => self.surface_ready(page, scale, SurfaceBounds { width, height }, effects)?,
            HostEvent::StampPicked { src } => {
                let page = self.session.current_page();
                let index = self.session.create_stamp(page, src.clone());
                tracing::info!(
                    "Stamp {index} added to page {page} ({} total)",
                    self.session.stamp_count()
                );
                self.sync_overlay(effects);
                effects.push(HostEffect::LoadBitmap { index, src });
            }
            HostEvent::BitmapLoaded {
                index,
                width,
                height,
            } => {
                if self.session.apply_natural_size(index, width, height)? {
                    self.sync_overlay(effects);
                }
            }
            HostEvent::BitmapFailed { index, reason } => {
                if self.session.stamp(index).is_none() {
                    return Err(StampError::StampNotFound(index));
                }
                tracing::warn!("Bitmap for stamp {index} failed: {reason}");
                return Err(StampError::Bitmap(format!("stamp {index}: {reason}")));
            }
            HostEvent::PrevPage => {
                if self.session.prev_page() {
                    self.page_changed(effects);
                }
            }
            HostEvent::NextPage => {
                if self.session.next_page() {
                    self.page_changed(effects);
                }
            }
            HostEvent::GoToPage { page } => {
                if self.session.set_page(page) {
                    self.page_changed(effects);
                }
            }
            HostEvent::ZoomIn => {
                let scale = self.session.current_scale() * self.config.zoom_step;
                self.scale_changed(scale, effects)?;
            }
            HostEvent::ZoomOut => {
                let scale = self.session.current_scale() / self.config.zoom_step;
                self.scale_changed(scale, effects)?;
            }
            HostEvent::SetScale { scale } => self.scale_changed(scale, effects)?,
            HostEvent::PointerDown { .. }
            | HostEvent::PointerMove { .. }
            | HostEvent::PointerUp { .. }
            | HostEvent::PointerEnter { .. }
            | HostEvent::PointerLeave { .. }
            | HostEvent::RotateClicked { .. } => {}
        }
        Ok(())
    }

    fn dispatch_gesture(
        &mut self,
        event: HostEvent,
        bounds: SurfaceBounds,
        effects: &mut Vec<HostEffect>,
    ) -> StampResult<()> {
        let scale = self.session.current_scale();
        let margin = self.config.affordance_margin;

        match event {
            HostEvent::PointerDown { index, x, y } => {
                let stamp = self
                    .session
                    .stamp(index)
                    .ok_or(StampError::StampNotFound(index))?;
                let machine = self
                    .interactions
                    .get_mut(index)
                    .ok_or(StampError::StampNotFound(index))?;
                machine.press(stamp, x, y)?;
            }
            HostEvent::PointerMove { x, y } => {
                for index in self.interactions.dragging() {
                    let (Some(stamp), Some(machine)) =
                        (self.session.stamp_mut(index), self.interactions.get_mut(index))
                    else {
                        continue;
                    };
                    machine.drag_to(stamp, x, y, scale, bounds)?;
                    let visible = machine.hover().is_visible();
                    let position = interaction::affordance_position(stamp, scale, margin);
                    self.sync_overlay(effects);
                    if visible {
                        effects.push(HostEffect::ShowAffordance {
                            index,
                            left: position.left,
                            top: position.top,
                        });
                    }
                }
            }
            HostEvent::PointerUp { .. } => {
                for index in self.interactions.dragging() {
                    let (Some(stamp), Some(machine)) =
                        (self.session.stamp(index), self.interactions.get_mut(index))
                    else {
                        continue;
                    };
                    let readout = machine.release(stamp, scale, bounds)?;
                    effects.push(HostEffect::Readout(readout));
                }
            }
            HostEvent::PointerEnter { index, target } => {
                let stamp = self
                    .session
                    .stamp(index)
                    .ok_or(StampError::StampNotFound(index))?;
                let machine = self
                    .interactions
                    .get_mut(index)
                    .ok_or(StampError::StampNotFound(index))?;
                machine.enter(target);
                let position = interaction::affordance_position(stamp, scale, margin);
                effects.push(HostEffect::ShowAffordance {
                    index,
                    left: position.left,
                    top: position.top,
                });
            }
            HostEvent::PointerLeave { index, target } => {
                let machine = self
                    .interactions
                    .get_mut(index)
                    .ok_or(StampError::StampNotFound(index))?;
                if machine.leave(target) {
                    effects.push(HostEffect::HideAffordance { index });
                }
            }
            HostEvent::RotateClicked { index } => {
                let visible = self
                    .interactions
                    .get(index)
                    .ok_or(StampError::StampNotFound(index))?
                    .hover()
                    .is_visible();
                let stamp = self
                    .session
                    .stamp_mut(index)
                    .ok_or(StampError::StampNotFound(index))?;
                interaction::rotate(stamp, scale, bounds);
                let position = interaction::affordance_position(stamp, scale, margin);
                self.sync_overlay(effects);
                if visible {
                    effects.push(HostEffect::ShowAffordance {
                        index,
                        left: position.left,
                        top: position.top,
                    });
                }
            }
            other => return self.dispatch(other, effects),
        }
        Ok(())
    }

    fn defer(&mut self, event: HostEvent) {
        if self.deferred.len() >= self.config.max_deferred {
            if let Some(dropped) = self.deferred.pop_front() {
                tracing::warn!("Deferred event queue full; dropping {dropped:?}");
            }
        }
        tracing::debug!("Surface not ready; deferring {event:?}");
        self.deferred.push_back(event);
    }

    fn surface_ready(
        &mut self,
        page: u32,
        scale: f64,
        bounds: SurfaceBounds,
        effects: &mut Vec<HostEffect>,
    ) -> StampResult<()> {
        let current = (page == self.session.current_page())
            && (scale - self.session.current_scale()).abs() < SCALE_TOLERANCE;
        if !current {
            tracing::debug!("Ignoring stale render of page {page} at {scale}");
            return Ok(());
        }

        tracing::debug!(
            "Surface ready: page {page} at {scale} ({}x{})",
            bounds.width,
            bounds.height
        );
        self.surface = SurfaceState::Ready {
            page,
            scale,
            bounds,
        };
        self.sync_overlay(effects);

        while let Some(event) = self.deferred.pop_front() {
            if let Err(e) = self.dispatch(event, effects) {
                tracing::warn!("Deferred event failed: {e}");
            }
        }
        Ok(())
    }

    fn page_changed(&mut self, effects: &mut Vec<HostEffect>) {
        effects.push(HostEffect::PageIndicator {
            current: self.session.current_page(),
            count: self.session.page_count(),
        });
        self.request_render(effects);
    }

    fn scale_changed(&mut self, scale: f64, effects: &mut Vec<HostEffect>) -> StampResult<()> {
        let previous = self.session.current_scale();
        let applied = self.session.set_scale(scale)?;
        effects.push(HostEffect::ScaleIndicator { scale: applied });
        if (applied - previous).abs() >= SCALE_TOLERANCE {
            self.request_render(effects);
        }
        Ok(())
    }

    fn request_render(&mut self, effects: &mut Vec<HostEffect>) {
        if self.session.page_count() == 0 {
            return;
        }
        let page = self.session.current_page();
        let scale = self.session.current_scale();
        self.surface = SurfaceState::Pending { page, scale };
        effects.push(HostEffect::RenderPage { page, scale });
    }

    /// Re-apply store state to the overlay, if the surface allows it.
    fn sync_overlay(&mut self, effects: &mut Vec<HostEffect>) {
        if !self.surface.is_ready() {
            return;
        }
        let patch = self.overlay.sync(&self.session);
        for index in &patch.unmounted {
            self.interactions.detach(*index);
        }
        for styled in &patch.mounted {
            self.interactions.attach(styled.index);
        }
        if !patch.is_empty() {
            effects.push(HostEffect::Overlay(patch));
        }
    }

    /// Check whether a stamp is visible on the overlay.
    #[must_use]
    pub fn is_visible(&self, index: StampIndex) -> bool {
        self.overlay.is_mounted(index)
    }
}
