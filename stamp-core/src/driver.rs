//! Async driver connecting a [`StampEditor`] to its collaborators.
//!
//! The editor itself never awaits. The driver services the effects that need
//! a collaborator (page renders and bitmap decodes), awaits their completion
//! and feeds the result back as the matching [`HostEvent`]. All other effects
//! go straight to the [`HostSurface`].

use std::collections::VecDeque;

use crate::document::{
    BitmapLoader, Document, DocumentService, DocumentSource, HostSurface, Page, Viewport,
};
use crate::{HostEffect, HostEvent, StampEditor, StampError, StampResult};

/// Raster type produced by a document service's pages.
pub type RasterOf<S> =
    <<<S as DocumentService>::Document as Document>::Page as Page>::Raster;

/// Drives a [`StampEditor`] against real collaborators.
pub struct EditorDriver<S: DocumentService, B: BitmapLoader> {
    editor: StampEditor,
    service: S,
    loader: B,
    document: Option<S::Document>,
}

impl<S: DocumentService, B: BitmapLoader> EditorDriver<S, B> {
    /// Create a driver with no document open.
    pub fn new(editor: StampEditor, service: S, loader: B) -> Self {
        Self {
            editor,
            service,
            loader,
            document: None,
        }
    }

    /// The driven editor.
    pub fn editor(&self) -> &StampEditor {
        &self.editor
    }

    /// Open a document and render its current page.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be opened or rendered.
    pub async fn open<H>(&mut self, source: DocumentSource, host: &mut H) -> StampResult<()>
    where
        H: HostSurface<Raster = RasterOf<S>, Bitmap = B::Handle>,
    {
        let document = self.service.open(source).await?;
        let page_count = document.page_count();
        self.document = Some(document);
        self.dispatch(HostEvent::DocumentOpened { page_count }, host)
            .await
    }

    /// Feed one host event and service every effect it causes.
    ///
    /// # Errors
    ///
    /// Returns the editor's error for the event, or the first collaborator
    /// failure while servicing its effects.
    pub async fn dispatch<H>(&mut self, event: HostEvent, host: &mut H) -> StampResult<()>
    where
        H: HostSurface<Raster = RasterOf<S>, Bitmap = B::Handle>,
    {
        let mut queue: VecDeque<HostEffect> = self.editor.handle(event)?.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                HostEffect::RenderPage { page, scale } => match self.render(page, scale).await {
                    Ok((raster, viewport)) => {
                        host.present_page(page, raster);
                        queue.extend(self.editor.handle(HostEvent::SurfaceReady {
                            page,
                            scale,
                            width: viewport.width,
                            height: viewport.height,
                        })?);
                    }
                    Err(e) => {
                        tracing::warn!("Render of page {page} at {scale} failed: {e}");
                        for effect in queue.drain(..) {
                            host.apply(&effect);
                        }
                        return Err(e);
                    }
                },
                HostEffect::LoadBitmap { index, src } => match self.loader.load(&src).await {
                    Ok(bitmap) => {
                        let (width, height) = (bitmap.width, bitmap.height);
                        host.present_bitmap(index, bitmap.handle);
                        queue.extend(self.editor.handle(HostEvent::BitmapLoaded {
                            index,
                            width,
                            height,
                        })?);
                    }
                    Err(e) => {
                        // Overlay effects already queued still reach the host.
                        for effect in queue.drain(..) {
                            host.apply(&effect);
                        }
                        self.editor.handle(HostEvent::BitmapFailed {
                            index,
                            reason: e.to_string(),
                        })?;
                    }
                },
                other => host.apply(&other),
            }
        }
        Ok(())
    }

    async fn render(&self, page: u32, scale: f64) -> StampResult<(RasterOf<S>, Viewport)> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| StampError::Document("no document open".to_string()))?;
        let handle = document.page(page).await?;
        let viewport = handle.viewport(scale);
        let raster = handle.render(viewport).await?;
        Ok((raster, viewport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LoadedBitmap;
    use crate::StampIndex;
    use async_trait::async_trait;

    /// Opens two-page documents; `broken_page` fails to load.
    #[derive(Default)]
    struct FakeService {
        broken_page: Option<u32>,
    }
    struct FakeDocument {
        broken_page: Option<u32>,
    }
    struct FakePage;

    #[async_trait]
    impl DocumentService for FakeService {
        type Document = FakeDocument;

        async fn open(&self, _source: DocumentSource) -> StampResult<FakeDocument> {
            Ok(FakeDocument {
                broken_page: self.broken_page,
            })
        }
    }

    #[async_trait]
    impl Document for FakeDocument {
        type Page = FakePage;

        fn page_count(&self) -> u32 {
            2
        }

        async fn page(&self, number: u32) -> StampResult<FakePage> {
            if self.broken_page == Some(number) {
                return Err(StampError::Document(format!("page {number} is damaged")));
            }
            Ok(FakePage)
        }
    }

    #[async_trait]
    impl Page for FakePage {
        type Raster = (u32, u32);

        fn viewport(&self, scale: f64) -> Viewport {
            Viewport {
                width: 800.0 * scale,
                height: 600.0 * scale,
                scale,
            }
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        async fn render(&self, viewport: Viewport) -> StampResult<(u32, u32)> {
            Ok((viewport.width as u32, viewport.height as u32))
        }
    }

    struct FakeLoader;

    #[async_trait]
    impl BitmapLoader for FakeLoader {
        type Handle = ();

        async fn load(&self, src: &str) -> StampResult<LoadedBitmap<()>> {
            if src == "broken" {
                return Err(StampError::Bitmap("corrupt".to_string()));
            }
            Ok(LoadedBitmap {
                width: 100.0,
                height: 50.0,
                handle: (),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        pages: Vec<(u32, (u32, u32))>,
        bitmaps: Vec<StampIndex>,
        effects: Vec<HostEffect>,
    }

    impl HostSurface for Recorder {
        type Raster = (u32, u32);
        type Bitmap = ();

        fn present_page(&mut self, page: u32, raster: (u32, u32)) {
            self.pages.push((page, raster));
        }

        fn present_bitmap(&mut self, index: StampIndex, _bitmap: ()) {
            self.bitmaps.push(index);
        }

        fn apply(&mut self, effect: &HostEffect) {
            self.effects.push(effect.clone());
        }
    }

    fn driver() -> EditorDriver<FakeService, FakeLoader> {
        EditorDriver::new(StampEditor::default(), FakeService::default(), FakeLoader)
    }

    #[tokio::test]
    async fn test_open_renders_first_page() {
        let mut driver = driver();
        let mut host = Recorder::default();
        driver
            .open(DocumentSource::Url("test.pdf".into()), &mut host)
            .await
            .expect("open");

        assert_eq!(host.pages, vec![(1, (800, 600))]);
        assert!(driver.editor().surface().is_ready());
    }

    #[tokio::test]
    async fn test_picked_stamp_gets_sized() {
        let mut driver = driver();
        let mut host = Recorder::default();
        driver
            .open(DocumentSource::Url("test.pdf".into()), &mut host)
            .await
            .expect("open");
        driver
            .dispatch(HostEvent::StampPicked { src: "ok".into() }, &mut host)
            .await
            .expect("pick");

        let stamp = driver
            .editor()
            .session()
            .stamp(StampIndex::new(0))
            .expect("stamp");
        assert_eq!((stamp.width, stamp.height), (100.0, 50.0));
        assert_eq!(host.bitmaps, vec![StampIndex::new(0)]);
        let overlay_updates = host
            .effects
            .iter()
            .filter(|e| matches!(e, HostEffect::Overlay(_)))
            .count();
        assert_eq!(overlay_updates, 2);
    }

    #[tokio::test]
    async fn test_zoom_rerenders_scaled_page() {
        let mut driver = driver();
        let mut host = Recorder::default();
        driver
            .open(DocumentSource::Url("test.pdf".into()), &mut host)
            .await
            .expect("open");
        driver
            .dispatch(HostEvent::SetScale { scale: 1.5 }, &mut host)
            .await
            .expect("zoom");

        assert_eq!(host.pages.last(), Some(&(1, (1200, 900))));
    }

    #[tokio::test]
    async fn test_bitmap_failure_propagates() {
        let mut driver = driver();
        let mut host = Recorder::default();
        driver
            .open(DocumentSource::Url("test.pdf".into()), &mut host)
            .await
            .expect("open");
        let result = driver
            .dispatch(HostEvent::StampPicked { src: "broken".into() }, &mut host)
            .await;

        assert!(matches!(result, Err(StampError::Bitmap(_))));
        assert_eq!(driver.editor().session().stamp_count(), 1);
    }

    #[tokio::test]
    async fn test_render_failure_still_delivers_queued_effects() {
        let service = FakeService {
            broken_page: Some(1),
        };
        let mut driver = EditorDriver::new(StampEditor::default(), service, FakeLoader);
        let mut host = Recorder::default();
        let result = driver
            .open(DocumentSource::Url("test.pdf".into()), &mut host)
            .await;

        assert!(matches!(result, Err(StampError::Document(_))));
        assert!(host.pages.is_empty());
        assert!(host
            .effects
            .contains(&HostEffect::PageIndicator { current: 1, count: 2 }));
        assert!(host
            .effects
            .contains(&HostEffect::ScaleIndicator { scale: 1.0 }));
        assert!(!driver.editor().surface().is_ready());
    }

    #[tokio::test]
    async fn test_navigation_recovers_from_failed_render() {
        let service = FakeService {
            broken_page: Some(2),
        };
        let mut driver = EditorDriver::new(StampEditor::default(), service, FakeLoader);
        let mut host = Recorder::default();
        driver
            .open(DocumentSource::Url("test.pdf".into()), &mut host)
            .await
            .expect("open");

        let result = driver.dispatch(HostEvent::NextPage, &mut host).await;
        assert!(matches!(result, Err(StampError::Document(_))));
        assert!(!driver.editor().surface().is_ready());

        driver
            .dispatch(HostEvent::PrevPage, &mut host)
            .await
            .expect("back");
        assert!(driver.editor().surface().is_ready());
        assert_eq!(host.pages, vec![(1, (800, 600)), (1, (800, 600))]);
    }
}
