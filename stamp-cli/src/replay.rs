//! Script replay against a driven editor.

use anyhow::Context;
use serde::Serialize;
use stamp_core::{
    DocumentService, DocumentSource, EditorConfig, EditorDriver, HostEvent, Session, StampEditor,
};
use stamp_renderer::{
    encode_data_uri, BlankDocumentService, DataUriLoader, RasterDocument, RasterDocumentService,
};

use crate::host::RecordingHost;
use crate::script::{Script, ScriptStep};
use crate::ReplayConfig;

/// A step the editor rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    /// Zero-based step number.
    pub step: usize,
    /// Error message.
    pub error: String,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Final session snapshot.
    pub session: Session,
    /// Final host state.
    pub host: RecordingHost,
    /// Steps that failed; replay continues past them.
    pub failures: Vec<StepFailure>,
}

/// Replay `script` against a fresh editor configured by `config`.
///
/// Step failures are collected in the report. Only failing to open the
/// document or to read a picked image aborts the replay.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the document cannot be
/// opened, or a picked image file cannot be read.
pub async fn replay(config: &ReplayConfig, script: &Script) -> anyhow::Result<ReplayReport> {
    let editor = StampEditor::new(EditorConfig {
        initial_scale: config.scale,
        ..EditorConfig::default()
    })
    .context("Invalid editor configuration")?;

    match &config.document {
        Some(path) => {
            let source = DocumentSource::Url(path.to_string_lossy().into_owned());
            run(editor, RasterDocumentService::new(), source, script).await
        }
        None => {
            let service = BlankDocumentService {
                page_count: config.pages,
                width: config.page_width,
                height: config.page_height,
            };
            run(editor, service, DocumentSource::Bytes(Vec::new()), script).await
        }
    }
}

async fn run<S>(
    editor: StampEditor,
    service: S,
    source: DocumentSource,
    script: &Script,
) -> anyhow::Result<ReplayReport>
where
    S: DocumentService<Document = RasterDocument>,
{
    let mut driver = EditorDriver::new(editor, service, DataUriLoader::new());
    let mut host = RecordingHost::new();
    driver
        .open(source, &mut host)
        .await
        .context("Failed to open document")?;

    let mut failures = Vec::new();
    for (step, entry) in script.steps().iter().enumerate() {
        let event = match entry {
            ScriptStep::PickImage { pick_image } => {
                let bytes = tokio::fs::read(pick_image)
                    .await
                    .with_context(|| format!("Failed to read image {}", pick_image.display()))?;
                HostEvent::StampPicked {
                    src: encode_data_uri(&bytes),
                }
            }
            ScriptStep::Event(event) => event.clone(),
        };
        tracing::debug!("Step {step}: {event:?}");
        if let Err(e) = driver.dispatch(event, &mut host).await {
            tracing::warn!("Step {step} failed: {e}");
            failures.push(StepFailure {
                step,
                error: e.to_string(),
            });
        }
    }

    tracing::info!(
        "Replayed {} steps ({} failed)",
        script.len(),
        failures.len()
    );
    Ok(ReplayReport {
        session: driver.editor().session().clone(),
        host,
        failures,
    })
}
