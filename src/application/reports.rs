use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::domain::ports::{DocumentViewer, ReportApi, ReportSink};
use crate::domain::report::{ReportFormat, ReportPhase};
use crate::errors::ApiError;

fn lock(phase: &Mutex<ReportPhase>) -> std::sync::MutexGuard<'_, ReportPhase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Generate → download (with progress) → verify → open.
///
/// A zero-byte result is discarded and reported as `EmptyDownload`, which
/// is deliberately not a transport error: the server said success but sent
/// no content. There is no cancellation; an error at any step resets
/// progress and parks the flow in `Error` until the next run.
pub struct ReportWorkflow<G, S, V> {
    gateway: Arc<G>,
    sink: S,
    viewer: V,
    phase: Mutex<ReportPhase>,
}

impl<G, S, V> ReportWorkflow<G, S, V>
where
    G: ReportApi,
    S: ReportSink,
    V: DocumentViewer,
{
    pub fn new(gateway: Arc<G>, sink: S, viewer: V) -> Self {
        ReportWorkflow {
            gateway,
            sink,
            viewer,
            phase: Mutex::new(ReportPhase::Idle),
        }
    }

    pub fn phase(&self) -> ReportPhase {
        lock(&self.phase).clone()
    }

    /// Run the whole flow for one report. Returns the path of the opened
    /// file. `on_progress` receives download percentages, and a final 0 if
    /// the flow fails.
    pub async fn run(
        &self,
        subject_id: Uuid,
        kind: &str,
        format: ReportFormat,
        dest_dir: &Path,
        on_progress: &mut (dyn FnMut(u8) + Send),
    ) -> Result<PathBuf, ApiError> {
        match self
            .drive(subject_id, kind, format, dest_dir, on_progress)
            .await
        {
            Ok(path) => {
                *lock(&self.phase) = ReportPhase::Idle;
                Ok(path)
            }
            Err(e) => {
                log::warn!("Report flow failed for {subject_id}: {e}");
                *lock(&self.phase) = ReportPhase::Error {
                    message: e.to_string(),
                };
                on_progress(0);
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        subject_id: Uuid,
        kind: &str,
        format: ReportFormat,
        dest_dir: &Path,
        on_progress: &mut (dyn FnMut(u8) + Send),
    ) -> Result<PathBuf, ApiError> {
        *lock(&self.phase) = ReportPhase::Generating;
        let report = self.gateway.generate_report(subject_id, kind, format).await?;

        *lock(&self.phase) = ReportPhase::Downloading { percent: 0 };
        let dest = dest_dir.join(&report.file_name);
        let phase = &self.phase;
        let mut progress = |percent: u8| {
            *lock(phase) = ReportPhase::Downloading { percent };
            on_progress(percent);
        };
        let written = self
            .sink
            .download(&report.download_url, &dest, &mut progress)
            .await?;

        *lock(&self.phase) = ReportPhase::Verifying;
        if written == 0 {
            // Success response with no content: drop the file and report it
            // as an integrity failure, not a network one.
            self.sink.discard(&dest).await?;
            return Err(ApiError::EmptyDownload);
        }

        *lock(&self.phase) = ReportPhase::Opening;
        self.viewer.open(&dest).await?;
        Ok(dest)
    }
}
