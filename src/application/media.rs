use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::MediaApi;
use crate::errors::ApiError;

/// Uploads a captured video for a subject (e.g. a pet profile).
pub struct MediaWorkflow<G> {
    gateway: Arc<G>,
}

impl<G: MediaApi> MediaWorkflow<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        MediaWorkflow { gateway }
    }

    pub async fn upload_video(
        &self,
        subject_id: Uuid,
        title: &str,
        path: &Path,
    ) -> Result<(), ApiError> {
        log::info!("Uploading video '{title}' for {subject_id}");
        self.gateway.upload_video(subject_id, title, path).await
    }
}
