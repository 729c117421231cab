use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::domain::ports::ReportSink;
use crate::errors::ApiError;

/// Streamed HTTP download into local storage. Progress is whole percent
/// points derived from bytes written over `Content-Length`; with no usable
/// content length, a single 100 is reported once the body ends non-empty.
pub struct HttpReportSink {
    http: reqwest::Client,
}

impl HttpReportSink {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        Ok(HttpReportSink {
            http: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ReportSink for HttpReportSink {
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(u8) + Send),
    ) -> Result<u64, ApiError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let content_length = response.content_length().filter(|len| *len > 0);

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        let mut last_reported: Option<u8> = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(total) = content_length {
                let pct = percent(written, total);
                if last_reported != Some(pct) {
                    last_reported = Some(pct);
                    on_progress(pct);
                }
            }
        }
        file.flush().await?;

        if content_length.is_none() && written > 0 {
            on_progress(100);
        }
        log::debug!("Downloaded {written} bytes to {}", dest.display());
        Ok(written)
    }

    async fn discard(&self, dest: &Path) -> Result<(), ApiError> {
        match tokio::fs::remove_file(dest).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whole-percent progress, clamped so a server lying about Content-Length
/// never reports over 100.
fn percent(written: u64, total: u64) -> u8 {
    (written.saturating_mul(100) / total).min(100) as u8
}
