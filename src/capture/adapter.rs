use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::compose::CaptureBitmap;
use crate::config::{CaptureConfig, CaptureFormat};
use crate::error::AppResult;
use crate::token::{RequestToken, TokenCounter};

use super::client::{AnalysisClient, AnalysisResponse, CategoryLabel};
use super::encode::encode_bitmap;

/// Outcome of one submission, tagged so the caller can drop stale replies.
#[derive(Debug)]
pub struct Submission {
    pub token: RequestToken,
    pub encode_elapsed: Option<Duration>,
    pub result: AppResult<AnalysisResponse>,
}

/// Encodes captures and hands them to the analysis collaborator.
pub struct CaptureAdapter {
    client: Arc<dyn AnalysisClient>,
    format: CaptureFormat,
    jpeg_quality: u8,
    tokens: TokenCounter,
}

impl CaptureAdapter {
    pub fn new(client: Arc<dyn AnalysisClient>, format: CaptureFormat, jpeg_quality: u8) -> Self {
        Self {
            client,
            format,
            jpeg_quality,
            tokens: TokenCounter::default(),
        }
    }

    pub fn from_config(client: Arc<dyn AnalysisClient>, config: &CaptureConfig) -> Self {
        Self::new(client, config.format, config.jpeg_quality)
    }

    /// Whether `token` belongs to the most recent submission.
    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.tokens.is_latest(token)
    }

    /// Encodes `bitmap` and calls the collaborator exactly once.
    ///
    /// The collaborator's reply or error is returned as-is. Starting another
    /// submission while this one is in flight makes this one stale.
    pub async fn submit(&self, bitmap: CaptureBitmap, label: &CategoryLabel) -> Submission {
        let token = self.tokens.next();
        let started = Instant::now();
        let image = match encode_bitmap(bitmap, self.format, self.jpeg_quality) {
            Ok(image) => image,
            Err(err) => {
                warn!("submission {} not sent: {err}", token.value());
                return Submission {
                    token,
                    encode_elapsed: None,
                    result: Err(err),
                };
            }
        };
        let encode_elapsed = started.elapsed();

        info!(
            "submission {}: {}x{} {} ({} bytes) labeled {:?}",
            token.value(),
            image.width,
            image.height,
            image.mime_type(),
            image.bytes.len(),
            label.as_str()
        );
        let result = self.client.analyze(image, label.as_str()).await;
        if !self.is_latest(token) {
            warn!("submission {} was superseded", token.value());
        }

        Submission {
            token,
            encode_elapsed: Some(encode_elapsed),
            result,
        }
    }
}
