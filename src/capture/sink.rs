use std::fs;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};

use super::client::{AnalysisClient, AnalysisResponse};
use super::encode::EncodedImage;

/// Stand-in collaborator that stores the payload on disk instead of sending
/// it anywhere: `<stem>.<ext>` plus a `<stem>.json` description.
#[derive(Debug, Clone)]
pub struct FileSinkClient {
    stem: PathBuf,
}

#[derive(Debug, Serialize)]
struct SidecarRecord<'a> {
    label: &'a str,
    mime_type: &'a str,
    width: u32,
    height: u32,
    byte_len: usize,
    image: String,
}

impl FileSinkClient {
    /// `stem` is the output path without extension.
    pub fn new(stem: impl Into<PathBuf>) -> Self {
        Self { stem: stem.into() }
    }

    fn write(stem: &Path, image: &EncodedImage, label: &str) -> AppResult<(PathBuf, PathBuf)> {
        if let Some(parent) = stem.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| {
                AppError::io_with_context(
                    source,
                    format!("failed to create output directory: {}", parent.display()),
                )
            })?;
        }

        let image_path = stem.with_extension(image.extension());
        fs::write(&image_path, &image.bytes).map_err(|source| {
            AppError::io_with_context(
                source,
                format!("failed to write capture: {}", image_path.display()),
            )
        })?;

        let record = SidecarRecord {
            label,
            mime_type: image.mime_type(),
            width: image.width,
            height: image.height,
            byte_len: image.bytes.len(),
            image: image_path.display().to_string(),
        };
        let sidecar_path = stem.with_extension("json");
        let body = serde_json::to_vec_pretty(&record)
            .map_err(|source| AppError::analysis(format!("failed to describe capture: {source}")))?;
        fs::write(&sidecar_path, body).map_err(|source| {
            AppError::io_with_context(
                source,
                format!("failed to write sidecar: {}", sidecar_path.display()),
            )
        })?;

        Ok((image_path, sidecar_path))
    }
}

impl AnalysisClient for FileSinkClient {
    fn analyze<'a>(
        &'a self,
        image: EncodedImage,
        label: &'a str,
    ) -> BoxFuture<'a, AppResult<AnalysisResponse>> {
        let stem = self.stem.clone();
        let owned_label = label.to_string();
        Box::pin(async move {
            let written =
                tokio::task::spawn_blocking(move || Self::write(&stem, &image, &owned_label))
                    .await
                    .map_err(|err| AppError::analysis(err.to_string()))?;
            Ok(match written {
                Ok((image_path, sidecar_path)) => AnalysisResponse::ok(json!({
                    "image": image_path.display().to_string(),
                    "sidecar": sidecar_path.display().to_string(),
                })),
                Err(err) => AnalysisResponse::failed(err.to_string()),
            })
        })
    }
}
