use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::encode::EncodedImage;

/// Reply of the remote analysis service, relayed to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// The external service that explains a captured region.
///
/// One request, one reply; implementations must not retry on their own.
pub trait AnalysisClient: Send + Sync {
    fn analyze<'a>(
        &'a self,
        image: EncodedImage,
        label: &'a str,
    ) -> BoxFuture<'a, AppResult<AnalysisResponse>>;
}

/// A user-chosen category such as "math" or "physics".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    pub fn new(label: impl AsRef<str>) -> AppResult<Self> {
        let label = label.as_ref().trim();
        if label.is_empty() {
            return Err(AppError::invalid_argument("category label must not be empty"));
        }
        Ok(Self(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
