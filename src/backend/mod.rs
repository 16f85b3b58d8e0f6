use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult};

mod hayro;
mod traits;

#[cfg(test)]
pub(crate) mod test_pdf;

pub use hayro::{HayroDocument, HayroDocumentLoader};
pub use traits::{DocumentLoader, DocumentSource, PdfBackend, RgbaFrame};

pub fn default_loader() -> Arc<dyn DocumentLoader> {
    Arc::new(HayroDocumentLoader)
}

/// Opens `source` on the blocking pool so parsing a large document does not
/// stall the caller's event loop.
pub fn open_in_background(
    loader: Arc<dyn DocumentLoader>,
    source: DocumentSource,
) -> JoinHandle<AppResult<Box<dyn PdfBackend>>> {
    tokio::task::spawn_blocking(move || loader.open(&source))
}

/// Flattens a join failure into a load error for the same source.
pub async fn join_open(
    handle: JoinHandle<AppResult<Box<dyn PdfBackend>>>,
    source_name: &str,
) -> AppResult<Box<dyn PdfBackend>> {
    match handle.await {
        Ok(result) => result,
        Err(err) => Err(AppError::document_load(source_name, err.to_string())),
    }
}
