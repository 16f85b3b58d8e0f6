use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;

use hayro::hayro_interpret::InterpreterSettings;
use hayro::hayro_syntax::Pdf;
use hayro::vello_cpu::color::palette::css::WHITE;
use hayro::{RenderSettings, render};
use log::debug;

use crate::error::{AppError, AppResult};

use super::traits::{DocumentLoader, DocumentSource, PdfBackend, RgbaFrame};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A parsed PDF rasterized with hayro. Pages are painted over white.
pub struct HayroDocument {
    name: String,
    pdf: Pdf,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HayroDocumentLoader;

impl DocumentLoader for HayroDocumentLoader {
    fn open(&self, source: &DocumentSource) -> AppResult<Box<dyn PdfBackend>> {
        let doc = match source {
            DocumentSource::Path(path) => HayroDocument::open(path)?,
            DocumentSource::Bytes { name, bytes } => {
                HayroDocument::from_bytes(name.clone(), Arc::clone(bytes))?
            }
        };
        Ok(Box::new(doc))
    }
}

impl HayroDocument {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        if path.as_os_str().is_empty() {
            return Err(AppError::invalid_argument("pdf path must not be empty"));
        }
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return Err(AppError::document_load(name, "missing file")),
        };
        if !metadata.is_file() {
            return Err(AppError::document_load(name, "not a regular file"));
        }

        let bytes =
            fs::read(path).map_err(|source| AppError::document_load(&name, source.to_string()))?;
        Self::from_bytes(name, Arc::new(bytes))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Arc<Vec<u8>>) -> AppResult<Self> {
        let name = name.into();
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(AppError::document_load(name, "input is not a valid PDF header"));
        }
        let byte_len = bytes.len();
        let pdf = Pdf::new(bytes)
            .map_err(|_| AppError::document_load(name.clone(), "failed to parse PDF"))?;
        debug!("parsed {name} ({byte_len} bytes)");

        Ok(Self { name, pdf })
    }
}

impl PdfBackend for HayroDocument {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pdf.pages().len()
    }

    fn page_dimensions(&self, page: usize) -> AppResult<(f32, f32)> {
        let page_ref = self
            .pdf
            .pages()
            .get(page)
            .ok_or(AppError::invalid_argument("page index is out of range"))?;
        Ok(page_ref.render_dimensions())
    }

    fn render_page(&self, page: usize, scale: f32) -> AppResult<RgbaFrame> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AppError::invalid_argument(
                "scale must be a positive finite value",
            ));
        }
        let page_ref = self
            .pdf
            .pages()
            .get(page)
            .ok_or(AppError::invalid_argument("page index is out of range"))?;

        let settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            bg_color: WHITE,
            ..Default::default()
        };
        // hayro panics on some malformed content streams.
        let pixmap = catch_unwind(AssertUnwindSafe(|| {
            render(page_ref, &InterpreterSettings::default(), &settings)
        }))
        .map_err(|_| {
            AppError::pdf_render(
                page,
                AppError::unsupported("page content stream could not be decoded"),
            )
        })?;

        let frame = RgbaFrame {
            width: pixmap.width() as u32,
            height: pixmap.height() as u32,
            pixels: pixmap.data_as_u8_slice().into(),
        };
        if frame.width == 0 || frame.height == 0 || !frame.is_consistent() {
            return Err(AppError::pdf_render(
                page,
                AppError::unsupported("renderer produced an empty pixmap"),
            ));
        }
        Ok(frame)
    }
}
