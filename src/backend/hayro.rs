use std::path::Path;
use std::sync::Arc;

use hayro::hayro_interpret::InterpreterSettings;
use hayro::hayro_syntax::Pdf;
use hayro::vello_cpu::color::palette::css::WHITE;
use hayro::{RenderSettings, render};

use crate::annotation::PageNumber;
use crate::error::{AppError, AppResult};

use super::traits::{PageDimensions, PageRenderer};

/// Renders pages with hayro. The parsed document is rebuilt from the shared
/// bytes on each render so the renderer can be used from blocking workers.
pub struct HayroPageRenderer {
    bytes: Arc<Vec<u8>>,
    page_count: usize,
}

impl HayroPageRenderer {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = Self::load_shared_bytes(path)?;
        let pdf = parse_pdf(bytes.clone())?;

        Ok(Self {
            page_count: pdf.pages().len(),
            bytes,
        })
    }

    pub fn load_shared_bytes(path: impl AsRef<Path>) -> AppResult<Arc<Vec<u8>>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(AppError::invalid_argument("pdf path must not be empty"));
        }
        if !path.exists() {
            return Err(AppError::io_with_context(
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing file"),
                format!("pdf file not found: {}", path.display()),
            ));
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(
                "pdf path must be a regular file",
            ));
        }

        let bytes = Arc::new(std::fs::read(path)?);
        if !bytes.as_slice().starts_with(b"%PDF-") {
            return Err(AppError::invalid_argument(
                "input is not a valid PDF header",
            ));
        }

        Ok(bytes)
    }
}

impl PageRenderer for HayroPageRenderer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&self, page: PageNumber, scale: f32) -> AppResult<PageDimensions> {
        if page.get() == 0 || page.index() >= self.page_count {
            return Err(AppError::invalid_argument("page number is out of range"));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AppError::invalid_argument(
                "scale must be a positive finite value",
            ));
        }

        let pdf = parse_pdf(self.bytes.clone())?;
        let pages = pdf.pages();
        let page_ref = pages
            .get(page.index())
            .ok_or(AppError::invalid_argument("page number is out of range"))?;

        let render_settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            bg_color: WHITE,
            ..Default::default()
        };
        let interpreter_settings = InterpreterSettings::default();
        let pixmap = render(page_ref, &interpreter_settings, &render_settings);

        Ok(PageDimensions::new(
            pixmap.width() as u32,
            pixmap.height() as u32,
        ))
    }
}

fn parse_pdf(bytes: Arc<Vec<u8>>) -> AppResult<Pdf> {
    Pdf::new(bytes).map_err(|_| AppError::invalid_argument("failed to parse PDF with hayro"))
}
