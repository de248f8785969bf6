//! The rendered drawing surface, released after export

use facet_svg::Svg;

use crate::errors::{ExportError, SkippedElement};

use super::svg;

/// A rendered figure waiting to be exported.
///
/// The document is dropped by [`Canvas::close`], which
/// [`FigureRenderer::export`](super::FigureRenderer::export) calls on every
/// exit path. A closed canvas can no longer be serialized.
#[derive(Debug)]
pub struct Canvas {
    document: Option<Svg>,
    size_px: f64,
    skipped: Vec<SkippedElement>,
}

impl Canvas {
    pub(crate) fn new(document: Svg, size_px: f64, skipped: Vec<SkippedElement>) -> Self {
        Canvas {
            document: Some(document),
            size_px,
            skipped,
        }
    }

    /// Elements left out because a referenced label had no position
    pub fn skipped(&self) -> &[SkippedElement] {
        &self.skipped
    }

    /// Side of the square canvas in CSS pixels
    pub fn size_px(&self) -> f64 {
        self.size_px
    }

    pub fn is_closed(&self) -> bool {
        self.document.is_none()
    }

    /// Release the document. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.document.take().is_some() {
            crate::log::debug!("canvas closed");
        }
    }

    /// The document as SVG text
    pub fn to_svg_string(&self) -> Result<String, ExportError> {
        let document = self.document.as_ref().ok_or(ExportError::CanvasClosed)?;
        svg::serialize(document)
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_idempotent() {
        let mut canvas = Canvas::new(Svg::default(), 10.0, Vec::new());
        assert!(!canvas.is_closed());
        assert!(canvas.to_svg_string().is_ok());
        canvas.close();
        canvas.close();
        assert!(canvas.is_closed());
        assert!(matches!(
            canvas.to_svg_string(),
            Err(ExportError::CanvasClosed)
        ));
    }
}
