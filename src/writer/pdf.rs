//! PDF output: the SVG rendering converted to a single-page document

use super::svg::{render_document, UNITS_PER_INCH};
use super::{WriteOptions, Writer};
use crate::canvas::Figure;
use crate::config::ExportFormat;
use crate::{NicefigsError, Result};
use svg2pdf::usvg;
use svg2pdf::{ConversionOptions, PageOptions};

/// Vector writer; one page sized to the figure, text kept as PDF text where
/// a matching system font exists.
///
/// svg2pdf writes no document information dictionary, so `metadata` is not
/// carried into PDF output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl Writer for PdfWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn write(&self, figure: &Figure, options: &WriteOptions) -> Result<Vec<u8>> {
        let document = render_document(figure, options.tight)?;

        let mut parse_options = usvg::Options::default();
        parse_options.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&document, &parse_options)
            .map_err(|e| NicefigsError::Export(format!("Failed to parse SVG for PDF: {}", e)))?;

        // One SVG unit is one CSS pixel, so the page comes out in figure inches
        let mut page = PageOptions::default();
        page.dpi = UNITS_PER_INCH as f32;

        if !options.metadata.is_empty() {
            tracing::debug!(
                keys = options.metadata.len(),
                "PDF output does not carry metadata"
            );
        }
        svg2pdf::to_pdf(&tree, ConversionOptions::default(), page)
            .map_err(|e| NicefigsError::Export(format!("Failed to convert figure to PDF: {:?}", e)))
    }
}
