//! SVG output through the plotters SVG backend

use super::paint::{Page, Painter};
use super::{WriteOptions, Writer};
use crate::canvas::Figure;
use crate::config::ExportFormat;
use crate::{NicefigsError, Result};
use plotters::prelude::*;
use std::collections::BTreeMap;

/// SVG user units per inch (CSS pixels)
pub(super) const UNITS_PER_INCH: f64 = 96.0;

/// Vector writer; `dpi` does not apply
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgWriter;

impl Writer for SvgWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Svg
    }

    fn write(&self, figure: &Figure, options: &WriteOptions) -> Result<Vec<u8>> {
        let document = render_document(figure, options.tight)?;
        Ok(with_metadata(document, &options.metadata).into_bytes())
    }
}

/// Paint `figure` into an SVG document without metadata
pub(super) fn render_document(figure: &Figure, tight: bool) -> Result<String> {
    let page = Page::new(figure, UNITS_PER_INCH, tight);
    let mut document = String::new();
    {
        let root = SVGBackend::with_string(&mut document, (page.width_px, page.height_px))
            .into_drawing_area();
        Painter::new(&root, page, figure.palette.as_deref()).paint(figure)?;
        root.present()
            .map_err(|e| NicefigsError::Export(format!("Failed to render SVG: {:?}", e)))?;
    }
    Ok(document)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Insert a `<metadata>` element as the first child of the root element
fn with_metadata(mut document: String, metadata: &BTreeMap<String, String>) -> String {
    if metadata.is_empty() {
        return document;
    }
    let Some(insert_at) = document
        .find("<svg")
        .and_then(|start| document[start..].find('>').map(|end| start + end + 1))
    else {
        tracing::warn!("No root element in SVG output, metadata dropped");
        return document;
    };

    let body: String = metadata
        .iter()
        .map(|(key, value)| format!("\n{}: {}", escape(key), escape(value)))
        .collect();
    document.insert_str(insert_at, &format!("\n<metadata>{}\n</metadata>", body));
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_after_root() {
        let mut metadata = BTreeMap::new();
        metadata.insert("Title".to_string(), "a < b".to_string());
        let doc = with_metadata(
            "<?xml version=\"1.0\"?>\n<svg width=\"10\" height=\"10\">\n</svg>".to_string(),
            &metadata,
        );
        let root_end = doc.find("\">").unwrap();
        let meta = doc.find("<metadata>").unwrap();
        assert!(meta > root_end);
        assert!(doc.contains("Title: a &lt; b"));
    }

    #[test]
    fn test_document_size() {
        let figure = Figure::new(2.0, 1.0, 300);
        let options = WriteOptions {
            dpi: 300,
            tight: false,
            metadata: BTreeMap::new(),
        };
        let svg = String::from_utf8(SvgWriter.write(&figure, &options).unwrap()).unwrap();
        assert!(svg.contains("width=\"192\""));
        assert!(svg.contains("height=\"96\""));
    }
}
