//! Figure export
//!
//! A [`Writer`] encodes a finished [`Figure`] into one file format. Writers are
//! pure: they return bytes, and [`save`] owns the filesystem side (path
//! resolution, suffix replacement, directory creation).
//!
//! # Example
//!
//! ```rust,ignore
//! use nicefigs::writer::{Writer, SvgWriter, WriteOptions};
//!
//! let figure = nicefigs::figure::render_figure(&spec, None)?;
//! let svg = SvgWriter.write(&figure, &WriteOptions::from_export(&spec.export))?;
//! ```

mod bitmap;
mod geometry;
pub mod paint;
mod pdf;
mod svg;

pub use bitmap::PngWriter;
pub use pdf::PdfWriter;
pub use svg::SvgWriter;

use crate::canvas::Figure;
use crate::config::expand::resolve_path;
use crate::config::{ExportFormat, ExportSpec};
use crate::{NicefigsError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Metadata key always recorded in exported files
pub const SOFTWARE_KEY: &str = "Software";

/// Encoding parameters shared by all writers
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    /// Raster resolution; also recorded in PNG physical dimensions
    pub dpi: u32,
    /// Crop to the painted content
    pub tight: bool,
    pub metadata: BTreeMap<String, String>,
}

impl WriteOptions {
    pub fn from_export(export: &ExportSpec) -> Self {
        let mut metadata = export.metadata.clone();
        metadata
            .entry(SOFTWARE_KEY.to_string())
            .or_insert_with(|| format!("nicefigs {}", crate::VERSION));
        Self {
            dpi: export.dpi,
            tight: export.tight_layout,
            metadata,
        }
    }
}

/// Trait for figure output writers
pub trait Writer {
    /// Format produced by this writer
    fn format(&self) -> ExportFormat;

    /// Encode `figure` into the file contents
    fn write(&self, figure: &Figure, options: &WriteOptions) -> Result<Vec<u8>>;
}

/// Writer for `format`
pub fn writer_for(format: ExportFormat) -> Box<dyn Writer> {
    match format {
        ExportFormat::Png => Box::new(PngWriter),
        ExportFormat::Svg => Box::new(SvgWriter),
        ExportFormat::Pdf => Box::new(PdfWriter),
    }
}

/// `path` with its suffix replaced by the format extension
pub fn output_path(path: &Path, format: ExportFormat) -> PathBuf {
    path.with_extension(format.extension())
}

/// Write every format in `export`, returning the files written in format order.
///
/// Repeated formats are written once.
pub fn save(figure: &Figure, export: &ExportSpec, base_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let base = resolve_path(&export.path, base_dir);

    let mut targets = Vec::with_capacity(export.formats.len());
    for format in &export.formats {
        let writer = writer_for(*format);
        let path = output_path(&base, *format);
        if !targets.iter().any(|(_, existing): &(Box<dyn Writer>, PathBuf)| existing == &path) {
            targets.push((writer, path));
        }
    }

    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            NicefigsError::Export(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }

    let options = WriteOptions::from_export(export);
    let mut written = Vec::with_capacity(targets.len());
    for (writer, path) in targets {
        let bytes = writer.write(figure, &options)?;
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), format = %writer.format(), "Wrote figure");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Artist, ArtistKind, Bbox, Panel};

    fn figure() -> Figure {
        let mut figure = Figure::new(3.0, 2.0, 50);
        let bbox = Bbox {
            left: 0.15,
            bottom: 0.15,
            width: 0.8,
            height: 0.8,
        };
        let mut panel = Panel::new(0, 0, 0, bbox, (3.0, 2.0));
        panel.add_artist(Artist::new(ArtistKind::Line {
            xs: vec![0.0, 1.0, 2.0],
            ys: vec![1.0, 3.0, 2.0],
        }));
        figure.panels.push(panel);
        figure
    }

    fn export(path: &str, formats: Vec<ExportFormat>) -> ExportSpec {
        ExportSpec {
            path: path.to_string(),
            dpi: 50,
            formats,
            ..Default::default()
        }
    }

    #[test]
    fn test_suffix_replaced_per_format() {
        let base = Path::new("out/fig.png");
        assert_eq!(output_path(base, ExportFormat::Svg), PathBuf::from("out/fig.svg"));
        assert_eq!(output_path(Path::new("fig"), ExportFormat::Png), PathBuf::from("fig.png"));
    }

    #[test]
    fn test_software_metadata_default() {
        let mut spec = export("fig.png", vec![ExportFormat::Png]);
        let options = WriteOptions::from_export(&spec);
        assert!(options.metadata[SOFTWARE_KEY].starts_with("nicefigs"));

        spec.metadata.insert(SOFTWARE_KEY.to_string(), "lab".to_string());
        assert_eq!(WriteOptions::from_export(&spec).metadata[SOFTWARE_KEY], "lab");
    }

    #[test]
    fn test_save_png_and_svg() {
        let dir = tempfile::tempdir().unwrap();
        let spec = export("nested/fig.png", vec![ExportFormat::Png, ExportFormat::Svg]);
        let written = save(&figure(), &spec, Some(dir.path())).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0], dir.path().join("nested/fig.png"));
        assert_eq!(written[1], dir.path().join("nested/fig.svg"));
        let png = std::fs::read(&written[0]).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let svg = std::fs::read_to_string(&written[1]).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_save_pdf_next_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let spec = export(
            "fig.png",
            vec![ExportFormat::Png, ExportFormat::Pdf, ExportFormat::Png],
        );
        let written = save(&figure(), &spec, Some(dir.path())).unwrap();

        assert_eq!(
            written,
            vec![dir.path().join("fig.png"), dir.path().join("fig.pdf")]
        );
        let pdf = std::fs::read(&written[1]).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
