//! PNG output through the plotters bitmap backend

use super::paint::{Page, Painter};
use super::{WriteOptions, Writer};
use crate::canvas::Figure;
use crate::config::ExportFormat;
use crate::{NicefigsError, Result};
use plotters::prelude::*;

const METERS_PER_INCH: f64 = 0.0254;

/// Raster writer; the image is `dpi` pixels per figure inch
#[derive(Debug, Clone, Copy, Default)]
pub struct PngWriter;

impl Writer for PngWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Png
    }

    fn write(&self, figure: &Figure, options: &WriteOptions) -> Result<Vec<u8>> {
        let page = Page::new(figure, f64::from(options.dpi), options.tight);
        let (width, height) = (page.width_px, page.height_px);
        tracing::debug!(width, height, dpi = options.dpi, "Rasterizing figure");

        let mut rgb = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
            Painter::new(&root, page, figure.palette.as_deref()).paint(figure)?;
            root.present().map_err(|e| {
                NicefigsError::Export(format!("Failed to rasterize figure: {:?}", e))
            })?;
        }
        encode(&rgb, width, height, options)
    }
}

fn png_error(e: png::EncodingError) -> NicefigsError {
    NicefigsError::Export(format!("PNG encoding failed: {}", e))
}

/// RGB8 pixels to a PNG stream with text metadata and physical resolution
fn encode(rgb: &[u8], width: u32, height: u32, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let per_meter = (f64::from(options.dpi) / METERS_PER_INCH).round() as u32;
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: per_meter,
            yppu: per_meter,
            unit: png::Unit::Meter,
        }));

        for (key, value) in &options.metadata {
            // tEXt is Latin-1 only
            if value.is_ascii() {
                encoder.add_text_chunk(key.clone(), value.clone()).map_err(png_error)?;
            } else {
                encoder.add_itxt_chunk(key.clone(), value.clone()).map_err(png_error)?;
            }
        }

        let mut writer = encoder.write_header().map_err(png_error)?;
        writer.write_image_data(rgb).map_err(png_error)?;
        writer.finish().map_err(png_error)?;
    }
    Ok(out)
}
