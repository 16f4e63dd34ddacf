//! QR code rendering and ZIP packaging for check-in codes.

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::{Cursor, Write};
use tracing::{debug, instrument, warn};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::shared::AppError;

/// Minimum edge length of the rendered QR images, in pixels
pub const QR_IMAGE_SIZE: u32 = 400;
const ZIP_COMPRESSION_LEVEL: i64 = 9;

/// One PNG to place in the archive
#[derive(Debug, Clone, PartialEq)]
pub struct QrEntry {
    /// Entry name inside the archive, without the `.png` extension
    pub label: String,
    /// Content encoded in the QR code
    pub url: String,
}

/// Renders `content` as a QR code PNG
pub fn render_qr_png(content: &str) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(content.as_bytes()).map_err(|e| {
        warn!(error = %e, "Failed to encode QR code");
        AppError::ArchiveError(format!("QR encoding failed: {e}"))
    })?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_IMAGE_SIZE, QR_IMAGE_SIZE)
        .build();

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| AppError::ArchiveError(format!("PNG encoding failed: {e}")))?;

    Ok(png.into_inner())
}

/// Builds a deflate-compressed ZIP holding `{label}.png` for every entry
#[instrument(skip(entries), fields(entry_count = entries.len()))]
pub fn build_qr_archive(entries: &[QrEntry]) -> Result<Vec<u8>, AppError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_COMPRESSION_LEVEL));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in entries {
        let png = render_qr_png(&entry.url)?;
        writer
            .start_file(format!("{}.png", entry.label), options)
            .map_err(|e| AppError::ArchiveError(e.to_string()))?;
        writer
            .write_all(&png)
            .map_err(|e| AppError::ArchiveError(e.to_string()))?;
    }

    let archive = writer
        .finish()
        .map_err(|e| AppError::ArchiveError(e.to_string()))?
        .into_inner();

    debug!(archive_bytes = archive.len(), "QR archive built");
    Ok(archive)
}
