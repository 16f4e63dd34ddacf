use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use super::{
    archive::{build_qr_archive, QrEntry},
    types::QrExportRequest,
};
use crate::shared::{non_blank, AppError, JsonBody};

const EXPORT_FILE_NAME: &str = "qrcodes.zip";

/// Wraps ZIP bytes in an attachment response named `file_name`
pub fn zip_attachment(file_name: &str, archive: Vec<u8>) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_bytes(
        format!("attachment; filename=\"{file_name}\"").as_bytes(),
    )
    .map_err(|_| AppError::Internal)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}

/// HTTP handler exporting caller-supplied URLs as a ZIP of QR codes
///
/// POST /api/qr
/// Entries are named `{label or id}.png`
#[instrument(name = "export_qr_codes", skip_all)]
pub async fn export_qr_codes(
    JsonBody(request): JsonBody<QrExportRequest>,
) -> Result<Response, AppError> {
    let entries: Vec<QrEntry> = request
        .items
        .into_iter()
        .map(|item| QrEntry {
            label: non_blank(item.label).unwrap_or(item.id),
            url: item.url,
        })
        .collect();

    let archive = build_qr_archive(&entries)?;
    info!(entry_count = entries.len(), "QR export built");

    zip_attachment(EXPORT_FILE_NAME, archive)
}
