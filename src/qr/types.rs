use serde::Deserialize;

/// Request payload for exporting arbitrary QR codes
#[derive(Debug, Default, Deserialize)]
pub struct QrExportRequest {
    #[serde(default)]
    pub items: Vec<QrExportItem>,
}

#[derive(Debug, Deserialize)]
pub struct QrExportItem {
    pub id: String,
    pub label: Option<String>,
    pub url: String,
}
