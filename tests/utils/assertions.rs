use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};
use serde_json::Value;
use std::io::Cursor;
use zip::ZipArchive;

// ============================================================================
// Response Assertions
// ============================================================================

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Asserts the status and returns the JSON body
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Asserts a `{ok: false, error}` body with the given status and message
pub async fn expect_error(response: Response<Body>, status: StatusCode, message: &str) {
    let body = expect_json(response, status).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], message);
}

/// Asserts a ZIP attachment and returns its entry names, sorted
pub async fn expect_zip_entries(response: Response<Body>, file_name: &str) -> Vec<String> {
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].as_bytes(),
        format!("attachment; filename=\"{file_name}\"").as_bytes()
    );

    let archive = ZipArchive::new(Cursor::new(body_bytes(response).await)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// All `Set-Cookie` values on the response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}
