use std::time::Duration;

use super::error::AnalysisError;

/// POST the prepared body to the vision endpoint and return its reply text.
///
/// The reply is free-form and taken verbatim; only an empty or non-UTF-8
/// body is treated as an unusable response.
pub async fn request_report(
    http: &reqwest::Client,
    url: &str,
    body: Vec<u8>,
    timeout: Duration,
) -> Result<String, AnalysisError> {
    log::info!("📤 Sending {:.1}KB to {}", body.len() as f64 / 1024.0, url);

    let response = http
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| AnalysisError::from_transport(e, timeout))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AnalysisError::from_transport(e, timeout))?;

    if !status.is_success() {
        return Err(AnalysisError::HttpStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).chars().take(200).collect(),
        });
    }

    let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
        AnalysisError::UnexpectedResponseShape("vision reply is not valid UTF-8".to_string())
    })?;

    if text.trim().is_empty() {
        return Err(AnalysisError::UnexpectedResponseShape(
            "vision reply is empty".to_string(),
        ));
    }

    Ok(text)
}
