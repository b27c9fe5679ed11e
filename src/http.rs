/// Longest provider error body kept in an error value.
const MAX_ERROR_BODY_CHARS: usize = 1024;

/// Read an error response body, truncated for logs and error values.
pub(crate) async fn truncated_body(resp: reqwest::Response) -> String {
    resp.text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}
