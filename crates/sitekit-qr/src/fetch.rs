//! Remote asset download.

use crate::generator::QrError;

/// Download a URL into memory.
///
/// Any non-success status is treated as a failure.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, QrError> {
    let fetch_error = |e: reqwest::Error| QrError::FetchError {
        url: url.to_string(),
        message: e.to_string(),
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(fetch_error)?
        .error_for_status()
        .map_err(fetch_error)?;

    let bytes = response.bytes().await.map_err(fetch_error)?;
    tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn downloads_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/mypic.png");
                then.status(200).body("png-bytes");
            })
            .await;

        let client = reqwest::Client::new();
        let bytes = fetch_bytes(&client, &server.url("/mypic.png"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn fails_on_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.png");
                then.status(404);
            })
            .await;

        let client = reqwest::Client::new();
        let result = fetch_bytes(&client, &server.url("/missing.png")).await;

        assert!(matches!(result, Err(QrError::FetchError { .. })));
    }
}
