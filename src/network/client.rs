//! HTTP client for the face swap service
//!
//! Each call is a single request/response: no retry, no backoff, no caching.
//! Interpreting `success: false` is left to the caller.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    HealthResponse, ProfessionsResponse, SelectedFile, SwapRequest, SwapResponse, UploadResponse,
};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: Config) -> Self {
        ApiClient {
            http: create_client(&config),
            config,
        }
    }

    /// `POST` the image as multipart field `file`
    pub async fn upload_image(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        let bytes = tokio::fs::read(&file.path).await?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::Transport(format!("Request failed: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await?;
        parse_body(resp, true).await
    }

    /// Fetch the catalog; a body without `professions` is an empty catalog
    pub async fn get_professions(&self) -> Result<ProfessionsResponse, ApiError> {
        let resp = self.http.get(self.config.professions_url()).send().await?;
        parse_body(resp, false).await
    }

    pub async fn swap_face(&self, request: &SwapRequest) -> Result<SwapResponse, ApiError> {
        let resp = self
            .http
            .post(self.config.swap_url())
            .json(request)
            .send()
            .await?;
        parse_body(resp, true).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let resp = self.http.get(self.config.health_url()).send().await?;
        parse_body(resp, false).await
    }

    /// Stream the image at `url` into `dest`, returning the byte count
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, ApiError> {
        let resp = self.http.get(self.config.resolve_url(url)).send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status {
                status: resp.status().as_u16(),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match write_stream(resp, dest).await {
            Ok(written) => Ok(written),
            Err(e) => {
                // Delete the incomplete file
                let _ = tokio::fs::remove_file(dest).await;
                Err(e)
            }
        }
    }
}

async fn write_stream(resp: reqwest::Response, dest: &Path) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

/// Decode a JSON body.
///
/// With `contract_on_error`, a non-2xx body that still matches the expected
/// shape is returned so its `success: false` and message reach the caller.
async fn parse_body<T: DeserializeOwned>(
    resp: reqwest::Response,
    contract_on_error: bool,
) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() && !contract_on_error {
        return Err(ApiError::Status {
            status: status.as_u16(),
        });
    }

    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ApiError::Status {
            status: status.as_u16(),
        }),
        Err(e) => Err(ApiError::InvalidResponse(e.to_string())),
    }
}

/// Create an HTTP client with the configured timeout
pub fn create_client(config: &Config) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(format!("ai-swap-tui/{}", crate::constants::APP_VERSION))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Where a download for `dest` actually landed
pub fn resolved_path(dest: &Path) -> PathBuf {
    std::fs::canonicalize(dest).unwrap_or_else(|_| dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Angle;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let headers = text[..header_end].to_ascii_lowercase();
            let body_len = buf.len() - (header_end + 4);

            if headers.contains("transfer-encoding: chunked") {
                if text.ends_with("0\r\n\r\n") {
                    break;
                }
                continue;
            }

            let expected = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if body_len >= expected {
                break;
            }
        }

        String::from_utf8_lossy(&buf).to_string()
    }

    fn client_for(base: &str) -> ApiClient {
        let config = Config::default().with_overrides(Some(base.to_string()), None);
        ApiClient::new(config)
    }

    fn jpeg(dir: &tempfile::TempDir) -> SelectedFile {
        let path = dir.path().join("portrait.jpg");
        std::fs::write(&path, b"\xFF\xD8\xFF\xE0fake-jpeg").unwrap();
        SelectedFile {
            path,
            file_name: "portrait.jpg".into(),
            mime_type: "image/jpeg".into(),
            size_bytes: 13,
        }
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"success":true,"message":"ok","image_id":"abc123","face_detected":true,"landmarks":[]}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let resp = client_for(&base).upload_image(&jpeg(&dir)).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.image_id.as_deref(), Some("abc123"));
        assert_eq!(resp.face_detected, Some(true));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/upload "));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("filename=\"portrait.jpg\""));
        assert!(request.to_ascii_lowercase().contains("content-type: image/jpeg"));
    }

    #[tokio::test]
    async fn test_upload_without_success_field_fails() {
        let (base, _server) = serve_once("200 OK", r#"{"image_id":"abc123"}"#).await;
        let dir = tempfile::tempdir().unwrap();

        let err = client_for(&base).upload_image(&jpeg(&dir)).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_professions_is_empty() {
        let (base, server) = serve_once("200 OK", "{}").await;
        let resp = client_for(&base).get_professions().await.unwrap();
        assert!(resp.professions.is_empty());
        assert!(server.await.unwrap().starts_with("GET /api/professions "));
    }

    #[tokio::test]
    async fn test_professions_server_error() {
        let (base, _server) = serve_once("500 Internal Server Error", r#"{"professions":[]}"#).await;
        let err = client_for(&base).get_professions().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn test_swap_posts_json_body() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"success":true,"message":"done","result_url":"https://cdn.example.com/out.jpg","angle":"side"}"#,
        )
        .await;
        let request = SwapRequest {
            image_id: "abc123".into(),
            profession: "doctor".into(),
            angle: Angle::Side,
        };

        let resp = client_for(&base).swap_face(&request).await.unwrap();
        assert_eq!(resp.result_url.as_deref(), Some("https://cdn.example.com/out.jpg"));
        assert_eq!(resp.angle.as_deref(), Some("side"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/swap "));
        let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"image_id": "abc123", "profession": "doctor", "angle": "side"})
        );
    }

    #[tokio::test]
    async fn test_swap_domain_failure_is_returned() {
        let (base, _server) = serve_once(
            "400 Bad Request",
            r#"{"success":false,"message":"No face detected in uploaded image"}"#,
        )
        .await;
        let request = SwapRequest {
            image_id: "x".into(),
            profession: "doctor".into(),
            angle: Angle::Front,
        };

        let resp = client_for(&base).swap_face(&request).await.unwrap();
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("No face detected in uploaded image"));
    }

    #[tokio::test]
    async fn test_swap_error_without_contract_body() {
        let (base, _server) = serve_once("422 Unprocessable Entity", r#"{"detail":"bad"}"#).await;
        let request = SwapRequest {
            image_id: "x".into(),
            profession: "doctor".into(),
            angle: Angle::Front,
        };
        let err = client_for(&base).swap_face(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 422 }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr)).health().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let (base, _server) = serve_once("200 OK", "IMAGEDATA").await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("ai-swap-Doctor.jpg");

        let written = client_for(&base)
            .download(&format!("{}/results/out.jpg", base), &dest)
            .await
            .unwrap();
        assert_eq!(written, 9);
        assert_eq!(std::fs::read(&dest).unwrap(), b"IMAGEDATA");
    }

    #[tokio::test]
    async fn test_download_relative_url_uses_service_base() {
        let (base, server) = serve_once("200 OK", "IMAGEDATA").await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ai-swap-Doctor.jpg");

        let written = client_for(&base).download("/results/abc.jpg", &dest).await.unwrap();
        assert_eq!(written, 9);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /results/abc.jpg HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let (base, _server) = serve_once("404 Not Found", "{}").await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("x.jpg");

        let err = client_for(&base).download(&format!("{}/missing.jpg", base), &dest).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404 }));
        assert!(!dest.exists());
    }
}
