//! HTTP transport to the classification server
//!
//! `HttpClassifier` posts the multipart form to `/predict` with a blocking
//! `reqwest` client. Without the `http` feature every request fails with a
//! transport error.

use crate::classify::request::PredictRequest;
use crate::config::Settings;
use crate::error::{GelangError, Result};

/// Status and body of a received response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a built request to the classification endpoint
///
/// `Err` means no response was received at all.
pub trait ClassificationTransport {
    fn send(&self, request: &PredictRequest) -> Result<RawResponse>;
}

/// Blocking HTTP client for `POST /predict`
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    endpoint: String,
    timeout_ms: Option<u64>,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout_ms: Option<u64>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.endpoint.clone(), settings.timeout_ms)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[cfg(feature = "http")]
    fn post(&self, request: &PredictRequest) -> Result<RawResponse> {
        use reqwest::blocking::multipart::{Form, Part};
        use std::time::Duration;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout_ms.map(Duration::from_millis))
            .build()
            .map_err(|e| GelangError::Transport {
                message: e.to_string(),
            })?;

        let file_part = Part::bytes(request.file_bytes().to_vec())
            .file_name(request.file_name().to_string())
            .mime_str(request.mime_type())
            .map_err(|e| GelangError::Transport {
                message: format!("Invalid MIME type '{}': {}", request.mime_type(), e),
            })?;

        let mut form = Form::new().part("file", file_part);
        for (name, value) in request.text_fields() {
            form = form.text(name, value);
        }

        log::info!(
            "[CLASSIFY] POST {} ({}, {}s..{}s)",
            self.endpoint,
            request.file_name(),
            request.start_text(),
            request.end_text()
        );

        let response = client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GelangError::Transport {
                        message: format!("Timed out after {}ms", self.timeout_ms.unwrap_or(0)),
                    }
                } else if e.is_connect() {
                    GelangError::Transport {
                        message: format!("Cannot connect to {}: {}", self.endpoint, e),
                    }
                } else {
                    GelangError::Transport {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| GelangError::Transport {
            message: format!("Failed to read response body: {}", e),
        })?;

        log::debug!("[CLASSIFY] HTTP {} ({} bytes)", status, body.len());
        Ok(RawResponse { status, body })
    }

    #[cfg(not(feature = "http"))]
    fn post(&self, _request: &PredictRequest) -> Result<RawResponse> {
        Err(GelangError::Transport {
            message: "HTTP support not compiled. Build with --features http".to_string(),
        })
    }
}

impl ClassificationTransport for HttpClassifier {
    fn send(&self, request: &PredictRequest) -> Result<RawResponse> {
        self.post(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_response_status() {
        let ok = RawResponse {
            status: 204,
            body: String::new(),
        };
        let failed = RawResponse {
            status: 500,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            endpoint: "http://classifier.local/predict".to_string(),
            timeout_ms: Some(1500),
            ..Settings::default()
        };
        let client = HttpClassifier::from_settings(&settings);
        assert_eq!(client.endpoint(), "http://classifier.local/predict");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_unreachable_server_is_transport_error() {
        use crate::engine::{AudioSource, Region, RegionBounds};
        use crate::classify::RequestBuilder;

        let source = AudioSource::intake("clip.wav", "audio/wav", vec![0u8; 8]).unwrap();
        let region = Region::clamped(RegionBounds::new(0.0, 1.0), 2.0);
        let request = RequestBuilder::new()
            .begin(Some(&source), Some(region))
            .unwrap()
            .unwrap();

        // Reserve a free port, then release it so nothing is listening there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HttpClassifier::new(format!("http://127.0.0.1:{}/predict", port), Some(2000));
        let err = client.send(&request).unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }
}
