//! HTTP client for the recognition service

use std::time::Duration;

use async_trait::async_trait;
use portcullis_types::{PlateCandidate, RankedCandidates};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RecognitionError;

/// Timeout for full-frame plate recognition.
pub const FULL_RECOGNITION_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for lightweight single-plate re-verification.
pub const REVERIFY_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for the liveness probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Seam between the pipeline and the recognition service.
///
/// The pipeline only depends on this trait; production wiring injects
/// [`RecognitionClient`], tests inject mocks.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Full-frame recognition over an uploaded image.
    ///
    /// An empty candidate list is a valid outcome, not an error.
    async fn recognize(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<RankedCandidates, RecognitionError>;

    /// Lightweight single-candidate re-verification of a cropped capture.
    async fn verify(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<PlateCandidate, RecognitionError>;
}

/// HTTP client for the external recognition service.
///
/// Holds one shared connection pool for the life of the process; inject a
/// single instance into the pipeline rather than constructing per request.
pub struct RecognitionClient {
    client: Client,
    base_url: String,
}

/// `POST /api/process-image` body: parallel arrays indexed consistently.
#[derive(Debug, Deserialize)]
struct ProcessImageResponse {
    detected_plates: Vec<String>,
    conf: Vec<f64>,
    region: Vec<String>,
}

/// `POST /api/verify-plate` body: single-candidate form.
#[derive(Debug, Deserialize)]
struct VerifyPlateResponse {
    plate_number: String,
    confidence: f64,
    region: String,
}

impl RecognitionClient {
    /// Create a client for the service at `endpoint`.
    ///
    /// Timeouts are set per request because full recognition and
    /// re-verification run under different deadlines.
    pub fn new(endpoint: &str) -> Result<Self, RecognitionError> {
        let client = Client::builder()
            .build()
            .map_err(|e| RecognitionError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Liveness probe: any 2xx is healthy.
    pub async fn health(&self) -> Result<(), RecognitionError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| RecognitionError::from_transport(e, HEALTH_TIMEOUT))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RecognitionError::ServiceUnavailable(format!(
                "health probe returned {}",
                response.status()
            )))
        }
    }

    fn image_form(image: Vec<u8>, filename: &str) -> Result<Form, RecognitionError> {
        let part = Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| RecognitionError::BadResponse(e.to_string()))?;
        Ok(Form::new().part("image", part))
    }

    async fn post_image<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        image: Vec<u8>,
        filename: &str,
        timeout: Duration,
    ) -> Result<T, RecognitionError> {
        let url = format!("{}{}", self.base_url, path);
        let form = Self::image_form(image, filename)?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| RecognitionError::from_transport(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognitionError::ServiceUnavailable(format!(
                "{} returned {}",
                path, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RecognitionError::BadResponse(e.to_string()))
    }
}

#[async_trait]
impl Recognizer for RecognitionClient {
    async fn recognize(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<RankedCandidates, RecognitionError> {
        let body: ProcessImageResponse = self
            .post_image(
                "/api/process-image",
                image,
                filename,
                FULL_RECOGNITION_TIMEOUT,
            )
            .await?;

        let ranked = map_candidates(body)?;
        debug!(candidates = ranked.len(), "recognition completed");
        Ok(ranked)
    }

    async fn verify(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<PlateCandidate, RecognitionError> {
        let body: VerifyPlateResponse = self
            .post_image("/api/verify-plate", image, filename, REVERIFY_TIMEOUT)
            .await?;

        Ok(PlateCandidate {
            text: body.plate_number,
            confidence: body.confidence,
            region: body.region,
        })
    }
}

/// Zip the service's parallel arrays into ranked candidates.
///
/// Mismatched array lengths mean the response cannot be indexed consistently
/// and are rejected as [`RecognitionError::BadResponse`].
fn map_candidates(body: ProcessImageResponse) -> Result<RankedCandidates, RecognitionError> {
    if body.detected_plates.len() != body.conf.len()
        || body.detected_plates.len() != body.region.len()
    {
        warn!(
            plates = body.detected_plates.len(),
            conf = body.conf.len(),
            region = body.region.len(),
            "recognition response arrays disagree"
        );
        return Err(RecognitionError::BadResponse(
            "parallel arrays have mismatched lengths".into(),
        ));
    }

    let candidates = body
        .detected_plates
        .into_iter()
        .zip(body.conf)
        .zip(body.region)
        .map(|((text, confidence), region)| PlateCandidate {
            text,
            confidence,
            region,
        })
        .collect();

    Ok(RankedCandidates::new(candidates))
}
