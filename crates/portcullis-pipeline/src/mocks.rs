//! Mock collaborators for pipeline testing

use std::time::Duration;

use async_trait::async_trait;
use portcullis_recognition::{RecognitionError, Recognizer};
use portcullis_types::{PlateCandidate, RankedCandidates};

/// Configured recognition outcome.
pub enum MockRecognition {
    /// Return these candidates (empty means "no plate detected")
    Candidates(Vec<PlateCandidate>),
    /// Fail as if the service refused the connection
    Unavailable,
    /// Fail as if the request timed out
    TimedOut,
    /// Never return; exercises caller-side timeouts
    Hang,
}

/// Mock recognition service for testing.
pub struct MockRecognizer {
    mode: MockRecognition,
}

impl MockRecognizer {
    pub fn new(mode: MockRecognition) -> Self {
        Self { mode }
    }

    /// A recognizer returning one candidate with the given confidence.
    pub fn single(text: &str, confidence: f64) -> Self {
        Self::new(MockRecognition::Candidates(vec![PlateCandidate {
            text: text.into(),
            confidence,
            region: "mock".into(),
        }]))
    }

    /// A recognizer that detects nothing.
    pub fn empty() -> Self {
        Self::new(MockRecognition::Candidates(vec![]))
    }

    fn outcome(&self) -> Result<RankedCandidates, RecognitionError> {
        match &self.mode {
            MockRecognition::Candidates(candidates) => {
                Ok(RankedCandidates::new(candidates.clone()))
            }
            MockRecognition::Unavailable => Err(RecognitionError::ServiceUnavailable(
                "connection refused".into(),
            )),
            MockRecognition::TimedOut => {
                Err(RecognitionError::Timeout(Duration::from_secs(30)))
            }
            MockRecognition::Hang => unreachable!("handled in trait methods"),
        }
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(
        &self,
        _image: Vec<u8>,
        _filename: &str,
    ) -> Result<RankedCandidates, RecognitionError> {
        if matches!(self.mode, MockRecognition::Hang) {
            std::future::pending::<()>().await;
        }
        self.outcome()
    }

    async fn verify(
        &self,
        _image: Vec<u8>,
        _filename: &str,
    ) -> Result<PlateCandidate, RecognitionError> {
        if matches!(self.mode, MockRecognition::Hang) {
            std::future::pending::<()>().await;
        }
        self.outcome()?
            .primary()
            .cloned()
            .ok_or_else(|| RecognitionError::BadResponse("no candidate".into()))
    }
}
