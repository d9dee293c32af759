//! Client for the remote utterance-analysis service
//!
//! One submission per practice turn: the captured audio plus the scenario
//! label go up as a multipart form, the feedback comes back as JSON.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::session::AnalysisBackend;
use crate::{Error, Result};

/// Fallback message when the service reports a failure without detail
pub const GENERIC_FAILURE: &str = "The analysis service could not process the recording.";

/// Feedback returned by the analysis service for one utterance
///
/// Everything beyond the transcript is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResult {
    /// Speech-to-text transcription of the utterance (may be empty)
    #[serde(default)]
    pub transcript: String,

    /// Pronunciation score, 0-100 (0 when the service omits it)
    #[serde(default)]
    pub pronunciation_score: u8,

    /// Human-readable pronunciation commentary
    pub pronunciation_feedback: Option<String>,

    /// Corrected version of the transcript; absent means no correction offered
    pub grammar_correction: Option<String>,

    /// Commentary on grammar and word choice
    pub grammar_feedback: Option<String>,

    /// A more natural rephrasing of the utterance
    pub better_alternative: Option<String>,

    /// Estimated CEFR level (A1-C2)
    pub cefr_level: Option<String>,

    /// Justification for the CEFR estimate
    pub cefr_feedback: Option<String>,

    /// Spoken-dialogue response to the utterance
    pub response: Option<String>,
}

impl AnalysisResult {
    /// Phrase to play back: the dialogue response, else the alternative
    #[must_use]
    pub fn playback_phrase(&self) -> Option<&str> {
        self.response.as_deref().or(self.better_alternative.as_deref())
    }
}

/// Failure body shape used by the analysis service
#[derive(Deserialize)]
struct FailureBody {
    detail: Option<String>,
}

/// Submits utterances to the analysis service over HTTP
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Create a client for the service at `base_url`.
    ///
    /// The timeout bounds the whole request; a submission is never retried
    /// or cancelled once sent.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn analyze(&self, audio: Vec<u8>, scenario: &str) -> Result<AnalysisResult> {
        tracing::debug!(audio_bytes = audio.len(), scenario, "submitting utterance");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("utterance.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Submission(e.to_string()))?,
            )
            .text("scenario", scenario.to_string());

        let response = self
            .client
            .post(format!("{}/api/analyze_audio", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "analysis request failed");
                Error::Submission(GENERIC_FAILURE.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received analysis response");

        if !status.is_success() {
            let detail = response
                .json::<FailureBody>()
                .await
                .ok()
                .and_then(|body| body.detail);
            tracing::error!(status = %status, detail = ?detail, "analysis service error");
            return Err(Error::Submission(
                detail.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ));
        }

        let result: AnalysisResult = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "malformed analysis response");
            Error::Submission(GENERIC_FAILURE.to_string())
        })?;

        tracing::info!(
            transcript = %result.transcript,
            score = result.pronunciation_score,
            "analysis complete"
        );
        Ok(result)
    }
}
