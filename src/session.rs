//! Practice session state machine
//!
//! Drives one capture → submit → feedback cycle per user turn. The
//! controller owns exactly one [`Session`] at a time and is the single
//! point through which it changes state; collaborators (microphone,
//! analysis service, speech output, renderer) sit behind traits so the
//! machine runs identically against hardware or test doubles.

use async_trait::async_trait;
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::diff::{self, SentenceDiff};
use crate::{Error, Result};

/// Scenario label used when the caller picks none
pub const DEFAULT_SCENARIO: &str = "Free Talk";

/// State of a practice session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a capture to start
    Idle,
    /// Microphone capture is active
    Capturing,
    /// Utterance sent to the analysis service, awaiting the verdict
    Submitting,
    /// Terminal: feedback received and rendered
    Succeeded,
    /// Terminal: the turn failed and the error was rendered
    Failed,
}

impl SessionState {
    /// True for `Succeeded` and `Failed`
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// One capture-to-feedback cycle
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    scenario: String,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

impl Session {
    fn new(scenario: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            scenario,
            result: None,
            error: None,
        }
    }

    /// Session identifier (for log correlation)
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Scenario label passed through to the analysis request
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Analysis feedback; present only in `Succeeded`
    #[must_use]
    pub const fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// User-facing error message; present only in `Failed`
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Microphone capture collaborator
///
/// Implementations own the underlying stream handle and must release it in
/// `finish` and `cancel` on every path, success or error, so no exit from
/// a capture can leak a live stream.
pub trait CaptureSource {
    /// Whether the platform can capture audio at all (probed once at startup)
    fn is_supported(&self) -> bool;

    /// Begin capturing
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapturePermissionDenied`] when the platform blocks
    /// microphone access
    fn begin(&mut self) -> Result<()>;

    /// Stop capturing, release the stream, and return the encoded payload
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be produced; the stream is
    /// released regardless
    fn finish(&mut self) -> Result<Vec<u8>>;

    /// Stop capturing and discard everything accumulated
    fn cancel(&mut self);
}

/// Remote analysis collaborator
#[async_trait]
pub trait AnalysisBackend {
    /// Analyze one utterance; consumes the payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::Submission`] carrying the user-facing message
    async fn analyze(&self, audio: Vec<u8>, scenario: &str) -> Result<AnalysisResult>;
}

/// Speech playback collaborator
#[async_trait]
pub trait SpeechOutput {
    /// Speak a phrase; at most one playback is active at a time
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn speak(&mut self, text: &str) -> Result<()>;
}

/// Everything the renderer gets for one successful turn
#[derive(Debug, Clone)]
pub struct FeedbackView {
    /// The service's feedback
    pub result: AnalysisResult,
    /// Word annotations of transcript vs. correction, when one was offered
    pub diff: Option<SentenceDiff>,
    /// Phrase selected for playback, if any
    pub playback_phrase: Option<String>,
}

/// Rendering collaborator; receives exactly one notification per session
pub trait FeedbackSink {
    /// A turn succeeded
    fn feedback(&mut self, view: &FeedbackView);

    /// A turn failed
    fn failure(&mut self, message: &str);
}

/// Coordinates one practice cycle from capture start to rendered outcome
///
/// Collaborators are boxed so the controller can be driven against test
/// doubles. The capture source typically wraps a cpal stream, which is not
/// `Send`; the controller is meant to live on the main task.
pub struct SessionController {
    capture: Box<dyn CaptureSource>,
    analyzer: Box<dyn AnalysisBackend>,
    speech: Option<Box<dyn SpeechOutput>>,
    sink: Box<dyn FeedbackSink>,
    session: Session,
    scenario: String,
    capture_supported: bool,
}

impl SessionController {
    /// Create a controller with no speech output configured
    #[must_use]
    pub fn new(
        capture: Box<dyn CaptureSource>,
        analyzer: Box<dyn AnalysisBackend>,
        sink: Box<dyn FeedbackSink>,
        scenario: impl Into<String>,
    ) -> Self {
        let scenario = scenario.into();
        let capture_supported = capture.is_supported();

        if !capture_supported {
            tracing::warn!("no audio capture capability detected");
        }

        Self {
            capture,
            analyzer,
            speech: None,
            sink,
            session: Session::new(scenario.clone()),
            scenario,
            capture_supported,
        }
    }

    /// Attach a speech output used to play back the selected phrase
    #[must_use]
    pub fn with_speech(mut self, speech: Box<dyn SpeechOutput>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// The session currently owned by the controller
    #[must_use]
    pub const fn current_session(&self) -> &Session {
        &self.session
    }

    /// Whether the platform reported capture capability at startup
    #[must_use]
    pub const fn capture_supported(&self) -> bool {
        self.capture_supported
    }

    /// Start capturing a new utterance.
    ///
    /// Only valid in `Idle`: a start while a turn is in progress, or after
    /// the session reached a terminal state, is ignored (state unchanged,
    /// no side effect). With no capture capability the session fails
    /// immediately; a permission denial fails it without ever entering
    /// `Capturing`.
    pub fn start_turn(&mut self) -> SessionState {
        match self.session.state {
            SessionState::Capturing | SessionState::Submitting => {
                tracing::debug!(session = %self.session.id, "start ignored: turn in progress");
                return self.session.state;
            }
            SessionState::Succeeded | SessionState::Failed => {
                tracing::debug!(
                    session = %self.session.id,
                    "start ignored: session finished, reset required"
                );
                return self.session.state;
            }
            SessionState::Idle => {}
        }

        if !self.capture_supported {
            return self.fail(&Error::CaptureUnsupported);
        }

        match self.capture.begin() {
            Ok(()) => {
                self.session.state = SessionState::Capturing;
                tracing::info!(
                    session = %self.session.id,
                    scenario = %self.session.scenario,
                    "capture started"
                );
                SessionState::Capturing
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Stop capturing and submit the utterance for analysis.
    ///
    /// A stop outside `Capturing` is a no-op. Exactly one request is sent
    /// per submission; failures are surfaced, never retried, and the
    /// request is awaited to completion once begun. The payload is handed
    /// to the analysis collaborator by value and dropped with the request,
    /// whatever the outcome.
    pub async fn finish_turn(&mut self) -> SessionState {
        if self.session.state != SessionState::Capturing {
            tracing::debug!(
                session = %self.session.id,
                state = ?self.session.state,
                "stop ignored"
            );
            return self.session.state;
        }

        // finish() releases the stream on success and error alike
        let payload = match self.capture.finish() {
            Ok(payload) => payload,
            Err(e) => return self.fail(&e),
        };

        self.session.state = SessionState::Submitting;
        tracing::info!(
            session = %self.session.id,
            bytes = payload.len(),
            "submitting utterance"
        );

        match self.analyzer.analyze(payload, &self.session.scenario).await {
            Ok(result) => self.succeed(result).await,
            Err(e) => self.fail(&e),
        }
    }

    /// Abandon an active capture without submitting.
    ///
    /// Releases the stream, discards the audio, and replaces the session
    /// with a fresh idle one. A no-op outside `Capturing`.
    pub fn cancel_turn(&mut self) {
        if self.session.state != SessionState::Capturing {
            return;
        }

        self.capture.cancel();
        tracing::info!(session = %self.session.id, "capture cancelled");
        self.session = Session::new(self.scenario.clone());
    }

    /// Discard a finished session and install a fresh idle one.
    ///
    /// Ignored while a turn is in progress; terminal states are only ever
    /// left through this replacement.
    pub fn reset(&mut self) {
        if matches!(
            self.session.state,
            SessionState::Capturing | SessionState::Submitting
        ) {
            tracing::debug!(session = %self.session.id, "reset ignored: turn in progress");
            return;
        }

        self.session = Session::new(self.scenario.clone());
    }

    async fn succeed(&mut self, result: AnalysisResult) -> SessionState {
        let diff = result
            .grammar_correction
            .as_ref()
            .map(|correction| diff::annotate(&result.transcript, correction));
        let playback_phrase = result.playback_phrase().map(str::to_string);

        self.session.state = SessionState::Succeeded;
        self.session.result = Some(result.clone());
        tracing::info!(
            session = %self.session.id,
            score = result.pronunciation_score,
            corrected = result.grammar_correction.is_some(),
            "session succeeded"
        );

        let view = FeedbackView {
            result,
            diff,
            playback_phrase: playback_phrase.clone(),
        };
        self.sink.feedback(&view);

        if let Some(speech) = self.speech.as_mut() {
            if let Some(text) = playback_phrase {
                // Feedback is already on screen; a playback failure is not a
                // session failure.
                if let Err(e) = speech.speak(&text).await {
                    tracing::warn!(session = %self.session.id, error = %e, "playback failed");
                }
            }
        }

        SessionState::Succeeded
    }

    fn fail(&mut self, error: &Error) -> SessionState {
        let message = error.user_message();
        tracing::warn!(session = %self.session.id, error = %error, "session failed");

        self.session.state = SessionState::Failed;
        self.session.error = Some(message.clone());
        self.sink.failure(&message);

        SessionState::Failed
    }
}
