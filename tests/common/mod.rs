//! Test doubles for the session controller's collaborators
//!
//! Each mock records its calls through shared handles so a test can keep
//! observing after the controller takes ownership of the boxed double.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use parlo_coach::session::{AnalysisBackend, CaptureSource, FeedbackSink, FeedbackView, SpeechOutput};
use parlo_coach::{AnalysisResult, Error, Result};

/// Scripted microphone double
pub struct MockCapture {
    supported: bool,
    deny_permission: bool,
    payload: Vec<u8>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockCapture {
    pub fn working(payload: Vec<u8>) -> (Self, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                supported: true,
                deny_permission: false,
                payload,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    pub fn unsupported() -> (Self, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                supported: false,
                deny_permission: false,
                payload: Vec::new(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    pub fn permission_denied() -> (Self, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                supported: true,
                deny_permission: true,
                payload: Vec::new(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl CaptureSource for MockCapture {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn begin(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push("begin");
        if self.deny_permission {
            return Err(Error::CapturePermissionDenied("blocked by test".to_string()));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push("finish");
        Ok(self.payload.clone())
    }

    fn cancel(&mut self) {
        self.calls.lock().unwrap().push("cancel");
    }
}

/// Canned analysis service double
pub struct MockAnalyzer {
    outcome: std::result::Result<AnalysisResult, String>,
    requests: Arc<Mutex<Vec<(Vec<u8>, String)>>>,
}

impl MockAnalyzer {
    pub fn succeeding(result: AnalysisResult) -> (Self, Arc<Mutex<Vec<(Vec<u8>, String)>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                outcome: Ok(result),
                requests: Arc::clone(&requests),
            },
            requests,
        )
    }

    pub fn failing(message: &str) -> (Self, Arc<Mutex<Vec<(Vec<u8>, String)>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                outcome: Err(message.to_string()),
                requests: Arc::clone(&requests),
            },
            requests,
        )
    }
}

#[async_trait]
impl AnalysisBackend for MockAnalyzer {
    async fn analyze(&self, audio: Vec<u8>, scenario: &str) -> Result<AnalysisResult> {
        self.requests
            .lock()
            .unwrap()
            .push((audio, scenario.to_string()));
        match &self.outcome {
            Ok(result) => Ok(result.clone()),
            Err(message) => Err(Error::Submission(message.clone())),
        }
    }
}

/// Speech double recording every spoken phrase
pub struct MockSpeech {
    fail: bool,
    spoken: Arc<Mutex<Vec<String>>>,
}

impl MockSpeech {
    pub fn working() -> (Self, Arc<Mutex<Vec<String>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                fail: false,
                spoken: Arc::clone(&spoken),
            },
            spoken,
        )
    }

    pub fn failing() -> (Self, Arc<Mutex<Vec<String>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                fail: true,
                spoken: Arc::clone(&spoken),
            },
            spoken,
        )
    }
}

#[async_trait]
impl SpeechOutput for MockSpeech {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(Error::Playback("synthetic failure".to_string()));
        }
        Ok(())
    }
}

/// One notification received by the recording sink
#[derive(Debug, Clone)]
pub enum Rendered {
    Success(FeedbackView),
    Failure(String),
}

/// Renderer double recording every notification
pub struct RecordingSink {
    renders: Arc<Mutex<Vec<Rendered>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<Rendered>>>) {
        let renders = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                renders: Arc::clone(&renders),
            },
            renders,
        )
    }
}

impl FeedbackSink for RecordingSink {
    fn feedback(&mut self, view: &FeedbackView) {
        self.renders
            .lock()
            .unwrap()
            .push(Rendered::Success(view.clone()));
    }

    fn failure(&mut self, message: &str) {
        self.renders
            .lock()
            .unwrap()
            .push(Rendered::Failure(message.to_string()));
    }
}

/// A result with every feedback field populated
pub fn full_result() -> AnalysisResult {
    AnalysisResult {
        transcript: "Ik heb gisteren naar de winkel gegaan".to_string(),
        pronunciation_score: 82,
        pronunciation_feedback: Some("Mooie harde g.".to_string()),
        grammar_correction: Some("Ik ben gisteren naar de winkel gegaan".to_string()),
        grammar_feedback: Some("Hulpwerkwoord: zijn, niet hebben.".to_string()),
        better_alternative: Some("Ik ben gisteren eens naar de winkel geweest".to_string()),
        cefr_level: Some("B1".to_string()),
        cefr_feedback: Some("Goede woordenschat.".to_string()),
        response: Some("Leuk! Wat heb je gekocht?".to_string()),
    }
}
