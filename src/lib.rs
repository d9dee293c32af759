//! Parlo - spoken-language practice coach
//!
//! This library provides the core functionality for the coach:
//! - Practice session state machine (capture → submit → feedback → playback)
//! - Word-level diff annotation of an utterance against its correction
//! - Clients for the remote analysis and speech services
//! - Microphone capture and speaker playback
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      CLI                             │
//! │        practice loop  │  mic/speaker checks          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               SessionController                      │
//! │   Idle → Capturing → Submitting → Succeeded/Failed  │
//! └──┬──────────────┬──────────────┬──────────────┬─────┘
//!    │              │              │              │
//! ┌──▼─────┐  ┌─────▼──────┐  ┌───▼─────┐  ┌─────▼─────┐
//! │Capture │  │  Analysis  │  │ Speech  │  │ Renderer  │
//! │ (cpal) │  │  (HTTP)    │  │ (HTTP)  │  │ (stdout)  │
//! └────────┘  └────────────┘  └─────────┘  └───────────┘
//! ```

pub mod analysis;
pub mod config;
pub mod diff;
pub mod error;
pub mod render;
pub mod session;
pub mod voice;

pub use analysis::{AnalysisClient, AnalysisResult};
pub use config::Config;
pub use diff::{Annotation, SentenceDiff, WordMark, WordStatus, annotate};
pub use error::{Error, Result};
pub use render::TerminalRenderer;
pub use session::{
    AnalysisBackend, CaptureSource, FeedbackSink, FeedbackView, Session, SessionController,
    SessionState, SpeechOutput,
};
pub use voice::{AudioCapture, AudioPlayback, SpeechSynthesizer};
