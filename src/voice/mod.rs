//! Voice I/O
//!
//! Microphone capture, speaker playback, and speech synthesis via the
//! coach service. All thin wrappers over cpal and HTTP; the session logic
//! lives in `session`.

mod capture;
mod playback;
mod speech;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use playback::AudioPlayback;
pub use speech::{SpeechSynthesizer, Voice, select_voice};
