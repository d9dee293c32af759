//! Audio capture from microphone

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::session::CaptureSource;
use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16_000;

/// Captures one utterance at a time from the default input device
///
/// The stream handle lives inside this struct for exactly the span of a
/// capture; `finish` and `cancel` drop it on every path, which stops the
/// hardware (cpal streams stop on drop).
pub struct AudioCapture {
    device: Option<Device>,
    config: Option<StreamConfig>,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Probe the default input device once.
    ///
    /// A missing device or unusable configuration does not error: it makes
    /// the capture unsupported, which `is_supported` reports.
    #[must_use]
    pub fn new() -> Self {
        let probed = probe_input_device();

        if probed.is_none() {
            tracing::warn!("no usable audio input device found");
        }

        let (device, config) = probed.map_or((None, None), |(d, c)| (Some(d), Some(c)));

        if let (Some(device), Some(config)) = (&device, &config) {
            tracing::debug!(
                device = device.name().unwrap_or_default(),
                sample_rate = SAMPLE_RATE,
                channels = config.channels,
                "audio capture initialized"
            );
        }

        Self {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        }
    }

    /// Copy of the captured samples so far, without clearing (diagnostics)
    #[must_use]
    pub fn peek_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Discard the captured samples so far (diagnostics)
    pub fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }
}

impl Default for AudioCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for AudioCapture {
    fn is_supported(&self) -> bool {
        self.device.is_some()
    }

    fn begin(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let device = self.device.as_ref().ok_or(Error::CaptureUnsupported)?;
        let config = self
            .config
            .clone()
            .ok_or(Error::CaptureUnsupported)?;

        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        let buffer = Arc::clone(&self.buffer);

        // A device can exist but refuse to open a stream; that is the
        // permission-denied class, distinct from no-device-at-all.
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::CapturePermissionDenied(e.to_string()))?;

        stream
            .play()
            .map_err(|e| Error::CapturePermissionDenied(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        // Dropping the stream stops the hardware before the samples are read
        drop(self.stream.take());

        let samples = self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        tracing::debug!(samples = samples.len(), "audio capture stopped");
        samples_to_wav(&samples, SAMPLE_RATE)
    }

    fn cancel(&mut self) {
        drop(self.stream.take());

        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        tracing::debug!("audio capture cancelled");
    }
}

/// Find the default input device with a mono 16kHz config
fn probe_input_device() -> Option<(Device, StreamConfig)> {
    let host = cpal::default_host();
    let device = host.default_input_device()?;

    let supported = device
        .supported_input_configs()
        .ok()?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
        })?;

    let config = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();
    Some((device, config))
}

/// Convert f32 samples to WAV bytes for the analysis service
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
