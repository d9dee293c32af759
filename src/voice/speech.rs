//! Speech synthesis via the coach service
//!
//! The voice list is queried once, up front, and a voice is chosen from the
//! configured locale preference; playback then reuses that choice for every
//! phrase. Synthesis is remote (MP3 over HTTP), playback is local.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::SpeechOutput;
use crate::voice::AudioPlayback;
use crate::{Error, Result};

/// A synthesis voice advertised by the service
#[derive(Debug, Clone, Deserialize)]
pub struct Voice {
    /// Voice identifier, passed back in synthesis requests
    pub name: String,
    /// BCP-47-style locale tag (e.g. "nl-BE")
    pub locale: String,
}

/// Synthesizes and plays phrases through the coach service
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    base_url: String,
    voice: Option<String>,
    playback: AudioPlayback,
}

impl SpeechSynthesizer {
    /// Connect to the service and pick a voice.
    ///
    /// The voice list is fetched exactly once here; an unreachable voice
    /// endpoint degrades to the service's default voice rather than failing
    /// startup.
    ///
    /// # Errors
    ///
    /// Returns error if no audio output device is available
    pub async fn new(base_url: &str, preferred_tags: &[String]) -> Result<Self> {
        let client = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let voices = match fetch_voices(&client, &base_url).await {
            Ok(voices) => voices,
            Err(e) => {
                tracing::warn!(error = %e, "voice list unavailable, using service default");
                Vec::new()
            }
        };

        let voice = select_voice(&voices, preferred_tags);
        match &voice {
            Some(name) => tracing::info!(voice = %name, "synthesis voice selected"),
            None => tracing::info!("no preferred voice matched, using service default"),
        }

        Ok(Self {
            client,
            base_url,
            voice,
            playback: AudioPlayback::new()?,
        })
    }
}

#[async_trait]
impl SpeechOutput for SpeechSynthesizer {
    async fn speak(&mut self, text: &str) -> Result<()> {
        #[derive(Serialize)]
        struct SpeakRequest<'a> {
            text: &'a str,
            voice: Option<&'a str>,
        }

        tracing::debug!(chars = text.len(), "synthesizing phrase");

        let response = self
            .client
            .post(format!("{}/api/speak", self.base_url))
            .json(&SpeakRequest {
                text,
                voice: self.voice.as_deref(),
            })
            .send()
            .await
            .map_err(|e| Error::Playback(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Playback(format!("synthesis error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Playback(e.to_string()))?;

        // play_mp3 blocks until done, so one playback runs at a time
        self.playback.play_mp3(&audio).await
    }
}

/// Fetch the service's voice list
async fn fetch_voices(client: &reqwest::Client, base_url: &str) -> Result<Vec<Voice>> {
    let response = client
        .get(format!("{base_url}/api/voices"))
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}

/// Pick the first voice matching the earliest preferred tag.
///
/// A voice matches a tag when the tag appears in its locale or its name.
/// Tags are tried in order; no match at all means the service default.
#[must_use]
pub fn select_voice(voices: &[Voice], preferred_tags: &[String]) -> Option<String> {
    for tag in preferred_tags {
        if let Some(voice) = voices
            .iter()
            .find(|v| v.locale.contains(tag.as_str()) || v.name.contains(tag.as_str()))
        {
            return Some(voice.name.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, locale: &str) -> Voice {
        Voice {
            name: name.to_string(),
            locale: locale.to_string(),
        }
    }

    #[test]
    fn test_select_voice_prefers_first_tag() {
        let voices = vec![
            voice("Ellen", "nl-NL"),
            voice("Lotte", "nl-BE"),
            voice("Amelia", "en-GB"),
        ];
        let tags = vec!["nl-BE".to_string(), "nl".to_string()];

        assert_eq!(select_voice(&voices, &tags), Some("Lotte".to_string()));
    }

    #[test]
    fn test_select_voice_falls_back_to_second_tag() {
        let voices = vec![voice("Ellen", "nl-NL"), voice("Amelia", "en-GB")];
        let tags = vec!["nl-BE".to_string(), "nl".to_string()];

        assert_eq!(select_voice(&voices, &tags), Some("Ellen".to_string()));
    }

    #[test]
    fn test_select_voice_matches_on_name() {
        let voices = vec![voice("Vlaams-Hanne", "und")];
        let tags = vec!["Vlaams".to_string()];

        assert_eq!(select_voice(&voices, &tags), Some("Vlaams-Hanne".to_string()));
    }

    #[test]
    fn test_select_voice_none_means_default() {
        let voices = vec![voice("Amelia", "en-GB")];
        let tags = vec!["nl-BE".to_string(), "nl".to_string()];

        assert_eq!(select_voice(&voices, &tags), None);
        assert_eq!(select_voice(&[], &tags), None);
    }
}
