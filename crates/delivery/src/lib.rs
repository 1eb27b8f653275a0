#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Turns a successful synthesis into an MP3 download

mod download;
mod encoder;
mod error;
pub mod frames;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tts::{AudioFormat, SynthesizedAudio};

pub use download::Download;
pub use encoder::{EncoderSlot, LameEncoder, Mp3Encoder};
pub use error::DeliveryError;

/// Produce the download for one synthesis result
///
/// MP3 payloads are passed through after base64 decoding. PCM payloads need
/// a loaded encoder and are transcoded on the blocking pool.
pub async fn deliver(slot: &EncoderSlot, audio: SynthesizedAudio) -> Result<Download, DeliveryError> {
    let SynthesizedAudio {
        audio_data,
        format,
        file_name,
    } = audio;

    let bytes = match format {
        AudioFormat::Mp3 => decode_base64(&audio_data)?,
        AudioFormat::Pcm { sample_rate } => {
            let encoder = slot.encoder()?;
            let samples = pcm_samples(&decode_base64(&audio_data)?)?;

            tokio::task::spawn_blocking(move || encoder.encode(&samples, sample_rate))
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "MP3 encoding task failed");
                    DeliveryError::EncodeFailed
                })??
        }
    };

    if let Some(measured) = debug_duration(&bytes) {
        tracing::debug!(file_name = %file_name, seconds = measured.seconds(), "delivering MP3");
    }

    Ok(Download::new(&file_name, bytes))
}

/// Frame-walk the MP3 only when the duration will actually be logged
fn debug_duration(bytes: &[u8]) -> Option<frames::Mp3Duration> {
    if tracing::enabled!(tracing::Level::DEBUG) {
        frames::duration(bytes)
    } else {
        None
    }
}

fn decode_base64(data: &str) -> Result<Vec<u8>, DeliveryError> {
    STANDARD.decode(data).map_err(|e| {
        tracing::error!(error = %e, "audio payload is not valid base64");
        DeliveryError::EncodeFailed
    })
}

/// Reinterpret bytes as 16-bit little-endian signed samples
///
/// A trailing half sample is an error, not something to drop.
pub fn pcm_samples(bytes: &[u8]) -> Result<Vec<i16>, DeliveryError> {
    if bytes.len() % 2 != 0 {
        tracing::error!(len = bytes.len(), "PCM payload has an odd byte count");
        return Err(DeliveryError::EncodeFailed);
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}
