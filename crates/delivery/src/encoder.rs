use std::sync::{Arc, OnceLock};

use mp3lame_encoder::{Bitrate, BuildError, Builder, Encoder, FlushNoGap, MonoPcm};

use crate::error::DeliveryError;

/// Output size reserved for the final flush, as recommended by LAME
const FLUSH_BUFFER_BYTES: usize = 7200;

/// Mono 16-bit PCM to MP3 transcoder
///
/// Implementations block; callers run them on the blocking pool.
pub trait Mp3Encoder: Send + Sync {
    /// Encode every sample, then flush, returning the concatenated stream
    fn encode(&self, samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, DeliveryError>;

    /// Check that the underlying library can be initialized at all
    fn probe(&self) -> Result<(), DeliveryError>;
}

/// LAME, one fresh encoder per call
#[derive(Debug, Clone, Copy)]
pub struct LameEncoder {
    bitrate_kbps: u16,
}

impl LameEncoder {
    /// `bitrate_kbps` must be one of the MPEG layer III rates
    pub fn new(bitrate_kbps: u16) -> Result<Self, DeliveryError> {
        bitrate(bitrate_kbps).ok_or(DeliveryError::EncoderUnavailable)?;
        Ok(Self { bitrate_kbps })
    }

    fn build(self, sample_rate: u32) -> Result<Encoder, DeliveryError> {
        let mut builder = Builder::new().ok_or_else(|| {
            tracing::error!("LAME could not allocate an encoder");
            DeliveryError::EncoderUnavailable
        })?;

        let bitrate = bitrate(self.bitrate_kbps).ok_or(DeliveryError::EncoderUnavailable)?;

        configure(&mut builder, sample_rate, bitrate).map_err(|e| {
            tracing::error!(error = ?e, sample_rate, "LAME rejected encoder settings");
            DeliveryError::EncodeFailed
        })?;

        builder.build().map_err(|e| {
            tracing::error!(error = ?e, sample_rate, "LAME failed to initialize");
            DeliveryError::EncodeFailed
        })
    }
}

impl Default for LameEncoder {
    fn default() -> Self {
        Self { bitrate_kbps: 128 }
    }
}

impl Mp3Encoder for LameEncoder {
    fn encode(&self, samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, DeliveryError> {
        let mut encoder = self.build(sample_rate)?;

        let mut out = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(samples.len()) + FLUSH_BUFFER_BYTES);

        encoder.encode_to_vec(MonoPcm(samples), &mut out).map_err(|e| {
            tracing::error!(error = ?e, "MP3 encoding failed");
            DeliveryError::EncodeFailed
        })?;

        encoder.flush_to_vec::<FlushNoGap>(&mut out).map_err(|e| {
            tracing::error!(error = ?e, "MP3 flush failed");
            DeliveryError::EncodeFailed
        })?;

        Ok(out)
    }

    fn probe(&self) -> Result<(), DeliveryError> {
        self.build(tts::DEFAULT_SAMPLE_RATE)
            .map(drop)
            .map_err(|_| DeliveryError::EncoderUnavailable)
    }
}

fn configure(builder: &mut Builder, sample_rate: u32, bitrate: Bitrate) -> Result<(), BuildError> {
    builder.set_num_channels(1)?;
    builder.set_sample_rate(sample_rate)?;
    builder.set_brate(bitrate)?;
    Ok(())
}

fn bitrate(kbps: u16) -> Option<Bitrate> {
    Some(match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        _ => return None,
    })
}

enum SlotState {
    Ready(Arc<dyn Mp3Encoder>),
    Failed,
}

/// Holds the encoder once it has loaded
///
/// Starts empty; [`EncoderSlot::load`] fills it exactly once, either with a
/// working encoder or with a load failure that is reported on every use.
#[derive(Default)]
pub struct EncoderSlot {
    state: OnceLock<SlotState>,
}

impl EncoderSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot that is already loaded, skipping the probe
    pub fn ready(encoder: Arc<dyn Mp3Encoder>) -> Self {
        let slot = Self::empty();
        let _ = slot.state.set(SlotState::Ready(encoder));
        slot
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state.get(), Some(SlotState::Ready(_)))
    }

    /// Probe `encoder` on the blocking pool and fill the slot with the outcome
    pub async fn load(&self, encoder: Arc<dyn Mp3Encoder>) {
        let probe = encoder.clone();

        let state = match tokio::task::spawn_blocking(move || probe.probe()).await {
            Ok(Ok(())) => {
                tracing::info!("MP3 encoder loaded");
                SlotState::Ready(encoder)
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "MP3 encoder failed to load");
                SlotState::Failed
            }
            Err(e) => {
                tracing::error!(error = %e, "MP3 encoder probe panicked");
                SlotState::Failed
            }
        };

        if self.state.set(state).is_err() {
            tracing::warn!("MP3 encoder slot was already filled");
        }
    }

    /// The loaded encoder, or why there is none
    pub fn encoder(&self) -> Result<Arc<dyn Mp3Encoder>, DeliveryError> {
        match self.state.get() {
            None => Err(DeliveryError::EncoderNotLoaded),
            Some(SlotState::Failed) => Err(DeliveryError::EncoderUnavailable),
            Some(SlotState::Ready(encoder)) => Ok(encoder.clone()),
        }
    }
}
