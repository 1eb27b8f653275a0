use serde::Deserialize;

/// Bitrates the bundled LAME encoder accepts for constant-bitrate output
pub const SUPPORTED_BITRATES_KBPS: [u16; 16] = [8, 16, 24, 32, 40, 48, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];

/// MP3 encoding configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    /// Constant bitrate used when transcoding raw PCM
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: default_bitrate(),
        }
    }
}

const fn default_bitrate() -> u16 {
    128
}
