//! Duration of an MP3 stream, measured from its layer III frame headers

const MPEG1_KBPS: [u32; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const MPEG2_KBPS: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

/// Frame count and timing of an MP3 stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mp3Duration {
    pub frames: u32,
    pub samples_per_frame: u32,
    pub sample_rate: u32,
}

impl Mp3Duration {
    pub fn seconds(&self) -> f64 {
        f64::from(self.frames) * f64::from(self.samples_per_frame) / f64::from(self.sample_rate)
    }
}

struct FrameHeader {
    length: usize,
    samples: u32,
    sample_rate: u32,
}

fn parse_header(bytes: &[u8]) -> Option<FrameHeader> {
    let &[b0, b1, b2, _] = bytes.get(..4)? else {
        return None;
    };

    if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
        return None;
    }

    // 0: MPEG 2.5, 2: MPEG 2, 3: MPEG 1
    let version = (b1 >> 3) & 0b11;
    let layer = (b1 >> 1) & 0b11;
    let bitrate_index = usize::from(b2 >> 4);
    let rate_index = usize::from((b2 >> 2) & 0b11);
    let padding = usize::from((b2 >> 1) & 1);

    if version == 1 || layer != 0b01 || bitrate_index == 0 || bitrate_index == 15 || rate_index == 3 {
        return None;
    }

    let (kbps, rates, samples, coefficient) = match version {
        3 => (MPEG1_KBPS[bitrate_index], [44_100, 48_000, 32_000], 1152, 144_000),
        2 => (MPEG2_KBPS[bitrate_index], [22_050, 24_000, 16_000], 576, 72_000),
        _ => (MPEG2_KBPS[bitrate_index], [11_025, 12_000, 8_000], 576, 72_000),
    };
    let sample_rate: u32 = rates[rate_index];

    let length = usize::try_from(coefficient * kbps / sample_rate).ok()? + padding;

    Some(FrameHeader {
        length,
        samples,
        sample_rate,
    })
}

/// Size of a leading ID3v2 tag, zero when there is none
fn id3_len(bytes: &[u8]) -> usize {
    match bytes {
        [b'I', b'D', b'3', _, _, _, s0, s1, s2, s3, ..] => {
            let size = [*s0, *s1, *s2, *s3]
                .into_iter()
                .fold(0usize, |acc, byte| (acc << 7) | usize::from(byte & 0x7F));
            10 + size
        }
        _ => 0,
    }
}

/// Walk the stream frame by frame; `None` when no frame is found
pub fn duration(bytes: &[u8]) -> Option<Mp3Duration> {
    let mut position = id3_len(bytes);
    let mut frames = 0u32;
    let mut timing = None;

    while position + 4 <= bytes.len() {
        match parse_header(&bytes[position..]) {
            Some(header) if header.length > 4 => {
                timing.get_or_insert((header.samples, header.sample_rate));
                frames += 1;
                position += header.length;
            }
            _ => position += 1,
        }
    }

    let (samples_per_frame, sample_rate) = timing?;

    Some(Mp3Duration {
        frames,
        samples_per_frame,
        sample_rate,
    })
}
