use jiff::Zoned;

use crate::types::Engine;

/// Source of the wall-clock time stamped into file names
pub trait Clock: Send + Sync {
    fn now(&self) -> Zoned;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Zoned {
        Zoned::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone)]
pub struct FixedClock(pub Zoned);

impl Clock for FixedClock {
    fn now(&self) -> Zoned {
        self.0.clone()
    }
}

/// `YYYYMMDD_HHMMSS` in the zone of `now`
pub fn timestamp(now: &Zoned) -> String {
    now.strftime("%Y%m%d_%H%M%S").to_string()
}

/// Suggested download name, e.g. `speech_gemini_Puck_20250307_090503.mp3`
pub fn file_name(engine: Engine, voice: &str, now: &Zoned) -> String {
    format!("speech_{}_{voice}_{}.mp3", engine.file_marker(), timestamp(now))
}
