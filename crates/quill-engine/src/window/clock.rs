use std::time::{Duration, Instant};

use crate::core::FrameTime;

const DT_MIN: Duration = Duration::from_micros(100);
/// Caps dt after stalls (debugger, minimized window).
const DT_MAX: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub(super) struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).clamp(DT_MIN, DT_MAX);
        self.last = now;

        let time = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start),
            frame_index: self.frame_index,
        };
        self.frame_index += 1;
        time
    }
}
