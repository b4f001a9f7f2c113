use std::time::{Duration, Instant};

/// 每帧 tick 一次，提供 imgui 需要的 delta time
pub struct FrameTimer {
    last_tick: Instant,
    delta: Duration,
    frame_cnt: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self {
            last_tick: Instant::now(),
            delta: Self::MIN_DELTA,
            frame_cnt: 0,
        }
    }
}

impl FrameTimer {
    /// imgui 要求 delta time 严格大于 0
    pub const MIN_DELTA: Duration = Duration::from_micros(1);

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_tick).max(Self::MIN_DELTA);
        self.last_tick = now;
        self.frame_cnt += 1;
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    #[inline]
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[inline]
    pub fn frame_cnt(&self) -> u64 {
        self.frame_cnt
    }
}
