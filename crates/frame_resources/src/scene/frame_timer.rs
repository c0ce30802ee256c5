use std::time::Duration;
use std::time::Instant;

/// Wall-clock frame timer that excludes time spent stopped.
pub struct FrameTimer {
    base: Instant,
    previous: Instant,
    paused: Duration,
    stopped_at: Option<Instant>,
    delta: Duration,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            base: now,
            previous: now,
            paused: Duration::ZERO,
            stopped_at: None,
            delta: Duration::ZERO,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn tick(&mut self) {
        if self.stopped_at.is_some() {
            self.delta = Duration::ZERO;
            return;
        }
        let now = Instant::now();
        self.delta = now.saturating_duration_since(self.previous);
        self.previous = now;
    }

    pub fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
        }
    }

    pub fn start(&mut self) {
        if let Some(stopped_at) = self.stopped_at.take() {
            let now = Instant::now();
            self.paused += now.saturating_duration_since(stopped_at);
            self.previous = now;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn total_seconds(&self) -> f32 {
        let end = self.stopped_at.unwrap_or(self.previous);
        end.saturating_duration_since(self.base)
            .saturating_sub(self.paused)
            .as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timer_reports_no_delta() {
        let mut timer = FrameTimer::new();
        timer.stop();
        std::thread::sleep(Duration::from_millis(5));
        timer.tick();
        assert!(timer.is_stopped());
        assert_eq!(timer.delta_seconds(), 0.0);

        let total_while_stopped = timer.total_seconds();
        timer.start();
        timer.tick();
        assert!(!timer.is_stopped());
        assert!(timer.total_seconds() >= total_while_stopped);
    }
}
