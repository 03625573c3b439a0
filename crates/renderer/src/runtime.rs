use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Snapshot of the clock handed to the uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed seconds since the first rendered frame.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Where elapsed time comes from.
///
/// Sources are read once per frame and never rewind. There is no reset.
pub trait TimeSource {
    fn sample(&mut self) -> TimeSample;
}

/// Monotonic wall clock. The origin is captured on the first sample so the
/// first frame always reads `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource {
    origin: Option<Instant>,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for SystemTimeSource {
    fn sample(&mut self) -> TimeSample {
        let now = Instant::now();
        let origin = *self.origin.get_or_insert(now);
        let elapsed = now.saturating_duration_since(origin);
        let sample = TimeSample::new(elapsed.as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports the same timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl TimeSource for FixedTimeSource {
    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Handle used to drive a [`ManualTimeSource`] from outside the render loop.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock to `seconds`. Attempts to go backwards are ignored.
    pub fn set(&self, seconds: f32) {
        let current = self.now();
        if seconds.is_finite() && seconds >= current {
            self.bits.store(seconds.to_bits(), Ordering::Relaxed);
        } else {
            tracing::debug!(current, requested = seconds, "ignoring backwards clock move");
        }
    }

    pub fn advance(&self, seconds: f32) {
        self.set(self.now() + seconds.max(0.0));
    }

    pub fn now(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// A time source reading this clock.
    pub fn source(&self) -> ManualTimeSource {
        ManualTimeSource {
            clock: self.clone(),
            frame: 0,
        }
    }
}

/// Time source that reports whatever its [`ManualClock`] was last set to.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    clock: ManualClock,
    frame: u64,
}

impl TimeSource for ManualTimeSource {
    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.clock.now(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn system_clock_starts_at_zero_and_never_decreases() {
        let mut source = SystemTimeSource::new();
        let first = source.sample();
        assert_eq!(first.seconds, 0.0);
        assert_eq!(first.frame_index, 0);

        let mut last = first.seconds;
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(2));
            let sample = source.sample();
            assert!(sample.seconds >= last);
            last = sample.seconds;
        }
        assert!(last > 0.0);
        assert_eq!(source.sample().frame_index, 6);
    }

    #[test]
    fn fixed_source_repeats_its_timestamp() {
        let mut source = FixedTimeSource::new(12.5);
        assert_eq!(source.sample().seconds, 12.5);
        let second = source.sample();
        assert_eq!(second.seconds, 12.5);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn manual_clock_refuses_to_rewind() {
        let clock = ManualClock::new();
        let mut source = clock.source();
        clock.set(5.0);
        assert_eq!(source.sample().seconds, 5.0);
        clock.set(1.0);
        assert_eq!(source.sample().seconds, 5.0);
        clock.advance(0.5);
        assert_eq!(source.sample().seconds, 5.5);
        clock.set(f32::NAN);
        assert_eq!(clock.now(), 5.5);
    }
}
