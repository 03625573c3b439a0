use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Requests ticks from the host's display-refresh callback.
///
/// The driver asks for exactly one tick at a time: once on mount and once
/// after every rendered frame. `cancel` withdraws any outstanding request
/// and is called on unmount, after which no ticks are requested again.
pub trait TickScheduler {
    fn schedule_next(&mut self);
    fn cancel(&mut self);
}

/// Scheduler backed by a shared flag that the host loop polls.
///
/// The winit loop checks the flag when it is about to wait and turns a
/// pending request into a redraw.
#[derive(Debug, Clone, Default)]
pub struct RedrawFlag {
    pending: Rc<Cell<bool>>,
}

impl RedrawFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Consumes the pending request, if any.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }
}

impl TickScheduler for RedrawFlag {
    fn schedule_next(&mut self) {
        self.pending.set(true);
    }

    fn cancel(&mut self) {
        self.pending.set(false);
    }
}

/// Optional frame cap layered over the display refresh.
///
/// When a frame arrives before its slot it is skipped rather than queued.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    /// Caps that are not positive, or whose interval does not fit in a
    /// `Duration`, leave the pacer uncapped.
    pub fn new(max_fps: Option<f32>) -> Self {
        let interval = max_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .and_then(|fps| Duration::try_from_secs_f64(1.0 / f64::from(fps)).ok());
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready(&self, now: Instant) -> bool {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        Some(self.last_frame? + self.interval?)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redraw_flag_tracks_single_request() {
        let mut flag = RedrawFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_pending());
        flag.schedule_next();
        flag.schedule_next();
        assert!(observer.take());
        assert!(!observer.take());
        flag.schedule_next();
        flag.cancel();
        assert!(!observer.is_pending());
    }

    #[test]
    fn uncapped_pacer_is_always_ready() {
        let mut pacer = FramePacer::new(None);
        let now = Instant::now();
        pacer.mark_rendered(now);
        assert!(pacer.ready(now));
        assert!(pacer.next_deadline().is_none());
    }

    #[test]
    fn capped_pacer_drops_early_frames() {
        let mut pacer = FramePacer::new(Some(10.0));
        let start = Instant::now();
        assert!(pacer.ready(start));
        pacer.mark_rendered(start);
        assert!(!pacer.ready(start + Duration::from_millis(50)));
        assert!(pacer.ready(start + Duration::from_millis(100)));
        assert_eq!(pacer.next_deadline(), Some(start + Duration::from_millis(100)));
    }

    #[test]
    fn non_positive_caps_are_ignored() {
        assert!(FramePacer::new(Some(0.0)).interval().is_none());
        assert!(FramePacer::new(Some(-5.0)).interval().is_none());
        assert!(FramePacer::new(Some(f32::NAN)).interval().is_none());
    }

    #[test]
    fn unrepresentable_caps_leave_pacer_uncapped() {
        assert!(FramePacer::new(Some(1.0e-20)).interval().is_none());
        assert!(FramePacer::new(Some(f32::MIN_POSITIVE)).interval().is_none());
        let slow = FramePacer::new(Some(0.5));
        assert_eq!(slow.interval(), Some(Duration::from_secs(2)));
    }
}
