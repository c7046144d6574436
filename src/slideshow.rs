use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tracing::{debug, trace};

use crate::events::{Epoch, TimerEvent};
use crate::schedule::{self, ScheduleHandle};

/// Recurring rotation through the slideshow-eligible artworks.
///
/// The timer only knows how many slides exist. Ticks are delivered through
/// the gallery event channel and applied with [`SlideshowTimer::on_tick`].
#[derive(Debug)]
pub struct SlideshowTimer {
    interval: Duration,
    to_gallery: Sender<TimerEvent>,
    epoch: Epoch,
    schedule: Option<ScheduleHandle>,
    count: usize,
    current: Option<usize>,
}

impl SlideshowTimer {
    pub fn new(interval: Duration, to_gallery: Sender<TimerEvent>) -> Self {
        Self {
            interval,
            to_gallery,
            epoch: Epoch::default(),
            schedule: None,
            count: 0,
            current: None,
        }
    }

    /// (Re-)arm against `eligible_count` slides.
    ///
    /// Any running schedule is cancelled first. The current index is kept but
    /// wrapped into the new range; with zero slides nothing is scheduled and
    /// the index becomes inactive.
    pub fn start(&mut self, eligible_count: usize) {
        self.stop();
        self.count = eligible_count;
        if eligible_count == 0 {
            self.current = None;
            debug!("slideshow idle: no eligible artworks");
            return;
        }
        let index = self.current.map_or(0, |idx| idx % eligible_count);
        self.current = Some(index);
        let epoch = self.epoch.bump();
        self.schedule = Some(schedule::spawn_recurring(
            self.interval,
            self.to_gallery.clone(),
            TimerEvent::SlideTick(epoch),
        ));
        debug!(
            eligible_count,
            index,
            interval_ms = self.interval.as_millis() as u64,
            "slideshow armed"
        );
    }

    /// Cancel the recurring schedule. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.schedule.take() {
            handle.cancel();
            self.epoch.bump();
            debug!("slideshow stopped");
        }
    }

    /// Apply a tick. Returns the new index, or `None` for a tick from a
    /// cancelled or superseded schedule.
    pub fn on_tick(&mut self, epoch: Epoch) -> Option<usize> {
        if self.schedule.is_none() || epoch != self.epoch || self.count == 0 {
            trace!(?epoch, current = ?self.epoch, "ignoring stale slideshow tick");
            return None;
        }
        let next = self.current.map_or(0, |idx| (idx + 1) % self.count);
        self.current = Some(next);
        Some(next)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn eligible_count(&self) -> usize {
        self.count
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{Instant, sleep};

    fn timer(interval_ms: u64) -> (SlideshowTimer, mpsc::Receiver<TimerEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (
            SlideshowTimer::new(Duration::from_millis(interval_ms), tx),
            rx,
        )
    }

    async fn next_tick(rx: &mut mpsc::Receiver<TimerEvent>) -> Epoch {
        match rx.recv().await.expect("timer channel open") {
            TimerEvent::SlideTick(epoch) => epoch,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_rotation_returns_to_start() {
        for count in 1..=5 {
            let (mut timer, mut rx) = timer(5000);
            timer.start(count);
            assert_eq!(timer.current_index(), Some(0));
            for _ in 0..count {
                let epoch = next_tick(&mut rx).await;
                timer.on_tick(epoch).expect("live tick");
            }
            assert_eq!(timer.current_index(), Some(0), "count {count}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn two_slides_advance_then_wrap() {
        let (mut timer, mut rx) = timer(5000);
        let start = Instant::now();
        timer.start(2);
        let epoch = next_tick(&mut rx).await;
        assert!(start.elapsed() >= Duration::from_millis(5000));
        assert_eq!(timer.on_tick(epoch), Some(1));
        let epoch = next_tick(&mut rx).await;
        assert_eq!(timer.on_tick(epoch), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_slides_never_schedule() {
        let (mut timer, mut rx) = timer(100);
        timer.start(0);
        assert!(!timer.is_running());
        assert_eq!(timer.current_index(), None);
        sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(timer.on_tick(Epoch::default()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_silences_ticks() {
        let (mut timer, mut rx) = timer(100);
        timer.start(3);
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_from_previous_arming_are_ignored() {
        let (mut timer, mut rx) = timer(100);
        timer.start(3);
        let stale = next_tick(&mut rx).await;
        assert_eq!(timer.on_tick(stale), Some(1));
        timer.start(4);
        assert_eq!(timer.on_tick(stale), None);
        assert_eq!(timer.current_index(), Some(1));
        let fresh = next_tick(&mut rx).await;
        assert_ne!(fresh, stale);
        assert_eq!(timer.on_tick(fresh), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_count_wraps_index() {
        let (mut timer, mut rx) = timer(100);
        timer.start(5);
        for _ in 0..4 {
            let epoch = next_tick(&mut rx).await;
            timer.on_tick(epoch);
        }
        assert_eq!(timer.current_index(), Some(4));
        timer.start(3);
        assert_eq!(timer.current_index(), Some(1));
        timer.start(0);
        assert_eq!(timer.current_index(), None);
        timer.start(2);
        assert_eq!(timer.current_index(), Some(0));
    }
}
