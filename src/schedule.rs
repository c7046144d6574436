use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::events::TimerEvent;

/// Exclusive handle to a spawned timer task.
///
/// Cancelling (or dropping) the handle stops the task; events it already
/// queued are rejected downstream by their epoch.
#[derive(Debug)]
pub struct ScheduleHandle {
    cancel: CancellationToken,
}

impl ScheduleHandle {
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Deliver `event` every `period`, first delivery one period from now.
pub fn spawn_recurring(period: Duration, to: Sender<TimerEvent>, event: TimerEvent) -> ScheduleHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                sent = to.send(event) => {
                    if sent.is_err() {
                        break;
                    }
                    trace!(?event, "recurring timer fired");
                }
            }
        }
    });
    ScheduleHandle { cancel }
}

/// Deliver `event` once after `delay`.
pub fn spawn_once(delay: Duration, to: Sender<TimerEvent>, event: TimerEvent) -> ScheduleHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = sleep(delay) => {}
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            sent = to.send(event) => {
                if sent.is_ok() {
                    trace!(?event, "one-shot timer fired");
                }
            }
        }
    });
    ScheduleHandle { cancel }
}
