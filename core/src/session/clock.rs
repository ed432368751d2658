use std::ops::ControlFlow;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Calls back at a fixed period until the callback breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    period: Duration,
}

impl Clock {
    pub const fn new(period: Duration) -> Self {
        Self { period }
    }

    pub const fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// The first call happens one period after the task starts. A late tick
    /// delays the following ones instead of firing a burst to catch up.
    pub fn spawn<F>(self, runtime: &Handle, mut on_tick: F) -> JoinHandle<()>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn should_tick_every_period_until_break() {
        let count = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let handle = {
            let count = count.clone();
            Clock::every_second().spawn(&Handle::current(), move || {
                if count.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
        };
        handle.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }
}
