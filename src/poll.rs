use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Lets the UI ask for an out-of-schedule tick, e.g. when the window regains focus.
#[derive(Debug, Clone, Default)]
pub struct FocusTrigger(Arc<Notify>);

impl FocusTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.0.notify_one();
    }

    async fn fired(&self) {
        self.0.notified().await;
    }
}

/// A running poll loop. Dropping the handle stops the timer, and a tick that
/// is still awaiting its response is cancelled with it: nothing from a closed
/// view runs after teardown.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {}
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs `tick` right away, then every `period`, and whenever `trigger` fires.
/// Ticks never overlap: a slow tick delays the next one instead of stacking.
pub fn spawn_poller<F, Fut>(runtime: &Handle, period: Duration, trigger: Option<FocusTrigger>, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = runtime.spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            match &trigger {
                Some(trigger) => {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = trigger.fired() => {
                            log::debug!("focus refresh");
                            interval.reset();
                        }
                    }
                }
                None => {
                    interval.tick().await;
                }
            }
            tick().await;
        }
    });
    PollHandle { task }
}
