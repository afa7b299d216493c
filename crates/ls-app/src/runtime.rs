//! Runs the effects returned by [`crate::app::App::handle`] on tokio.

use crate::events::{AppEvent, LsEvent};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, interval_at, sleep};
use tracing::{debug, error};

pub enum Effect {
    /// Gateway work whose outcome comes back as an event
    Task(BoxFuture<'static, LsEvent>),
    StartPolling,
    StopPolling,
    /// Deliver an event after a delay
    After(Duration, LsEvent),
}

impl Effect {
    pub fn task(future: impl Future<Output = LsEvent> + Send + 'static) -> Self {
        Self::Task(future.boxed())
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(_) => f.write_str("Task"),
            Self::StartPolling => f.write_str("StartPolling"),
            Self::StopPolling => f.write_str("StopPolling"),
            Self::After(delay, event) => f.debug_tuple("After").field(delay).field(event).finish(),
        }
    }
}

enum Queued {
    Timer(LsEvent),
    Tick,
}

/// At most one interval task at a time
#[derive(Debug)]
pub struct Poller {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn start(&mut self, tx: UnboundedSender<Queued>) {
        if self.is_running() {
            debug!("Job polling already running");
            return;
        }
        let period = self.period;
        debug!(?period, "Job polling started");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if tx.send(Queued::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Job polling stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct Runtime {
    tasks: JoinSet<LsEvent>,
    tx: UnboundedSender<Queued>,
    rx: UnboundedReceiver<Queued>,
    poller: Poller,
    timers: usize,
}

impl Runtime {
    pub fn new(poll_interval: Duration) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            tasks: JoinSet::new(),
            tx,
            rx,
            poller: Poller::new(poll_interval),
            timers: 0,
        }
    }

    pub fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Task(task) => {
                    self.tasks.spawn(task);
                }
                Effect::StartPolling => self.poller.start(self.tx.clone()),
                Effect::StopPolling => self.poller.stop(),
                Effect::After(delay, event) => {
                    self.timers += 1;
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        sleep(delay).await;
                        let _ = tx.send(Queued::Timer(event));
                    });
                }
            }
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// No task or timer is outstanding. The poller does not count.
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.timers == 0
    }

    /// Next event from a finished task, a timer or the poller; `None` once
    /// nothing could produce one any more
    pub async fn next_event(&mut self) -> Option<LsEvent> {
        loop {
            if self.is_idle() && !self.is_polling() {
                return None;
            }
            tokio::select! {
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => match joined {
                    Ok(event) => return Some(event),
                    Err(err) => error!(error = %err, "Task failed"),
                },
                Some(queued) = self.rx.recv() => match queued {
                    Queued::Timer(event) => {
                        self.timers = self.timers.saturating_sub(1);
                        return Some(event);
                    }
                    Queued::Tick => return Some(LsEvent::App(AppEvent::PollTick)),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::{Level, Notifications};

    fn is_tick(event: &Option<LsEvent>) -> bool {
        matches!(event, Some(LsEvent::App(AppEvent::PollTick)))
    }

    #[tokio::test(start_paused = true)]
    async fn reentering_loading_keeps_a_single_timer() {
        let mut runtime = Runtime::new(Duration::from_secs(10));
        runtime.dispatch(vec![Effect::StartPolling]);
        runtime.dispatch(vec![Effect::StopPolling]);
        runtime.dispatch(vec![Effect::StartPolling]);
        runtime.dispatch(vec![Effect::StartPolling]);
        assert!(runtime.is_polling());

        let start = Instant::now();
        for _ in 0..3 {
            assert!(is_tick(&runtime.next_event().await));
        }
        // two timers would have delivered three ticks by the 20s mark
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_poller_delivers_nothing() {
        let mut runtime = Runtime::new(Duration::from_secs(10));
        runtime.dispatch(vec![Effect::StartPolling, Effect::StopPolling]);
        assert!(!runtime.is_polling());
        assert!(runtime.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_event_arrives_after_its_delay() {
        let mut notices = Notifications::default();
        let id = notices.push(Level::Info, "saved");
        let mut runtime = Runtime::new(Duration::from_secs(10));
        runtime.dispatch(vec![Effect::After(
            Duration::from_secs(5),
            LsEvent::App(AppEvent::NoticeExpired(id)),
        )]);
        assert!(!runtime.is_idle());

        let start = Instant::now();
        let event = runtime.next_event().await;
        assert!(matches!(event, Some(LsEvent::App(AppEvent::NoticeExpired(got))) if got == id));
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert!(runtime.is_idle());
    }

    #[tokio::test]
    async fn task_output_is_delivered() {
        let mut runtime = Runtime::new(Duration::from_secs(10));
        runtime.dispatch(vec![Effect::task(async { LsEvent::App(AppEvent::PollTick) })]);
        assert!(is_tick(&runtime.next_event().await));
        assert!(runtime.next_event().await.is_none());
    }
}
