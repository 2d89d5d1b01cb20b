use std::time::Duration;

use tokio::{
    sync::watch,
    time::{self, Instant, MissedTickBehavior},
};

use crate::usecases::session::{ConversationSession, WeakConversationSession};

const POLL_LOOP_STARTED: &str = "POLL_LOOP_STARTED";
const POLL_LOOP_STOPPED: &str = "POLL_LOOP_STOPPED";
const POLL_TICK_FAILED: &str = "POLL_TICK_FAILED";

/// Periodic page-1 refresh for one open conversation.
///
/// Ticks never overlap: a slow fetch delays the next tick, and missed ticks
/// are skipped. Stops when the handle is dropped or the session goes away.
#[derive(Debug)]
pub struct PollLoop {
    stop_tx: Option<watch::Sender<bool>>,
}

impl PollLoop {
    /// Spawns the loop on the current tokio runtime.
    pub fn start(session: &ConversationSession, period: Duration) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let conversation = session.conversation();
        tokio::spawn(run_poll_loop(session.downgrade(), period, stop_rx));

        tracing::info!(
            code = POLL_LOOP_STARTED,
            conversation = %conversation,
            period_ms = period.as_millis() as u64,
            "poll loop started"
        );

        Self {
            stop_tx: Some(stop_tx),
        }
    }

    pub fn stop(mut self) {
        self.signal_stop();
    }

    fn signal_stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

async fn run_poll_loop(
    session: WeakConversationSession,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    tracing::info!(code = POLL_LOOP_STOPPED, "poll loop stopped");
                    return;
                }
            }
            _ = ticker.tick() => {
                let Some(session) = session.upgrade() else {
                    tracing::info!(code = POLL_LOOP_STOPPED, "poll loop stopped: session dropped");
                    return;
                };
                if session.is_closed() {
                    tracing::info!(code = POLL_LOOP_STOPPED, "poll loop stopped: session closed");
                    return;
                }

                match session.poll_once().await {
                    Ok(added) => {
                        tracing::trace!(conversation = %session.conversation(), added, "poll tick");
                    }
                    Err(error) => {
                        tracing::warn!(
                            code = POLL_TICK_FAILED,
                            conversation = %session.conversation(),
                            error = ?error,
                            "poll tick failed; waiting for next tick"
                        );
                    }
                }
            }
        }
    }
}
